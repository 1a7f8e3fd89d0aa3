//! Error types for xlform
//!
//! Callers distinguish failures by [`ErrorKind`], never by message text.

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in xlform
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A caller-supplied parameter is structurally invalid
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The live spreadsheet does not match the shape a form item expects
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backend or form item does not support the requested capability
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// An invariant the implementation should have guaranteed was violated
    #[error("Internal error: {0}")]
    Internal(String),

    /// The storage layer failed (I/O, archive or XML errors)
    #[error("Backend error: {0}")]
    Backend(String),
}

/// The kind of an [`Error`], without its message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Argument,
    Validation,
    NotImplemented,
    Internal,
    Backend,
}

impl Error {
    /// Create an argument error
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        Error::Argument(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a "not implemented" error naming the missing capability
    pub fn not_implemented<S: Into<String>>(what: S) -> Self {
        Error::NotImplemented(what.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Create a backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Error::Backend(msg.into())
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Argument(_) => ErrorKind::Argument,
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotImplemented(_) => ErrorKind::NotImplemented,
            Error::Internal(_) => ErrorKind::Internal,
            Error::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Check if this error reports a missing capability
    pub fn is_not_implemented(&self) -> bool {
        self.kind() == ErrorKind::NotImplemented
    }

    /// Re-signal a validation failure as an argument error.
    ///
    /// Every other kind passes through unchanged.
    pub fn into_argument(self) -> Self {
        match self {
            Error::Validation(msg) => Error::Argument(format!("Illegal argument: {}", msg)),
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Error::argument("x").kind(), ErrorKind::Argument);
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(Error::not_implemented("x").kind(), ErrorKind::NotImplemented);
        assert_eq!(Error::internal("x").kind(), ErrorKind::Internal);
        assert_eq!(Error::backend("x").kind(), ErrorKind::Backend);
        assert!(Error::not_implemented("text").is_not_implemented());
        assert!(!Error::internal("text").is_not_implemented());
    }

    #[test]
    fn test_into_argument() {
        let e = Error::validation("header_value not found").into_argument();
        assert_eq!(e.kind(), ErrorKind::Argument);
        assert!(e.to_string().contains("header_value not found"));

        let e = Error::not_implemented("formula evaluation").into_argument();
        assert_eq!(e.kind(), ErrorKind::NotImplemented);
    }
}
