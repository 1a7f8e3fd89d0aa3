//! Engine configuration

/// Options for [`XlsxEngine`](crate::XlsxEngine)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxOptions {
    /// Name of the single sheet a new book starts with
    pub default_sheet_name: String,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            default_sheet_name: "Sheet1".to_string(),
        }
    }
}

impl XlsxOptions {
    /// Set the name of the sheet created with every new book
    pub fn with_default_sheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.default_sheet_name = name.into();
        self
    }
}
