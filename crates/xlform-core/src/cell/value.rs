//! Cell value types

use std::fmt;

use chrono::NaiveDateTime;

/// The typed value of a cell.
///
/// This is a closed set: a backend that meets anything else (booleans,
/// errors, empty cells) reports an internal error instead of widening it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text value
    Text(String),

    /// Floating-point number
    Float(f64),

    /// Integer number
    Int(i64),

    /// Date and time (no time zone)
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if this value is text that spreadsheets treat as a formula
    pub fn is_formula_text(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.starts_with('='))
    }

    /// Try to get the value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(n) => Some(*n),
            CellValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to get the value as a date-time
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Float(_) => "float",
            CellValue::Int(_) => "int",
            CellValue::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Float(n) => write!(f, "{}", n),
            CellValue::Int(n) => write!(f, "{}", n),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42), CellValue::Int(42));
        assert_eq!(CellValue::from(1.5), CellValue::Float(1.5));
        assert_eq!(CellValue::from("hello").as_str(), Some("hello"));
        assert_eq!(CellValue::Int(3).as_float(), Some(3.0));
        assert_eq!(CellValue::text("3").as_int(), None);
    }

    #[test]
    fn test_formula_text() {
        assert!(CellValue::text("=1+1").is_formula_text());
        assert!(!CellValue::text("1+1").is_formula_text());
        assert!(!CellValue::Int(1).is_formula_text());
    }

    #[test]
    fn test_display() {
        let dt = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_string(), "2021-03-04 05:06:07");
        assert_eq!(CellValue::Float(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Int(-2).to_string(), "-2");
    }
}
