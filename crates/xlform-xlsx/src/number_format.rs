//! Number format codes and date serials
//!
//! Cells carry their number format as a plain format code. Built-in codes
//! are mapped to and from their numFmtId when styles are read and written.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// The default number format code
pub const GENERAL: &str = "General";

/// Format applied when a date-time is written to a General-formatted cell
pub const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd h:mm:ss";

/// First numFmtId available for custom format codes
pub const FIRST_CUSTOM_ID: u32 = 164;

const BUILTIN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (49, "@"),
];

/// Get the format code of a built-in numFmtId
pub fn builtin_code(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(builtin_id, _)| *builtin_id == id)
        .map(|(_, code)| *code)
}

/// Get the built-in numFmtId for a format code, if it is one
pub fn builtin_id(code: &str) -> Option<u32> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, builtin)| *builtin == code)
        .map(|(id, _)| *id)
}

/// Check if a format code is General
pub fn is_general(code: &str) -> bool {
    code.eq_ignore_ascii_case(GENERAL)
}

/// Check if a format code displays numbers as dates or times
pub fn is_date_format(code: &str) -> bool {
    if let Some(id) = builtin_id(code) {
        return matches!(id, 14..=22);
    }

    // Placeholders outside [color]/[condition] sections and quoted literals
    let mut in_brackets = false;
    let mut in_quotes = false;
    for c in code.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            _ if in_quotes || in_brackets => {}
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => return true,
            _ => {}
        }
    }
    false
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert a date-time to a 1900-system serial number.
///
/// Serials before 1900-03-01 are off by one day relative to Excel, which
/// counts the nonexistent 1900-02-29.
pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    let delta = *dt - epoch();
    delta.num_milliseconds() as f64 / 86_400_000.0
}

/// Convert a 1900-system serial number to a date-time, rounded to the millisecond
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch().checked_add_signed(Duration::milliseconds(millis))
}
