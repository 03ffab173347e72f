//! DD/MM/YYYY date input validation.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Inline message shown next to an invalid date field.
pub const DATE_FORMAT_HINT: &str = "Please use DD/MM/YYYY format";

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|[12][0-9]|3[01])/(0[1-9]|1[0-2])/(\d{4})$").unwrap()
});

/// Parse a strict DD/MM/YYYY date, rejecting days the month does not have.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let caps = DATE_PATTERN.captures(value)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// True for an empty value (field left blank) or a valid date.
pub fn is_valid_date(value: &str) -> bool {
    value.is_empty() || parse_date(value).is_some()
}

/// Field-level validation result: `None` when valid, else the inline message.
pub fn date_error(value: &str) -> Option<&'static str> {
    if is_valid_date(value) {
        None
    } else {
        Some(DATE_FORMAT_HINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_validity() {
        assert!(!is_valid_date("31/02/2024"));
        assert!(is_valid_date("29/02/2024"));
        assert!(!is_valid_date("29/02/2023"));
        assert!(!is_valid_date("31/04/2024"));
        assert!(is_valid_date("30/04/2024"));
    }

    #[test]
    fn test_format_is_strict() {
        assert!(!is_valid_date("15/13/2024"));
        assert!(is_valid_date("01/01/2024"));
        assert!(!is_valid_date("1/1/2024"));
        assert!(!is_valid_date("2024-01-01"));
        assert!(!is_valid_date("00/01/2024"));
        assert!(!is_valid_date(" 01/01/2024"));
    }

    #[test]
    fn test_blank_is_allowed() {
        assert!(is_valid_date(""));
        assert_eq!(date_error(""), None);
        assert_eq!(date_error("32/01/2024"), Some(DATE_FORMAT_HINT));
    }

    #[test]
    fn test_parse_date_value() {
        assert_eq!(parse_date("29/02/2024"), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
