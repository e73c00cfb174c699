//! Cell coercion helpers.
//!
//! Census exports are hand-maintained spreadsheets: numbers use a comma as
//! decimal separator, dates are written day-first, and missing values show
//! up under half a dozen spellings. Every parser here is total: a cell that
//! cannot be coerced becomes `None` instead of failing the load.

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};

/// Spellings treated as a missing value when loading a table.
pub const NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%y", "%d-%m-%y",
];

/// Trims a raw cell and maps null markers to `None`.
#[must_use]
pub fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a decimal number, accepting a comma as decimal separator.
///
/// Returns `None` for unparseable or non-finite values.
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a date written day-first (`15/03/2021`), falling back to ISO
/// layouts and bare years.
///
/// Parses that produce a year below 100 are rejected so that two-digit
/// years reach the `%y` layouts instead of landing in the first century.
#[must_use]
pub fn parse_day_first_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt)
            && dt.year() >= 100
        {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt)
            && d.year() >= 100
        {
            return Some(d);
        }
    }

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_null_markers() {
        assert_eq!(normalize_cell("  "), None);
        assert_eq!(normalize_cell("nan"), None);
        assert_eq!(normalize_cell("NULL"), None);
        assert_eq!(normalize_cell(" Ipê-roxo "), Some("Ipê-roxo".to_string()));
    }

    #[test]
    fn parses_comma_decimal() {
        let v = parse_decimal("12,5").unwrap();
        assert!((v - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_dot_decimal() {
        let v = parse_decimal(" 7.25 ").unwrap();
        assert!((v - 7.25).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_garbage_and_non_finite_numbers() {
        assert!(parse_decimal("alta").is_none());
        assert!(parse_decimal("inf").is_none());
        assert!(parse_decimal("NaN").is_none());
        assert!(parse_decimal("").is_none());
    }

    #[test]
    fn parses_day_first() {
        assert_eq!(
            parse_day_first_date("03/04/2021"),
            NaiveDate::from_ymd_opt(2021, 4, 3)
        );
    }

    #[test]
    fn parses_day_first_with_time() {
        assert_eq!(
            parse_day_first_date("15/03/2019 10:30:00"),
            NaiveDate::from_ymd_opt(2019, 3, 15)
        );
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_day_first_date("2022-11-05"),
            NaiveDate::from_ymd_opt(2022, 11, 5)
        );
        assert_eq!(
            parse_day_first_date("2022-11-05 00:00:00"),
            NaiveDate::from_ymd_opt(2022, 11, 5)
        );
    }

    #[test]
    fn parses_two_digit_years() {
        assert_eq!(
            parse_day_first_date("01/02/21"),
            NaiveDate::from_ymd_opt(2021, 2, 1)
        );
    }

    #[test]
    fn parses_bare_year() {
        assert_eq!(
            parse_day_first_date("2020"),
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert!(parse_day_first_date("ontem").is_none());
        assert!(parse_day_first_date("32/13/2020").is_none());
    }
}
