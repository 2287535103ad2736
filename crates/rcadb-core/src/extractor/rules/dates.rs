//! Day/month/year assembly and coverage length.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::text::clean_text;
use crate::error::ExtractionError;

/// Two-digit years up to this value are read as 20xx, above as 19xx.
const PIVOT_YEAR: i32 = 50;

/// Build a date from captured day, month and year text.
pub fn parse_date_parts(
    field: &str,
    day: &str,
    month: &str,
    year: &str,
) -> Result<NaiveDate, ExtractionError> {
    let invalid = || ExtractionError::InvalidDateComponents {
        field: field.to_string(),
        day: day.to_string(),
        month: month.to_string(),
        year: year.to_string(),
    };

    let d: u32 = clean_text(day).parse().map_err(|_| invalid())?;
    let m: u32 = clean_text(month).parse().map_err(|_| invalid())?;
    let year_text = clean_text(year);
    let mut y: i32 = year_text.parse().map_err(|_| invalid())?;
    if year_text.len() <= 2 {
        y += if y <= PIVOT_YEAR { 2000 } else { 1900 };
    }

    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)
}

/// First match of `regex` in `text`, groups 1..=3 read as day, month, year.
pub fn find_date(
    field: &str,
    regex: &Regex,
    text: &str,
) -> Result<NaiveDate, ExtractionError> {
    let caps = regex
        .captures(text)
        .ok_or_else(|| ExtractionError::FieldNotFound {
            field: field.to_string(),
        })?;
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    parse_date_parts(field, group(1), group(2), group(3))
}

/// Whole months between two dates, ignoring the day of month.
pub fn coverage_months(expiration: Option<NaiveDate>, start: Option<NaiveDate>) -> Option<i32> {
    let (end, start) = (expiration?, start?);
    Some((end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32))
}

/// Format as `dd.mm.yy`.
pub fn format_short(date: NaiveDate) -> String {
    date.format("%d.%m.%y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_with_noise() {
        assert_eq!(
            parse_date_parts("start_date", " 05", "_03 ", "2022 ").unwrap(),
            date(2022, 3, 5)
        );
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(parse_date_parts("f", "1", "2", "23").unwrap(), date(2023, 2, 1));
        assert_eq!(parse_date_parts("f", "1", "2", "99").unwrap(), date(1999, 2, 1));
    }

    #[test]
    fn test_non_leap_day_is_invalid() {
        let re = Regex::new(r"de la(.*)\.(.*)\.(.*)pana").unwrap();
        let err = find_date("start_date", &re, "de la 29.02.2021 pana").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::InvalidDateComponents {
                field: "start_date".to_string(),
                day: " 29".to_string(),
                month: "02".to_string(),
                year: "2021 ".to_string(),
            }
        );
    }

    #[test]
    fn test_out_of_range_and_garbage() {
        assert!(parse_date_parts("f", "32", "01", "2022").is_err());
        assert!(parse_date_parts("f", "10", "13", "2022").is_err());
        assert!(parse_date_parts("f", "1O", "01", "2022").is_err());
    }

    #[test]
    fn test_missing_pattern() {
        let re = Regex::new(r"de la(.*)\.(.*)\.(.*)pana").unwrap();
        assert!(matches!(
            find_date("start_date", &re, "nothing here"),
            Err(ExtractionError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_coverage_months() {
        assert_eq!(
            coverage_months(Some(date(2023, 3, 15)), Some(date(2022, 1, 20))),
            Some(14)
        );
        assert_eq!(coverage_months(None, Some(date(2022, 1, 20))), None);
        assert_eq!(coverage_months(Some(date(2022, 1, 20)), None), None);
    }

    #[test]
    fn test_format_short() {
        assert_eq!(format_short(date(2022, 3, 5)), "05.03.22");
    }
}
