//! Locale-free date handling for cell values

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Returned by the date formatters for anything that is not a date.
pub const INVALID_DATE: &str = "Invalid date";

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a stored date string.
///
/// Accepts plain dates, dates with minutes or seconds, and RFC 3339
/// timestamps (converted to UTC, as `_ctime`/`_mtime` are stored).
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

fn parse_four_digit_year(value: &str) -> Option<NaiveDateTime> {
    parse_date(value).filter(|dt| (1000..=9999).contains(&dt.year()))
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(value: &str) -> String {
    parse_four_digit_year(value).map_or_else(
        || INVALID_DATE.to_string(),
        |dt| dt.format("%Y-%m-%d").to_string(),
    )
}

/// Format a date as `YYYY-MM-DD HH:mm`
pub fn format_date_with_minutes(value: &str) -> String {
    parse_four_digit_year(value).map_or_else(
        || INVALID_DATE.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Canonical display string of a date cell, `None` when it is not a date.
pub fn date_display_string(value: &str, with_time: bool) -> Option<String> {
    let dt = parse_date(value)?;
    let format = if with_time { "%Y-%m-%d %H:%M" } else { "%Y-%m-%d" };
    Some(dt.format(format).to_string())
}

/// Bucket size used when grouping dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateGranularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl FromStr for DateGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(format!("unknown date granularity: {other}")),
        }
    }
}

impl fmt::Display for DateGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        };
        write!(f, "{name}")
    }
}

/// Truncate a date to a granularity.
///
/// Weeks are labelled by their Monday. Quarters render as `YYYY-Qn`.
pub fn date_by_granularity(value: &str, granularity: DateGranularity) -> Option<String> {
    let date = parse_date(value)?.date();
    let label = match granularity {
        DateGranularity::Day => date.format("%Y-%m-%d").to_string(),
        DateGranularity::Week => {
            let offset = i64::from(date.weekday().num_days_from_monday());
            (date - Duration::days(offset)).format("%Y-%m-%d").to_string()
        }
        DateGranularity::Month => date.format("%Y-%m").to_string(),
        DateGranularity::Quarter => format!("{}-Q{}", date.year(), date.month0() / 3 + 1),
        DateGranularity::Year => date.format("%Y").to_string(),
    };
    Some(label)
}

/// Chronological comparison of two date strings.
///
/// Parsable dates sort before unparsable ones; unparsable values (such as
/// quarter labels) compare as text so the order stays total.
pub fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Datetime helper tests.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2018-08-19"), "2018-08-19");
        assert_eq!(format_date_with_minutes("2018-08-19 06:00"), "2018-08-19 06:00");
        assert_eq!(format_date_with_minutes("aaa"), INVALID_DATE);
        assert_eq!(format_date("20180-01-01"), INVALID_DATE);
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_date("2021-03-04T23:30:00.000+02:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2021-03-04 21:30");
    }

    #[test]
    fn test_date_display_string() {
        assert_eq!(
            date_display_string("2020-01-05 10:30", false).as_deref(),
            Some("2020-01-05")
        );
        assert_eq!(
            date_display_string("2020-01-05", true).as_deref(),
            Some("2020-01-05 00:00")
        );
        assert_eq!(date_display_string("", false), None);
    }

    #[test]
    fn test_granularity() {
        let day = "2021-08-19 14:00";
        let cases = [
            (DateGranularity::Day, "2021-08-19"),
            (DateGranularity::Week, "2021-08-16"),
            (DateGranularity::Month, "2021-08"),
            (DateGranularity::Quarter, "2021-Q3"),
            (DateGranularity::Year, "2021"),
        ];
        for (granularity, expected) in cases {
            assert_eq!(date_by_granularity(day, granularity).as_deref(), Some(expected));
        }
        assert_eq!(date_by_granularity("soon", DateGranularity::Day), None);
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("Month".parse::<DateGranularity>(), Ok(DateGranularity::Month));
        assert!("decade".parse::<DateGranularity>().is_err());
    }

    #[test]
    fn test_compare_dates() {
        assert_eq!(compare_dates("2020-02-01", "2020-10-01"), Ordering::Less);
        assert_eq!(compare_dates("2020-02-01 10:00", "2020-02-01"), Ordering::Greater);
        assert_eq!(compare_dates("2020-Q1", "2020-Q3"), Ordering::Less);
        assert_eq!(compare_dates("2020-01-01", "2020-Q1"), Ordering::Less);
    }
}
