//! # dtable utils
//!
//! Helpers shared by the conversion and statistics engines: locale-free
//! date handling, number precision and display strings, geolocation
//! display strings and value comparators.

pub mod datetime;
pub mod geo;
pub mod number;
pub mod sort;

pub use datetime::{
    compare_dates, date_by_granularity, date_display_string, format_date,
    format_date_with_minutes, parse_date, DateGranularity, INVALID_DATE,
};
pub use geo::geolocation_display_string;
pub use number::{number_display_string, precision_number, round_to, to_number};
pub use sort::{compare_numbers, compare_option_index, compare_text};

use serde_json::Value;

/// Render a JSON value as plain text: strings without quotes, null as empty.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Whether a cell counts as empty: null, empty string or empty array.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
