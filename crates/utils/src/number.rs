//! Number parsing, precision and display helpers.

use dtable_model::{NumberData, NumberFormat};
use serde_json::Value;

/// Numeric content of a cell value.
///
/// Numbers and numeric strings count; everything else (including
/// booleans, empty strings and objects) does not.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Round to a fixed number of decimal places.
///
/// Values too large to scale are returned unchanged.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Apply a column's precision setting, leaving the value alone when the
/// column does not enable precision.
pub fn precision_number(value: f64, data: Option<&NumberData>) -> f64 {
    match data {
        Some(data) if data.enable_precision => {
            let precision = data.precision as usize;
            format!("{value:.precision$}").parse().unwrap_or(value)
        }
        _ => value,
    }
}

fn fixed(value: f64, data: &NumberData, default_precision: usize) -> String {
    let precision = if data.enable_precision {
        data.precision as usize
    } else {
        default_precision
    };
    format!("{value:.precision$}")
}

/// Render a number the way its column is configured to show it.
pub fn number_display_string(value: f64, data: Option<&NumberData>) -> String {
    let default = NumberData::default();
    let data = data.unwrap_or(&default);
    match data.format {
        NumberFormat::Percent => {
            let percent = round_to(value * 100.0, 8);
            if data.enable_precision {
                format!("{}%", fixed(percent, data, 0))
            } else {
                format!("{percent}%")
            }
        }
        NumberFormat::Dollar => format!("${}", fixed(value, data, 2)),
        NumberFormat::Euro => format!("€{}", fixed(value, data, 2)),
        NumberFormat::Yuan => format!("¥{}", fixed(value, data, 2)),
        NumberFormat::Number | NumberFormat::Other => {
            if data.enable_precision {
                fixed(value, data, 0)
            } else {
                value.to_string()
            }
        }
    }
}
