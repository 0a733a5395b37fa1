//! Geolocation display strings.

use dtable_model::GeoFormat;
use serde_json::Value;

fn field<'a>(value: &'a Value, name: &str) -> &'a str {
    value.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn number_field(value: &Value, name: &str) -> Option<String> {
    match value.get(name)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Display string of a geolocation cell; empty for anything unrecognised.
pub fn geolocation_display_string(value: &Value, format: GeoFormat) -> String {
    if !value.is_object() {
        return String::new();
    }
    match format {
        GeoFormat::LngLat => match (number_field(value, "lng"), number_field(value, "lat")) {
            (Some(lng), Some(lat)) => format!("{lng}, {lat}"),
            _ => String::new(),
        },
        GeoFormat::CountryRegion => field(value, "country_region").to_string(),
        GeoFormat::Province => field(value, "province").to_string(),
        GeoFormat::ProvinceCity => [field(value, "province"), field(value, "city")].concat(),
        GeoFormat::Full => [
            field(value, "province"),
            field(value, "city"),
            field(value, "district"),
            field(value, "detail"),
        ]
        .concat(),
    }
}
