//! Per-column-type conversion of single cell values.

use crate::error::{shape_name, CellWarning, Warnings};
use dtable_markdown::LongText;
use dtable_model::{Column, ColumnType};
use serde_json::{json, Value};

/// How one column type converts between raw and display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCodec {
    /// Identity in both directions.
    Passthrough,
    SingleSelect,
    MultipleSelect,
    LongText,
    /// Structured location object, kept unchanged.
    Geolocation,
    /// Resolved through the link index; read-only.
    Link,
    /// Read from precomputed formula results; read-only.
    Formula,
}

/// Result of encoding one display value.
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Raw value to write under the column key.
    Value(Value),
    /// The value could not be mapped and is left out of the patch.
    Skipped,
    /// The column cannot be written through a row patch.
    ReadOnly,
}

impl Encoded {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Encoded::Value(value) => Some(value),
            Encoded::Skipped | Encoded::ReadOnly => None,
        }
    }
}

impl CellCodec {
    /// The codec registered for a column type.
    pub fn for_type(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::SingleSelect => CellCodec::SingleSelect,
            ColumnType::MultipleSelect => CellCodec::MultipleSelect,
            ColumnType::LongText => CellCodec::LongText,
            ColumnType::Geolocation => CellCodec::Geolocation,
            ColumnType::Link => CellCodec::Link,
            ColumnType::Formula | ColumnType::LinkFormula => CellCodec::Formula,
            ColumnType::Text
            | ColumnType::Number
            | ColumnType::Date
            | ColumnType::Collaborator
            | ColumnType::Creator
            | ColumnType::LastModifier
            | ColumnType::Ctime
            | ColumnType::Mtime
            | ColumnType::Checkbox
            | ColumnType::Rate
            | ColumnType::File
            | ColumnType::Image
            | ColumnType::Url
            | ColumnType::Email
            | ColumnType::Duration
            | ColumnType::AutoNumber
            | ColumnType::Button
            | ColumnType::Unknown => CellCodec::Passthrough,
        }
    }

    /// Whether values of this codec can be written back through a patch.
    pub fn is_writable(self) -> bool {
        !matches!(self, CellCodec::Link | CellCodec::Formula)
    }

    /// Convert a raw cell value to its display value.
    ///
    /// Link and formula cells depend on the snapshot and are passed through
    /// here; the row converter resolves them.
    pub fn decode(self, column: &Column, raw: Option<&Value>, warnings: &mut Warnings) -> Value {
        let raw = raw.unwrap_or(&Value::Null);
        match self {
            CellCodec::Passthrough
            | CellCodec::Geolocation
            | CellCodec::Link
            | CellCodec::Formula => raw.clone(),
            CellCodec::SingleSelect => Value::String(decode_single(column, raw, warnings)),
            CellCodec::MultipleSelect => Value::Array(decode_multiple(column, raw, warnings)),
            CellCodec::LongText => Value::String(decode_long_text(column, raw, warnings)),
        }
    }

    /// Convert a display value back to the raw value stored for the column.
    pub fn encode(self, column: &Column, display: &Value, warnings: &mut Warnings) -> Encoded {
        match self {
            CellCodec::Passthrough | CellCodec::Geolocation => Encoded::Value(display.clone()),
            CellCodec::SingleSelect => encode_single(column, display, warnings),
            CellCodec::MultipleSelect => encode_multiple(column, display, warnings),
            CellCodec::LongText => encode_long_text(column, display, warnings),
            CellCodec::Link | CellCodec::Formula => Encoded::ReadOnly,
        }
    }
}

/// Decode a cell with the codec registered for its column type.
pub fn decode(column: &Column, raw: Option<&Value>, warnings: &mut Warnings) -> Value {
    CellCodec::for_type(column.column_type).decode(column, raw, warnings)
}

/// Encode a display value with the codec registered for its column type.
pub fn encode(column: &Column, display: &Value, warnings: &mut Warnings) -> Encoded {
    CellCodec::for_type(column.column_type).encode(column, display, warnings)
}

fn missing_options(column: &Column, warnings: &mut Warnings) {
    warnings.push(CellWarning::MissingColumnData {
        column: column.name.clone(),
        expected: "options",
    });
}

fn invalid_shape(column: &Column, expected: &'static str, got: &Value, warnings: &mut Warnings) {
    warnings.push(CellWarning::InvalidCellShape {
        column: column.name.clone(),
        expected,
        got: shape_name(got),
    });
}

fn decode_single(column: &Column, raw: &Value, warnings: &mut Warnings) -> String {
    if column.options().is_none() {
        missing_options(column, warnings);
        return String::new();
    }
    match raw {
        Value::Null => String::new(),
        Value::String(id) if id.is_empty() => String::new(),
        Value::String(id) => match column.option_by_id(id) {
            Some(option) => option.name.clone(),
            None => {
                warnings.push(CellWarning::OptionIdNotFound {
                    column: column.name.clone(),
                    id: id.clone(),
                });
                String::new()
            }
        },
        other => {
            invalid_shape(column, "option id", other, warnings);
            String::new()
        }
    }
}

fn decode_multiple(column: &Column, raw: &Value, warnings: &mut Warnings) -> Vec<Value> {
    if column.options().is_none() {
        missing_options(column, warnings);
        return Vec::new();
    }
    let ids = match raw {
        Value::Array(ids) => ids,
        Value::Null => return Vec::new(),
        other => {
            invalid_shape(column, "array of option ids", other, warnings);
            return Vec::new();
        }
    };
    ids.iter()
        .filter_map(Value::as_str)
        .filter_map(|id| column.option_by_id(id))
        .map(|option| Value::String(option.name.clone()))
        .collect()
}

fn decode_long_text(column: &Column, raw: &Value, warnings: &mut Warnings) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(cell) => cell
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        other => {
            invalid_shape(column, "long-text object", other, warnings);
            String::new()
        }
    }
}

fn encode_single(column: &Column, display: &Value, warnings: &mut Warnings) -> Encoded {
    if column.options().is_none() {
        missing_options(column, warnings);
        return Encoded::Skipped;
    }
    match display {
        Value::Null => Encoded::Value(Value::Null),
        Value::String(name) if name.is_empty() => Encoded::Value(Value::Null),
        Value::String(name) => match column.option_by_name(name) {
            Some(option) => Encoded::Value(Value::String(option.id.clone())),
            None => {
                warnings.push(CellWarning::OptionNameNotFound {
                    column: column.name.clone(),
                    name: name.clone(),
                });
                Encoded::Skipped
            }
        },
        other => {
            invalid_shape(column, "option name", other, warnings);
            Encoded::Skipped
        }
    }
}

fn encode_multiple(column: &Column, display: &Value, warnings: &mut Warnings) -> Encoded {
    if column.options().is_none() {
        missing_options(column, warnings);
        return Encoded::Skipped;
    }
    let names = match display {
        Value::Array(names) => names,
        Value::Null => return Encoded::Value(Value::Array(Vec::new())),
        other => {
            invalid_shape(column, "array of option names", other, warnings);
            return Encoded::Skipped;
        }
    };

    let mut ids = Vec::with_capacity(names.len());
    for name in names.iter().filter_map(Value::as_str) {
        match column.option_by_name(name) {
            Some(option) => ids.push(Value::String(option.id.clone())),
            None => warnings.push(CellWarning::OptionNameNotFound {
                column: column.name.clone(),
                name: name.to_string(),
            }),
        }
    }
    Encoded::Value(Value::Array(ids))
}

fn encode_long_text(column: &Column, display: &Value, warnings: &mut Warnings) -> Encoded {
    match display {
        Value::Null => Encoded::Value(Value::Null),
        Value::String(text) => {
            let cell = LongText::from_markdown(text);
            Encoded::Value(json!({
                "text": cell.text,
                "preview": cell.preview,
                "images": cell.images,
                "links": cell.links,
            }))
        }
        other => {
            invalid_shape(column, "markdown text", other, warnings);
            Encoded::Skipped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtable_model::SelectOption;

    fn status() -> Column {
        Column::new("s", "Status", ColumnType::SingleSelect).with_options(vec![
            SelectOption::new("o1", "Open"),
            SelectOption::new("o2", "Done"),
        ])
    }

    fn tags() -> Column {
        Column::new("m", "Tags", ColumnType::MultipleSelect).with_options(vec![
            SelectOption::new("t1", "red"),
            SelectOption::new("t2", "green"),
            SelectOption::new("t3", "blue"),
        ])
    }

    #[test]
    fn test_single_select_round_trip() {
        let column = status();
        let mut warnings = Warnings::new();
        for name in ["Open", "Done"] {
            let raw = encode(&column, &json!(name), &mut warnings).into_value().unwrap();
            assert_eq!(decode(&column, Some(&raw), &mut warnings), json!(name));
        }
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_single_select_unknown_id() {
        let mut warnings = Warnings::new();
        assert_eq!(decode(&status(), Some(&json!("gone")), &mut warnings), json!(""));
        assert_eq!(
            warnings.into_vec(),
            vec![CellWarning::OptionIdNotFound {
                column: "Status".into(),
                id: "gone".into()
            }]
        );
    }

    #[test]
    fn test_single_select_unknown_name_skipped() {
        let mut warnings = Warnings::new();
        assert_eq!(encode(&status(), &json!("Later"), &mut warnings), Encoded::Skipped);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings.iter().next().unwrap().to_string(),
            "Later was not found in column Status, please create a new option"
        );
    }

    #[test]
    fn test_single_select_clear() {
        let mut warnings = Warnings::new();
        assert_eq!(encode(&status(), &json!(""), &mut warnings), Encoded::Value(Value::Null));
        assert_eq!(decode(&status(), None, &mut warnings), json!(""));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unconfigured_select() {
        let column = Column::new("s", "Status", ColumnType::SingleSelect);
        let mut warnings = Warnings::new();
        assert_eq!(decode(&column, Some(&json!("o1")), &mut warnings), json!(""));
        assert_eq!(encode(&column, &json!("Open"), &mut warnings), Encoded::Skipped);
        assert_eq!(warnings.len(), 2);

        let column = Column::new("m", "Tags", ColumnType::MultipleSelect);
        assert_eq!(decode(&column, Some(&json!(["t1"])), &mut warnings), json!([]));
    }

    #[test]
    fn test_multiple_select_drops_stale_ids_in_order() {
        let mut warnings = Warnings::new();
        let decoded = decode(&tags(), Some(&json!(["t3", "gone", "t1"])), &mut warnings);
        assert_eq!(decoded, json!(["blue", "red"]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_multiple_select_non_array() {
        let mut warnings = Warnings::new();
        assert_eq!(decode(&tags(), Some(&json!("t1")), &mut warnings), json!([]));
        assert_eq!(decode(&tags(), None, &mut warnings), json!([]));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_multiple_select_encode() {
        let mut warnings = Warnings::new();
        let encoded = encode(&tags(), &json!(["green", "purple", "red"]), &mut warnings);
        assert_eq!(encoded, Encoded::Value(json!(["t2", "t1"])));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_long_text() {
        let column = Column::new("l", "Notes", ColumnType::LongText);
        let mut warnings = Warnings::new();
        let raw = json!({"text": "hi", "preview": "hi", "images": [], "links": []});
        assert_eq!(decode(&column, Some(&raw), &mut warnings), json!("hi"));
        assert_eq!(decode(&column, None, &mut warnings), json!(""));

        let encoded = encode(&column, &json!("![](http://x/a.png)"), &mut warnings);
        assert_eq!(
            encoded,
            Encoded::Value(json!({
                "text": "![](http://x/a.png)",
                "preview": "",
                "images": ["http://x/a.png"],
                "links": []
            }))
        );
    }

    #[test]
    fn test_passthrough_and_read_only() {
        let mut warnings = Warnings::new();
        let number = Column::new("n", "Count", ColumnType::Number);
        assert_eq!(decode(&number, Some(&json!(4)), &mut warnings), json!(4));
        assert_eq!(encode(&number, &json!(4), &mut warnings), Encoded::Value(json!(4)));

        let geo = Column::new("g", "Where", ColumnType::Geolocation);
        let place = json!({"lng": 1.5, "lat": 2.5});
        assert_eq!(decode(&geo, Some(&place), &mut warnings), place);

        let link = Column::new("k", "Refs", ColumnType::Link);
        assert_eq!(encode(&link, &json!(["x"]), &mut warnings), Encoded::ReadOnly);
        let formula = Column::new("f", "Calc", ColumnType::LinkFormula);
        assert_eq!(encode(&formula, &json!(1), &mut warnings), Encoded::ReadOnly);
        assert!(!CellCodec::for_type(ColumnType::Formula).is_writable());
        assert!(warnings.is_empty());
    }
}
