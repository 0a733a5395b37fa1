use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Key of the column every table uses as the row's primary display value.
pub const DISPLAY_COLUMN_KEY: &str = "0000";

/// Column type tag as stored in the table schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    Text,
    LongText,
    Number,
    Date,
    SingleSelect,
    MultipleSelect,
    Link,
    Formula,
    LinkFormula,
    Collaborator,
    Creator,
    LastModifier,
    Ctime,
    Mtime,
    Checkbox,
    Rate,
    Geolocation,
    File,
    Image,
    Url,
    Email,
    Duration,
    AutoNumber,
    Button,
    #[serde(other)]
    Unknown,
}

impl ColumnType {
    /// Formula and link-formula columns hold externally computed values.
    pub fn is_formula(self) -> bool {
        matches!(self, ColumnType::Formula | ColumnType::LinkFormula)
    }

    pub fn is_select(self) -> bool {
        matches!(self, ColumnType::SingleSelect | ColumnType::MultipleSelect)
    }

    pub fn is_date(self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Ctime | ColumnType::Mtime)
    }

    /// Name of the row-level field backing system columns, if any.
    pub fn system_field(self) -> Option<&'static str> {
        match self {
            ColumnType::Ctime => Some("_ctime"),
            ColumnType::Mtime => Some("_mtime"),
            ColumnType::Creator => Some("_creator"),
            ColumnType::LastModifier => Some("_last_modifier"),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_value(self) {
            Ok(Value::String(s)) => write!(f, "{s}"),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// One option of a single- or multiple-select column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectData {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkData {
    pub table_id: String,
    pub other_table_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
}

/// Display format of a number column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    #[default]
    Number,
    Percent,
    Dollar,
    Euro,
    Yuan,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberData {
    #[serde(default)]
    pub format: NumberFormat,
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default)]
    pub enable_precision: bool,
}

fn default_precision() -> u32 {
    2
}

impl Default for NumberData {
    fn default() -> Self {
        Self {
            format: NumberFormat::Number,
            precision: default_precision(),
            enable_precision: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaResultType {
    Number,
    #[default]
    String,
    Date,
    Bool,
    Array,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormulaData {
    #[serde(default)]
    pub result_type: FormulaResultType,
    #[serde(flatten)]
    pub number: NumberData,
}

/// Layout of a geolocation cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoFormat {
    LngLat,
    CountryRegion,
    Province,
    ProvinceCity,
    #[default]
    #[serde(other)]
    Full,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoData {
    #[serde(default)]
    pub geo_format: GeoFormat,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl DateData {
    pub fn has_time(&self) -> bool {
        self.format.as_deref().is_some_and(|f| f.contains("HH"))
    }
}

/// Type-specific column configuration.
///
/// The variant is always determined by the column type; a column whose
/// configuration is absent or malformed is `Unconfigured`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnData {
    #[default]
    Unconfigured,
    Select(SelectData),
    Link(LinkData),
    Formula(FormulaData),
    Number(NumberData),
    Date(DateData),
    Geolocation(GeoData),
    Other(Value),
}

impl ColumnData {
    /// Interpret raw `data` according to the column type.
    pub fn parse(column_type: ColumnType, column_name: &str, data: Option<Value>) -> Self {
        let Some(data) = data.filter(|d| !d.is_null()) else {
            return match column_type {
                ColumnType::Number => ColumnData::Number(NumberData::default()),
                ColumnType::Date | ColumnType::Ctime | ColumnType::Mtime => {
                    ColumnData::Date(DateData::default())
                }
                ColumnType::Geolocation => ColumnData::Geolocation(GeoData::default()),
                _ => ColumnData::Unconfigured,
            };
        };

        let parsed = match column_type {
            ColumnType::SingleSelect | ColumnType::MultipleSelect => {
                serde_json::from_value(data).map(ColumnData::Select)
            }
            ColumnType::Link => serde_json::from_value(data).map(ColumnData::Link),
            ColumnType::Formula | ColumnType::LinkFormula => {
                serde_json::from_value(data).map(ColumnData::Formula)
            }
            ColumnType::Number => serde_json::from_value(data).map(ColumnData::Number),
            ColumnType::Date | ColumnType::Ctime | ColumnType::Mtime => {
                serde_json::from_value(data).map(ColumnData::Date)
            }
            ColumnType::Geolocation => serde_json::from_value(data).map(ColumnData::Geolocation),
            _ => Ok(ColumnData::Other(data)),
        };

        parsed.unwrap_or_else(|e| {
            tracing::warn!(
                column = column_name,
                column_type = %column_type,
                "ignoring malformed column data: {e}"
            );
            ColumnData::Unconfigured
        })
    }

    fn to_value(&self) -> Option<Value> {
        let value = match self {
            ColumnData::Unconfigured => return None,
            ColumnData::Select(d) => serde_json::to_value(d),
            ColumnData::Link(d) => serde_json::to_value(d),
            ColumnData::Formula(d) => serde_json::to_value(d),
            ColumnData::Number(d) => serde_json::to_value(d),
            ColumnData::Date(d) => serde_json::to_value(d),
            ColumnData::Geolocation(d) => serde_json::to_value(d),
            ColumnData::Other(v) => return Some(v.clone()),
        };
        value.ok()
    }
}

#[derive(Serialize, Deserialize)]
struct ColumnRepr {
    key: String,
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// A typed field definition within a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColumnRepr", into = "ColumnRepr")]
pub struct Column {
    pub key: String,
    pub name: String,
    pub column_type: ColumnType,
    pub data: ColumnData,
}

impl From<ColumnRepr> for Column {
    fn from(repr: ColumnRepr) -> Self {
        let data = ColumnData::parse(repr.column_type, &repr.name, repr.data);
        Self {
            key: repr.key,
            name: repr.name,
            column_type: repr.column_type,
            data,
        }
    }
}

impl From<Column> for ColumnRepr {
    fn from(column: Column) -> Self {
        let data = column.data.to_value();
        Self {
            key: column.key,
            name: column.name,
            column_type: column.column_type,
            data,
        }
    }
}

impl Column {
    /// Create a column with its type's default configuration.
    pub fn new(key: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        let data = ColumnData::parse(column_type, &name, None);
        Self {
            key: key.into(),
            name,
            column_type,
            data,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: ColumnData) -> Self {
        self.data = data;
        self
    }

    /// Convenience constructor for select columns.
    #[must_use]
    pub fn with_options(self, options: Vec<SelectOption>) -> Self {
        self.with_data(ColumnData::Select(SelectData { options }))
    }

    /// Select options, or `None` when the column has none configured.
    pub fn options(&self) -> Option<&[SelectOption]> {
        match &self.data {
            ColumnData::Select(data) => Some(&data.options),
            _ => None,
        }
    }

    pub fn option_by_id(&self, id: &str) -> Option<&SelectOption> {
        self.options()?.iter().find(|option| option.id == id)
    }

    pub fn option_by_name(&self, name: &str) -> Option<&SelectOption> {
        self.options()?.iter().find(|option| option.name == name)
    }

    /// Position of an option id in the declared option order.
    pub fn option_index(&self, id: &str) -> Option<usize> {
        self.options()?.iter().position(|option| option.id == id)
    }

    pub fn link_data(&self) -> Option<&LinkData> {
        match &self.data {
            ColumnData::Link(data) => Some(data),
            _ => None,
        }
    }

    pub fn formula_data(&self) -> Option<&FormulaData> {
        match &self.data {
            ColumnData::Formula(data) => Some(data),
            _ => None,
        }
    }

    /// Formula result type; unconfigured formulas count as strings.
    pub fn formula_result_type(&self) -> FormulaResultType {
        self.formula_data()
            .map(|data| data.result_type)
            .unwrap_or_default()
    }

    /// Number formatting for number columns and numeric formulas.
    pub fn number_data(&self) -> Option<&NumberData> {
        match &self.data {
            ColumnData::Number(data) => Some(data),
            ColumnData::Formula(data) => Some(&data.number),
            _ => None,
        }
    }

    pub fn geo_format(&self) -> GeoFormat {
        match &self.data {
            ColumnData::Geolocation(data) => data.geo_format,
            _ => GeoFormat::default(),
        }
    }

    pub fn date_has_time(&self) -> bool {
        match &self.data {
            ColumnData::Date(data) => data.has_time(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_select_column() {
        let column: Column = serde_json::from_value(json!({
            "key": "a1",
            "name": "Status",
            "type": "single-select",
            "data": {"options": [{"id": "o1", "name": "Open"}, {"id": "o2", "name": "Done"}]}
        }))
        .unwrap();

        assert_eq!(column.column_type, ColumnType::SingleSelect);
        assert_eq!(column.option_by_id("o2").unwrap().name, "Done");
        assert_eq!(column.option_index("o2"), Some(1));
        assert!(column.option_by_name("Missing").is_none());
    }

    #[test]
    fn test_missing_data_is_unconfigured() {
        let column: Column = serde_json::from_value(json!({
            "key": "l1", "name": "Tasks", "type": "link"
        }))
        .unwrap();
        assert_eq!(column.data, ColumnData::Unconfigured);
        assert!(column.link_data().is_none());
    }

    #[test]
    fn test_malformed_data_is_unconfigured() {
        let column: Column = serde_json::from_value(json!({
            "key": "s1", "name": "Tags", "type": "multiple-select", "data": {"options": 3}
        }))
        .unwrap();
        assert!(column.options().is_none());
    }

    #[test]
    fn test_unknown_type() {
        let column: Column = serde_json::from_value(json!({
            "key": "x", "name": "Sig", "type": "digital-sign", "data": {"a": 1}
        }))
        .unwrap();
        assert_eq!(column.column_type, ColumnType::Unknown);
        assert_eq!(column.data, ColumnData::Other(json!({"a": 1})));
    }

    #[test]
    fn test_formula_data_flattens_number_settings() {
        let column: Column = serde_json::from_value(json!({
            "key": "f", "name": "Total", "type": "formula",
            "data": {"result_type": "number", "precision": 1, "enable_precision": true}
        }))
        .unwrap();
        assert_eq!(column.formula_result_type(), FormulaResultType::Number);
        let number = column.number_data().unwrap();
        assert_eq!(number.precision, 1);
        assert!(number.enable_precision);
    }

    #[test]
    fn test_serialize_round_trip() {
        let column = Column::new("d", "Due", ColumnType::Date).with_data(ColumnData::Date(DateData {
            format: Some("YYYY-MM-DD HH:mm".to_string()),
        }));
        let value = serde_json::to_value(&column).unwrap();
        assert_eq!(value["type"], json!("date"));
        let back: Column = serde_json::from_value(value).unwrap();
        assert!(back.date_has_time());
        assert_eq!(back, column);
    }

    #[test]
    fn test_column_type_display() {
        assert_eq!(ColumnType::LinkFormula.to_string(), "link-formula");
        assert_eq!(ColumnType::LastModifier.system_field(), Some("_last_modifier"));
    }
}
