//! Group labels: the value a row is bucketed under for one column.

use dtable_model::{Column, ColumnType, FormulaResultType, FormulaRow, GeoFormat, Row, Snapshot};
use dtable_utils::{
    date_by_granularity, date_display_string, geolocation_display_string, number_display_string,
    precision_number, to_number, value_to_string, DateGranularity,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Bucket key of a row for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupLabel {
    Number(f64),
    Text(String),
    /// Multi-valued cells (multiple select, collaborators, links).
    Many(Vec<String>),
}

impl GroupLabel {
    /// Missing labels sort first and collect rows without a value.
    pub fn is_missing(&self) -> bool {
        match self {
            GroupLabel::Text(text) => text.is_empty(),
            GroupLabel::Number(_) | GroupLabel::Many(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            GroupLabel::Number(n) => Some(*n),
            GroupLabel::Text(text) => text.trim().parse().ok(),
            GroupLabel::Many(_) => None,
        }
    }

    /// First text of the label; the whole text for single values.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            GroupLabel::Text(text) => Some(text),
            GroupLabel::Many(values) => values.first().map(String::as_str),
            GroupLabel::Number(_) => None,
        }
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::Number(n) => write!(f, "{n}"),
            GroupLabel::Text(text) => write!(f, "{text}"),
            GroupLabel::Many(values) => write!(f, "{}", values.join(", ")),
        }
    }
}

/// Granularity settings of a grouping query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOptions {
    #[serde(default)]
    pub date_granularity: Option<DateGranularity>,
    /// Field of a geolocation object to group by, e.g. `province`.
    #[serde(default)]
    pub geo_granularity: Option<String>,
}

fn non_empty(text: String) -> Option<GroupLabel> {
    (!text.is_empty()).then_some(GroupLabel::Text(text))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn date_label(cell: &Value, column: &Column, options: &GroupOptions) -> Option<GroupLabel> {
    let text = cell.as_str()?;
    let label = match options.date_granularity {
        Some(granularity) => date_by_granularity(text, granularity),
        None => date_display_string(text, column.date_has_time()),
    };
    label.map(GroupLabel::Text)
}

fn formula_label(column: &Column, formula_row: Option<&FormulaRow>) -> Option<GroupLabel> {
    let value = formula_row?.get(&column.key)?;
    match column.formula_result_type() {
        FormulaResultType::Array => non_empty(value_to_string(value)),
        FormulaResultType::Number => to_number(value)
            .map(|n| GroupLabel::Number(precision_number(n, column.number_data()))),
        _ => {
            if is_truthy(value) {
                non_empty(value_to_string(value))
            } else {
                None
            }
        }
    }
}

fn geolocation_label(cell: &Value, column: &Column, options: &GroupOptions) -> Option<GroupLabel> {
    let format = column.geo_format();
    let whole = matches!(format, GeoFormat::CountryRegion | GeoFormat::LngLat);
    match options.geo_granularity.as_deref() {
        Some(field) if !whole => {
            cell.get(field).map(value_to_string).and_then(non_empty)
        }
        _ => non_empty(geolocation_display_string(cell, format)),
    }
}

/// Label a row is grouped under for `column`.
///
/// `cell` is the raw cell, `formula_row` the precomputed formula results of
/// the row and `link_values` the resolved display values of a link cell.
/// `None` means the row has no value for the column; multi-valued columns
/// return `Many`, possibly empty.
pub fn group_label(
    column: &Column,
    cell: Option<&Value>,
    formula_row: Option<&FormulaRow>,
    link_values: Option<&[Value]>,
    options: &GroupOptions,
    snapshot: &Snapshot,
) -> Option<GroupLabel> {
    let cell = cell.unwrap_or(&Value::Null);
    match column.column_type {
        ColumnType::Text => non_empty(value_to_string(cell)),
        ColumnType::Number => {
            to_number(cell).map(|n| GroupLabel::Number(precision_number(n, column.number_data())))
        }
        ColumnType::SingleSelect => {
            let id = cell.as_str()?;
            column.option_by_id(id).map(|_| GroupLabel::Text(id.to_string()))
        }
        ColumnType::MultipleSelect => Some(GroupLabel::Many(
            string_list(cell)
                .into_iter()
                .filter(|id| column.option_by_id(id).is_some())
                .collect(),
        )),
        ColumnType::Date | ColumnType::Ctime | ColumnType::Mtime => {
            date_label(cell, column, options)
        }
        ColumnType::Collaborator => Some(GroupLabel::Many(
            string_list(cell)
                .into_iter()
                .filter(|email| snapshot.is_collaborator(email))
                .collect(),
        )),
        ColumnType::Creator | ColumnType::LastModifier => non_empty(value_to_string(cell)),
        ColumnType::Formula | ColumnType::LinkFormula => formula_label(column, formula_row),
        ColumnType::Geolocation => geolocation_label(cell, column, options),
        ColumnType::Link => Some(GroupLabel::Many(
            link_values
                .unwrap_or_default()
                .iter()
                .map(value_to_string)
                .filter(|value| !value.is_empty())
                .collect(),
        )),
        ColumnType::Checkbox => Some(GroupLabel::Text(is_truthy(cell).to_string())),
        ColumnType::Rate => {
            if is_truthy(cell) {
                non_empty(value_to_string(cell))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Group label of a stored row, reading system fields where the column
/// has one.
pub fn row_group_label(
    column: &Column,
    row: &Row,
    formula_row: Option<&FormulaRow>,
    link_values: Option<&[Value]>,
    options: &GroupOptions,
    snapshot: &Snapshot,
) -> Option<GroupLabel> {
    group_label(column, row.cell(column), formula_row, link_values, options, snapshot)
}

/// Human-readable form of a label.
///
/// Select labels show option names and collaborator labels show names;
/// numbers follow the column's number format.
pub fn label_display(snapshot: &Snapshot, column: &Column, label: &GroupLabel) -> String {
    let lookup = |value: &str| -> String {
        match column.column_type {
            ColumnType::SingleSelect | ColumnType::MultipleSelect => column
                .option_by_id(value)
                .map_or_else(|| value.to_string(), |option| option.name.clone()),
            ColumnType::Collaborator => snapshot
                .collaborator(value)
                .map_or_else(|| value.to_string(), |c| c.name.clone()),
            _ => value.to_string(),
        }
    };
    match label {
        GroupLabel::Number(n) => number_display_string(*n, column.number_data()),
        GroupLabel::Text(text) => lookup(text),
        GroupLabel::Many(values) => values
            .iter()
            .map(|value| lookup(value))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtable_model::{
        Collaborator, ColumnData, FormulaData, GeoData, NumberData, NumberFormat, SelectOption,
    };
    use serde_json::json;

    fn label(column: &Column, cell: Value) -> Option<GroupLabel> {
        group_label(
            column,
            Some(&cell),
            None,
            None,
            &GroupOptions::default(),
            &Snapshot::default(),
        )
    }

    fn text(s: &str) -> Option<GroupLabel> {
        Some(GroupLabel::Text(s.to_string()))
    }

    #[test]
    fn test_text_and_number() {
        let name = Column::new("t", "Name", ColumnType::Text);
        assert_eq!(label(&name, json!("a")), text("a"));
        assert_eq!(label(&name, json!("")), None);
        assert_eq!(label(&name, Value::Null), None);

        let amount = Column::new("n", "Amount", ColumnType::Number).with_data(ColumnData::Number(
            NumberData {
                enable_precision: true,
                precision: 1,
                ..NumberData::default()
            },
        ));
        assert_eq!(label(&amount, json!(2.26)), Some(GroupLabel::Number(2.3)));
        assert_eq!(label(&amount, json!(0)), Some(GroupLabel::Number(0.0)));
        assert_eq!(label(&amount, Value::Null), None);
    }

    #[test]
    fn test_select_labels_drop_stale_ids() {
        let options = vec![SelectOption::new("o1", "Open"), SelectOption::new("o2", "Done")];
        let single =
            Column::new("s", "Status", ColumnType::SingleSelect).with_options(options.clone());
        assert_eq!(label(&single, json!("o2")), text("o2"));
        assert_eq!(label(&single, json!("gone")), None);

        let multi = Column::new("m", "Tags", ColumnType::MultipleSelect).with_options(options);
        assert_eq!(
            label(&multi, json!(["o2", "gone", "o1"])),
            Some(GroupLabel::Many(vec!["o2".into(), "o1".into()]))
        );
        assert_eq!(label(&multi, json!("o1")), Some(GroupLabel::Many(vec![])));
    }

    #[test]
    fn test_date_labels() {
        let due = Column::new("d", "Due", ColumnType::Date);
        assert_eq!(label(&due, json!("2021-05-07 10:00")), text("2021-05-07"));

        let options = GroupOptions {
            date_granularity: Some(DateGranularity::Quarter),
            ..GroupOptions::default()
        };
        let snapshot = Snapshot::default();
        let by_quarter =
            group_label(&due, Some(&json!("2021-05-07")), None, None, &options, &snapshot);
        assert_eq!(by_quarter, text("2021-Q2"));
    }

    #[test]
    fn test_collaborator_label_keeps_known_emails() {
        let mut snapshot = Snapshot::default();
        snapshot.collaborators.push(Collaborator::new("a@x.org", "Ann"));
        let column = Column::new("c", "People", ColumnType::Collaborator);
        let found = group_label(
            &column,
            Some(&json!(["a@x.org", "b@x.org"])),
            None,
            None,
            &GroupOptions::default(),
            &snapshot,
        );
        assert_eq!(found, Some(GroupLabel::Many(vec!["a@x.org".into()])));
        assert_eq!(
            label_display(&snapshot, &column, &GroupLabel::Text("a@x.org".into())),
            "Ann"
        );
    }

    #[test]
    fn test_formula_labels() {
        let formula = |result_type| {
            Column::new("f", "F", ColumnType::Formula).with_data(ColumnData::Formula(FormulaData {
                result_type,
                ..FormulaData::default()
            }))
        };
        let row = json!({"f": ["a", "b"]}).as_object().cloned().unwrap();
        let options = GroupOptions::default();
        let snapshot = Snapshot::default();

        let array = formula(FormulaResultType::Array);
        assert_eq!(
            group_label(&array, None, Some(&row), None, &options, &snapshot),
            text("a, b")
        );
        assert_eq!(group_label(&array, None, None, None, &options, &snapshot), None);

        let number_row = json!({"f": "4.5"}).as_object().cloned().unwrap();
        let number = formula(FormulaResultType::Number);
        assert_eq!(
            group_label(&number, None, Some(&number_row), None, &options, &snapshot),
            Some(GroupLabel::Number(4.5))
        );

        let string_row = json!({"f": ""}).as_object().cloned().unwrap();
        let string = formula(FormulaResultType::String);
        assert_eq!(
            group_label(&string, None, Some(&string_row), None, &options, &snapshot),
            None
        );
    }

    #[test]
    fn test_geolocation_labels() {
        let cell = json!({"province": "Hubei", "city": "Wuhan", "district": "", "detail": ""});
        let column = Column::new("g", "Where", ColumnType::Geolocation).with_data(
            ColumnData::Geolocation(GeoData {
                geo_format: GeoFormat::ProvinceCity,
            }),
        );
        assert_eq!(label(&column, cell.clone()), text("HubeiWuhan"));

        let options = GroupOptions {
            geo_granularity: Some("province".into()),
            ..GroupOptions::default()
        };
        let snapshot = Snapshot::default();
        assert_eq!(
            group_label(&column, Some(&cell), None, None, &options, &snapshot),
            text("Hubei")
        );

        let lng_lat = Column::new("g", "Where", ColumnType::Geolocation).with_data(
            ColumnData::Geolocation(GeoData {
                geo_format: GeoFormat::LngLat,
            }),
        );
        let point = json!({"lng": 114.3, "lat": 30.6});
        assert_eq!(
            group_label(&lng_lat, Some(&point), None, None, &options, &snapshot),
            text("114.3, 30.6")
        );
    }

    #[test]
    fn test_link_checkbox_rate_and_other() {
        let link = Column::new("l", "Owners", ColumnType::Link);
        let values = [json!("Ann"), json!("Bo")];
        let options = GroupOptions::default();
        let snapshot = Snapshot::default();
        assert_eq!(
            group_label(&link, None, None, Some(&values), &options, &snapshot),
            Some(GroupLabel::Many(vec!["Ann".into(), "Bo".into()]))
        );
        assert_eq!(
            group_label(&link, None, None, None, &options, &snapshot),
            Some(GroupLabel::Many(vec![]))
        );

        let checkbox = Column::new("c", "Done", ColumnType::Checkbox);
        assert_eq!(label(&checkbox, json!(true)), text("true"));
        assert_eq!(label(&checkbox, Value::Null), text("false"));

        let rate = Column::new("r", "Stars", ColumnType::Rate);
        assert_eq!(label(&rate, json!(3)), text("3"));
        assert_eq!(label(&rate, json!(0)), None);

        let file = Column::new("f", "Files", ColumnType::File);
        assert_eq!(label(&file, json!([{"name": "a.txt"}])), None);
    }

    #[test]
    fn test_number_label_display() {
        let column = Column::new("n", "Price", ColumnType::Number).with_data(ColumnData::Number(
            NumberData {
                format: NumberFormat::Dollar,
                ..NumberData::default()
            },
        ));
        assert_eq!(
            label_display(&Snapshot::default(), &column, &GroupLabel::Number(3.0)),
            "$3.00"
        );
    }
}
