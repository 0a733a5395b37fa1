//! Conversion of whole rows between the raw and display representations.

use crate::codec::{CellCodec, Encoded};
use crate::error::{CellWarning, Warnings};
use crate::link::resolve_links;
use dtable_model::{Column, FormulaResults, FormulaRow, Row, RowPatch, Snapshot, Table};
use indexmap::IndexMap;
use serde_json::Value;

/// Field carrying the row id in display rows.
pub const ID_FIELD: &str = "_id";

/// A row keyed by column name, in table column order.
pub type DisplayRow = IndexMap<String, Value>;

fn formula_value(
    column: &Column,
    row_id: &str,
    formula_row: Option<&FormulaRow>,
    warnings: &mut Warnings,
) -> Value {
    if column.formula_data().is_none() {
        warnings.push(CellWarning::MissingColumnData {
            column: column.name.clone(),
            expected: "formula",
        });
        return Value::Null;
    }
    match formula_row.and_then(|results| results.get(&column.key)) {
        Some(value) => value.clone(),
        None => {
            warnings.push(CellWarning::MissingFormulaResult {
                column: column.name.clone(),
                row_id: row_id.to_string(),
            });
            Value::Null
        }
    }
}

/// Convert a raw row to a display row, collecting degraded cells.
pub fn to_display_row_with_warnings(
    snapshot: &Snapshot,
    table: &Table,
    row: &Row,
    formula_results: Option<&FormulaResults>,
    warnings: &mut Warnings,
) -> DisplayRow {
    let mut display = DisplayRow::with_capacity(table.columns.len() + 1);
    display.insert(ID_FIELD.to_string(), Value::String(row.id.clone()));

    let formula_row = formula_results.and_then(|results| results.get(&row.id));
    for column in &table.columns {
        if column.name == ID_FIELD {
            tracing::warn!(table = %table.name, key = %column.key, "column named _id is not shown");
            continue;
        }
        let value = match CellCodec::for_type(column.column_type) {
            CellCodec::Link => {
                Value::Array(resolve_links(snapshot, table, column, &row.id, warnings))
            }
            CellCodec::Formula => formula_value(column, &row.id, formula_row, warnings),
            codec => codec.decode(column, row.cell(column), warnings),
        };
        display.insert(column.name.clone(), value);
    }
    display
}

/// Convert a raw row to a display row.
///
/// Every column of the table appears in the result. Cells that cannot be
/// converted degrade to an empty value and are logged.
pub fn to_display_row(
    snapshot: &Snapshot,
    table: &Table,
    row: &Row,
    formula_results: Option<&FormulaResults>,
) -> DisplayRow {
    to_display_row_with_warnings(snapshot, table, row, formula_results, &mut Warnings::new())
}

/// Convert a display row back to a raw patch, collecting skipped cells.
pub fn to_raw_patch_with_warnings(
    table: &Table,
    display: &DisplayRow,
    warnings: &mut Warnings,
) -> RowPatch {
    let mut patch = RowPatch::new();
    for (name, value) in display {
        if name == ID_FIELD {
            continue;
        }
        let Some(column) = table.column_by_name(name) else {
            continue;
        };
        // system columns are maintained by the store
        if column.column_type.system_field().is_some() {
            continue;
        }
        let codec = CellCodec::for_type(column.column_type);
        if let Encoded::Value(raw) = codec.encode(column, value, warnings) {
            patch.insert(column.key.clone(), raw);
        }
    }
    patch
}

/// Convert a display row back to a raw patch keyed by column key.
///
/// Unknown column names, link and formula columns, system columns such as
/// `ctime`, and values that cannot be mapped are left out of the patch.
pub fn to_raw_patch(table: &Table, display: &DisplayRow) -> RowPatch {
    to_raw_patch_with_warnings(table, display, &mut Warnings::new())
}

/// Whether writing `value` under `key` would change the row.
///
/// A missing cell and an explicit null are the same.
pub fn field_changed(row: &Row, key: &str, value: &Value) -> bool {
    row.get(key).unwrap_or(&Value::Null) != value
}

/// Keys of a patch whose values differ from the row's current values.
pub fn changed_fields<'a>(row: &Row, patch: &'a RowPatch) -> Vec<&'a str> {
    patch
        .iter()
        .filter(|(key, value)| field_changed(row, key, value))
        .map(|(key, _)| key.as_str())
        .collect()
}

/// Fields of `updated` whose display value differs from `current`.
///
/// Fields missing from `current` count as changed.
pub fn changed_display_fields(current: &DisplayRow, updated: &DisplayRow) -> DisplayRow {
    updated
        .iter()
        .filter(|(name, value)| current.get(name.as_str()) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Drop the fields of a patch that would not change the row.
pub fn diff_patch(row: &Row, patch: RowPatch) -> RowPatch {
    patch
        .into_iter()
        .filter(|(key, value)| field_changed(row, key, value))
        .collect()
}
