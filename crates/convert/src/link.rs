//! Resolution of link cells through the bidirectional link index.

use crate::codec::CellCodec;
use crate::error::{CellWarning, Warnings};
use dtable_model::{Column, Link, Row, Snapshot, Table, DISPLAY_COLUMN_KEY};
use serde_json::Value;

/// Display value of a linked row: its primary display column, decoded.
fn row_display_value(table: &Table, row: &Row, warnings: &mut Warnings) -> Value {
    match table.column_by_key(DISPLAY_COLUMN_KEY) {
        Some(column) => {
            CellCodec::for_type(column.column_type).decode(column, row.cell(column), warnings)
        }
        None => row.get(DISPLAY_COLUMN_KEY).cloned().unwrap_or(Value::Null),
    }
}

fn find_link<'a>(
    snapshot: &'a Snapshot,
    column: &Column,
    table_id: &str,
    other_table_id: &str,
) -> Option<&'a Link> {
    let link_id = column.link_data().and_then(|data| data.link_id.as_deref());
    if let Some(id) = link_id {
        if let Some(link) = snapshot.links.iter().find(|link| link.id == id) {
            return Some(link);
        }
    }
    snapshot.link_between(table_id, other_table_id)
}

/// Rows of the other table linked to `row_id` through a link column.
///
/// Unknown tables, missing links and rows without adjacency entries all
/// resolve to an empty list. Linked ids that no longer exist are skipped.
pub fn linked_rows<'a>(
    snapshot: &'a Snapshot,
    table: &Table,
    column: &Column,
    row_id: &str,
    warnings: &mut Warnings,
) -> (Option<&'a Table>, Vec<&'a Row>) {
    let Some(data) = column.link_data() else {
        warnings.push(CellWarning::MissingColumnData {
            column: column.name.clone(),
            expected: "link tables",
        });
        return (None, Vec::new());
    };

    let other_table_id = if table.id == data.table_id {
        &data.other_table_id
    } else {
        &data.table_id
    };
    let Some(other_table) = snapshot.table_by_id(other_table_id) else {
        return (None, Vec::new());
    };
    let Some(link) = find_link(snapshot, column, &table.id, other_table_id) else {
        return (Some(other_table), Vec::new());
    };

    let mut rows = Vec::new();
    for linked_id in link.linked_row_ids(&table.id, row_id) {
        match other_table.row_by_id(linked_id) {
            Some(row) => rows.push(row),
            None => warnings.push(CellWarning::DanglingLink {
                table_id: other_table.id.clone(),
                row_id: linked_id.clone(),
            }),
        }
    }
    (Some(other_table), rows)
}

/// Display values of the rows linked to `row_id` through a link column.
pub fn resolve_links(
    snapshot: &Snapshot,
    table: &Table,
    column: &Column,
    row_id: &str,
    warnings: &mut Warnings,
) -> Vec<Value> {
    let (other_table, rows) = linked_rows(snapshot, table, column, row_id, warnings);
    let Some(other_table) = other_table else {
        return Vec::new();
    };
    rows.into_iter()
        .map(|row| row_display_value(other_table, row, warnings))
        .collect()
}
