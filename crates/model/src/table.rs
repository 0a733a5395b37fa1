use crate::column::{Column, ColumnType};
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A partial raw row keyed by column key, as written to the store.
pub type RowPatch = Map<String, Value>;

/// One record of a table: raw cell values keyed by column key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub cells: Map<String, Value>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Map::new(),
        }
    }

    /// Builder-style cell setter, mostly useful for fixtures.
    #[must_use]
    pub fn with_cell(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cells.insert(key.into(), value.into());
        self
    }

    /// Raw value stored under a column key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.cells.get(key)
    }

    /// Raw value for a column, reading row-level fields for system columns.
    pub fn cell(&self, column: &Column) -> Option<&Value> {
        let key = column
            .column_type
            .system_field()
            .unwrap_or(column.key.as_str());
        self.cells.get(key)
    }

    /// Merge a patch into this row, overwriting the patched keys.
    pub fn apply_patch(&mut self, patch: &RowPatch) {
        for (key, value) in patch {
            self.cells.insert(key.clone(), value.clone());
        }
    }
}

/// A store-materialized projection over a table's rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct View {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    /// Ordered row ids the view shows; `None` shows every row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<String>>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            rows: None,
        }
    }
}

#[derive(Deserialize)]
struct TableRepr {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    views: Vec<View>,
}

impl From<TableRepr> for Table {
    fn from(repr: TableRepr) -> Self {
        let mut table = Table::new(repr.id, repr.name, repr.columns, repr.rows);
        table.views = repr.views;
        table
    }
}

/// A collection of typed columns and rows.
///
/// Rows are kept in order alongside an id index; both are rebuilt together
/// so every indexed id appears exactly once in `rows`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TableRepr")]
pub struct Table {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub columns: Vec<Column>,
    rows: Vec<Row>,
    pub views: Vec<View>,
    #[serde(skip)]
    id_row_map: HashMap<String, usize>,
}

impl Table {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Row>,
    ) -> Self {
        let mut table = Self {
            id: id.into(),
            name: name.into(),
            columns,
            rows: Vec::with_capacity(rows.len()),
            views: Vec::new(),
            id_row_map: HashMap::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row. A row whose id is already present is dropped.
    pub fn push_row(&mut self, row: Row) -> bool {
        if self.id_row_map.contains_key(&row.id) {
            tracing::warn!(table = %self.name, row_id = %row.id, "dropping duplicate row id");
            return false;
        }
        self.id_row_map.insert(row.id.clone(), self.rows.len());
        self.rows.push(row);
        true
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn last_row(&self) -> Option<&Row> {
        self.rows.last()
    }

    pub fn row_by_id(&self, row_id: &str) -> Option<&Row> {
        self.id_row_map.get(row_id).map(|&index| &self.rows[index])
    }

    /// Like [`Table::row_by_id`], but failing with a lookup error.
    pub fn get_row(&self, row_id: &str) -> Result<&Row> {
        self.row_by_id(row_id).ok_or_else(|| ModelError::RowNotFound {
            table: self.name.clone(),
            row_id: row_id.to_string(),
        })
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn get_column(&self, name: &str) -> Result<&Column> {
        self.column_by_name(name)
            .ok_or_else(|| ModelError::ColumnNotFound {
                table: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Formula and link-formula columns, in table order.
    pub fn formula_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|column| column.column_type.is_formula())
    }

    pub fn columns_of_type(&self, column_type: ColumnType) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(move |column| column.column_type == column_type)
    }

    pub fn view_by_name(&self, name: &str) -> Result<&View> {
        self.views
            .iter()
            .find(|view| view.name == name)
            .ok_or_else(|| ModelError::ViewNotFound {
                table: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Rows shown by a view, in view order. Stale ids are skipped.
    pub fn view_rows<'a>(&'a self, view: &'a View) -> Vec<&'a Row> {
        match &view.rows {
            Some(ids) => ids.iter().filter_map(|id| self.row_by_id(id)).collect(),
            None => self.rows.iter().collect(),
        }
    }
}
