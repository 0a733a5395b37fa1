//! Read-only snapshot of a base: tables, links, collaborators and
//! precomputed formula results.

use crate::error::{ModelError, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Formula results of one row, keyed by column key.
pub type FormulaRow = Map<String, Value>;

/// Precomputed formula results for a batch of rows, keyed by row id.
pub type FormulaResults = HashMap<String, FormulaRow>;

/// Bidirectional row relation between two tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub table1_id: String,
    pub table2_id: String,
    #[serde(default)]
    pub table1_table2_map: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub table2_table1_map: HashMap<String, Vec<String>>,
}

impl Link {
    pub fn new(
        id: impl Into<String>,
        table1_id: impl Into<String>,
        table2_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            table1_id: table1_id.into(),
            table2_id: table2_id.into(),
            ..Self::default()
        }
    }

    /// Record a link between a row of table 1 and a row of table 2 in both maps.
    pub fn add(&mut self, table1_row: &str, table2_row: &str) {
        self.table1_table2_map
            .entry(table1_row.to_string())
            .or_default()
            .push(table2_row.to_string());
        self.table2_table1_map
            .entry(table2_row.to_string())
            .or_default()
            .push(table1_row.to_string());
    }

    pub fn connects(&self, table_a: &str, table_b: &str) -> bool {
        (self.table1_id == table_a && self.table2_id == table_b)
            || (self.table1_id == table_b && self.table2_id == table_a)
    }

    /// Row ids linked to `row_id`, reading the side that starts at `from_table`.
    pub fn linked_row_ids(&self, from_table: &str, row_id: &str) -> &[String] {
        let map = if self.table1_id == from_table {
            &self.table1_table2_map
        } else {
            &self.table2_table1_map
        };
        map.get(row_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Collaborator {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Everything the conversion and statistics engines read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    /// Formula results per table id, as delivered by the evaluator.
    #[serde(default)]
    pub formula_results: HashMap<String, FormulaResults>,
}

impl Snapshot {
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    /// Load a snapshot from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_json_reader(BufReader::new(file))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn table_by_id(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.id == id)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.table_by_name(name)
            .ok_or_else(|| ModelError::TableNotFound {
                name: name.to_string(),
            })
    }

    /// The link object connecting two tables, in either orientation.
    pub fn link_between(&self, table_a: &str, table_b: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.connects(table_a, table_b))
    }

    pub fn collaborator(&self, email: &str) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| c.email == email)
    }

    pub fn is_collaborator(&self, email: &str) -> bool {
        self.collaborator(email).is_some()
    }

    pub fn formula_results_for(&self, table_id: &str) -> Option<&FormulaResults> {
        self.formula_results.get(table_id)
    }
}
