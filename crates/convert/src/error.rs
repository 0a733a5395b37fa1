use dtable_model::ModelError;
use thiserror::Error;

/// Errors raised at the facade boundary (lookups and command sinks).
///
/// Cell-level problems never surface here; they are reported as
/// [`CellWarning`]s instead.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Table {table} has no rows to insert below")]
    EmptyTable { table: String },

    #[error("Row sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// A cell that could not be converted faithfully and was degraded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellWarning {
    #[error("Column {column} has no {expected} configured")]
    MissingColumnData {
        column: String,
        expected: &'static str,
    },

    #[error("Option id {id} not found in column {column}")]
    OptionIdNotFound { column: String, id: String },

    #[error("{name} was not found in column {column}, please create a new option")]
    OptionNameNotFound { column: String, name: String },

    #[error("Column {column} expected {expected}, got {got}")]
    InvalidCellShape {
        column: String,
        expected: &'static str,
        got: String,
    },

    #[error("Linked row {row_id} not found in table {table_id}")]
    DanglingLink { table_id: String, row_id: String },

    #[error("No formula result for column {column} in row {row_id}")]
    MissingFormulaResult { column: String, row_id: String },
}

/// Side channel collecting the warnings of one conversion call.
///
/// Every warning is also emitted as a `tracing` debug event.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    items: Vec<CellWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: CellWarning) {
        tracing::debug!("{warning}");
        self.items.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellWarning> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<CellWarning> {
        self.items
    }
}

pub(crate) fn shape_name(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
    .to_string()
}
