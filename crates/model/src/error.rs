use thiserror::Error;

/// Errors that can occur while loading or querying a snapshot
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Table not found: {name}")]
    TableNotFound { name: String },

    #[error("View not found: {name} (table {table})")]
    ViewNotFound { table: String, name: String },

    #[error("Column not found: {name} (table {table})")]
    ColumnNotFound { table: String, name: String },

    #[error("Row not found: {row_id} (table {table})")]
    RowNotFound { table: String, row_id: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
