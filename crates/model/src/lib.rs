//! Snapshot data model for the dtable row engine
//!
//! A [`Snapshot`] holds the tables, links, collaborators and formula results of
//! a base as delivered by the table store. Engines only ever read it.
//!
//! # Examples
//!
//! ```
//! use dtable_model::Snapshot;
//!
//! let snapshot = Snapshot::from_json_str(r#"{
//!     "tables": [{
//!         "_id": "t1",
//!         "name": "Tasks",
//!         "columns": [{"key": "0000", "name": "Name", "type": "text"}],
//!         "rows": [{"_id": "r1", "0000": "Write docs"}]
//!     }]
//! }"#).unwrap();
//!
//! let table = snapshot.get_table("Tasks").unwrap();
//! assert_eq!(table.row_count(), 1);
//! assert!(table.row_by_id("r1").is_some());
//! ```

mod column;
mod error;
mod snapshot;
mod table;

/// Re-export column types and configuration.
pub use column::{
    Column, ColumnData, ColumnType, DateData, FormulaData, FormulaResultType, GeoData, GeoFormat,
    LinkData, NumberData, NumberFormat, SelectData, SelectOption, DISPLAY_COLUMN_KEY,
};
/// Re-export model error types.
pub use error::{ModelError, Result};
/// Re-export snapshot types.
pub use snapshot::{Collaborator, FormulaResults, FormulaRow, Link, Snapshot};
/// Re-export table types.
pub use table::{Row, RowPatch, Table, View};
