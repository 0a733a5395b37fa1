//! Conversion between raw storage rows and display rows
//!
//! Raw rows are keyed by opaque column keys and store option ids, long-text
//! objects and link ids. Display rows are keyed by column name and hold
//! human-readable values.
//!
//! # Examples
//!
//! ```
//! use dtable_convert::{to_display_row, to_raw_patch};
//! use dtable_model::{Column, ColumnType, Row, SelectOption, Snapshot, Table};
//! use serde_json::json;
//!
//! let table = Table::new(
//!     "t1",
//!     "Tasks",
//!     vec![
//!         Column::new("0000", "Name", ColumnType::Text),
//!         Column::new("s1", "Status", ColumnType::SingleSelect)
//!             .with_options(vec![SelectOption::new("o1", "Open")]),
//!     ],
//!     vec![Row::new("r1").with_cell("0000", "Ship").with_cell("s1", "o1")],
//! );
//! let snapshot = Snapshot::new(vec![table]);
//! let table = &snapshot.tables[0];
//!
//! let display = to_display_row(&snapshot, table, &table.rows()[0], None);
//! assert_eq!(display["Status"], json!("Open"));
//!
//! let patch = to_raw_patch(table, &display);
//! assert_eq!(patch["s1"], json!("o1"));
//! ```
//!
//! Link and formula columns are readable but never written back: they are
//! left out of every patch.

mod codec;
mod dtable;
mod error;
mod link;
mod row;

/// Re-export cell codec entry points.
pub use codec::{decode, encode, CellCodec, Encoded};
/// Re-export the facade and command sink.
pub use dtable::{DTable, InsertPosition, RowSink};
/// Re-export error and warning types.
pub use error::{CellWarning, ConvertError, Result, Warnings};
/// Re-export link resolution.
pub use link::{linked_rows, resolve_links};
/// Re-export row conversion.
pub use row::{
    changed_display_fields, changed_fields, diff_patch, field_changed, to_display_row,
    to_display_row_with_warnings, to_raw_patch, to_raw_patch_with_warnings, DisplayRow, ID_FIELD,
};
