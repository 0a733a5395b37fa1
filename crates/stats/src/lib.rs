//! # dtable stats
//!
//! Grouped statistics over table rows: the label each row is grouped
//! under, the order of groups, and count/sum/mean/max/min totals.
//!
//! ```
//! use dtable_model::{Column, ColumnType, Row, Snapshot, Table};
//! use dtable_stats::{group_statistics, StatisticsQuery, Summary, SummaryMethod};
//!
//! let table = Table::new(
//!     "t1",
//!     "Sales",
//!     vec![
//!         Column::new("0000", "Region", ColumnType::Text),
//!         Column::new("n1", "Amount", ColumnType::Number),
//!     ],
//!     vec![
//!         Row::new("r1").with_cell("0000", "North").with_cell("n1", 5),
//!         Row::new("r2").with_cell("0000", "North").with_cell("n1", 7),
//!     ],
//! );
//! let snapshot = Snapshot::new(vec![table]);
//! let table = &snapshot.tables[0];
//! let rows: Vec<&Row> = table.rows().iter().collect();
//! let query = StatisticsQuery {
//!     group_by: "Region".into(),
//!     summaries: vec![Summary::advanced("Amount", SummaryMethod::Sum)],
//!     ..StatisticsQuery::default()
//! };
//!
//! let groups = group_statistics(&snapshot, table, &rows, None, &query).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].count, 2);
//! assert_eq!(groups[0].totals["n1"], 12.0);
//! ```

mod group;
mod label;
mod sort;
mod summary;

pub use group::{group_statistics, StatisticResult, StatisticsQuery};
pub use label::{group_label, label_display, row_group_label, GroupLabel, GroupOptions};
pub use sort::{compare_labels, sort_statistics};
pub use summary::{get_total, Summary, SummaryKind, SummaryMethod};

pub use dtable_utils::DateGranularity;
