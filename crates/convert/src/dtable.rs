//! Name-based facade over a snapshot and a row command sink.

use crate::error::{ConvertError, Result, Warnings};
use crate::row::{
    changed_display_fields, diff_patch, to_display_row_with_warnings,
    to_raw_patch_with_warnings, DisplayRow,
};
use dtable_model::{RowPatch, Snapshot};
use serde::{Deserialize, Serialize};

/// Where an inserted row goes relative to its anchor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    InsertAbove,
    InsertBelow,
}

/// Receiver of row write commands, usually the table store.
pub trait RowSink {
    fn insert_row(
        &mut self,
        table_id: &str,
        anchor_row_id: Option<&str>,
        position: InsertPosition,
        patch: RowPatch,
    ) -> Result<()>;

    fn modify_row(&mut self, table_id: &str, row_id: &str, patch: RowPatch) -> Result<()>;
}

/// Reads display rows from snapshots and writes display rows to a sink.
#[derive(Debug)]
pub struct DTable<S> {
    sink: S,
}

impl<S: RowSink> DTable<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Call `f` with the display form of every row of a view.
    ///
    /// Without a view name every row of the table is visited. Formula
    /// results are looked up once for the whole batch.
    pub fn for_each_row<F>(
        &self,
        snapshot: &Snapshot,
        table_name: &str,
        view_name: Option<&str>,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(DisplayRow),
    {
        let table = snapshot.get_table(table_name)?;
        let rows = match view_name {
            Some(name) => table.view_rows(table.view_by_name(name)?),
            None => table.rows().iter().collect(),
        };
        let formula_results = snapshot.formula_results_for(&table.id);

        let mut warnings = Warnings::new();
        for row in rows {
            f(to_display_row_with_warnings(
                snapshot,
                table,
                row,
                formula_results,
                &mut warnings,
            ));
        }
        if !warnings.is_empty() {
            tracing::debug!(
                table = table_name,
                count = warnings.len(),
                "some cells were degraded while reading rows"
            );
        }
        Ok(())
    }

    /// Collect the display rows of a view.
    pub fn display_rows(
        &self,
        snapshot: &Snapshot,
        table_name: &str,
        view_name: Option<&str>,
    ) -> Result<Vec<DisplayRow>> {
        let mut rows = Vec::new();
        self.for_each_row(snapshot, table_name, view_name, |row| rows.push(row))?;
        Ok(rows)
    }

    /// Append a row below the table's last row. Returns the written patch.
    pub fn append_row(
        &mut self,
        snapshot: &Snapshot,
        table_name: &str,
        row: &DisplayRow,
    ) -> Result<RowPatch> {
        let table = snapshot.get_table(table_name)?;
        let last_row = table.last_row().ok_or_else(|| ConvertError::EmptyTable {
            table: table.name.clone(),
        })?;
        let patch = to_raw_patch_with_warnings(table, row, &mut Warnings::new());
        self.sink.insert_row(
            &table.id,
            Some(&last_row.id),
            InsertPosition::InsertBelow,
            patch.clone(),
        )?;
        Ok(patch)
    }

    /// Write the changed fields of `updated` to an existing row.
    ///
    /// Only fields whose display value differs from the row's current
    /// display value are encoded, and fields whose encoded value equals the
    /// current raw value are dropped. When nothing is left no command is
    /// sent and `None` is returned.
    pub fn modify_row(
        &mut self,
        snapshot: &Snapshot,
        table_name: &str,
        row_id: &str,
        updated: &DisplayRow,
    ) -> Result<Option<RowPatch>> {
        let table = snapshot.get_table(table_name)?;
        let current = table.get_row(row_id)?;
        let mut warnings = Warnings::new();
        let current_display = to_display_row_with_warnings(
            snapshot,
            table,
            current,
            snapshot.formula_results_for(&table.id),
            &mut warnings,
        );
        let edited = changed_display_fields(&current_display, updated);
        let patch = to_raw_patch_with_warnings(table, &edited, &mut warnings);
        let patch = diff_patch(current, patch);
        if patch.is_empty() {
            tracing::debug!(table = table_name, row_id, "row unchanged, skipping write");
            return Ok(None);
        }
        self.sink.modify_row(&table.id, row_id, patch.clone())?;
        Ok(Some(patch))
    }
}
