//! Bucketing rows by group label and totalling each bucket.

use crate::label::{row_group_label, GroupLabel, GroupOptions};
use crate::sort::sort_statistics;
use crate::summary::{get_total, Summary};
use dtable_convert::{resolve_links, Warnings};
use dtable_model::{Column, ColumnType, FormulaResults, Result, Row, Snapshot, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What to group by and which totals to compute per group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsQuery {
    /// Name of the column rows are grouped by.
    pub group_by: String,
    #[serde(flatten)]
    pub options: GroupOptions,
    #[serde(default)]
    pub summaries: Vec<Summary>,
}

/// Aggregate of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticResult {
    /// `None` for the rows without a value.
    pub label: Option<GroupLabel>,
    pub count: usize,
    /// Summary totals keyed by summary column key.
    pub totals: IndexMap<String, f64>,
}

/// Split a row label into the buckets the row belongs to.
fn bucket_labels(label: Option<GroupLabel>) -> Vec<Option<GroupLabel>> {
    match label {
        Some(GroupLabel::Many(values)) => {
            let labels: Vec<_> = values
                .into_iter()
                .filter(|value| !value.is_empty())
                .map(|value| Some(GroupLabel::Text(value)))
                .collect();
            if labels.is_empty() {
                vec![None]
            } else {
                labels
            }
        }
        Some(label) if label.is_missing() => vec![None],
        other => vec![other],
    }
}

fn bucket_key(label: Option<&GroupLabel>) -> String {
    match label {
        None => String::new(),
        Some(GroupLabel::Number(n)) => format!("n:{n}"),
        Some(GroupLabel::Text(text)) => format!("t:{text}"),
        Some(GroupLabel::Many(values)) => format!("m:{}", values.join("\u{1f}")),
    }
}

struct Bucket<'a> {
    label: Option<GroupLabel>,
    rows: Vec<&'a Row>,
}

/// Group `rows` of `table` and compute the requested totals per group.
///
/// A row whose label has several values (multiple select, collaborators,
/// links) is counted in the group of each value. Rows without a value
/// form the `None` group. Results are sorted by label.
pub fn group_statistics(
    snapshot: &Snapshot,
    table: &Table,
    rows: &[&Row],
    formula_results: Option<&FormulaResults>,
    query: &StatisticsQuery,
) -> Result<Vec<StatisticResult>> {
    let column = table.get_column(&query.group_by)?;
    let summaries = query
        .summaries
        .iter()
        .map(|summary| Ok((summary, table.get_column(&summary.column)?)))
        .collect::<Result<Vec<(&Summary, &Column)>>>()?;

    let mut warnings = Warnings::new();
    let mut buckets: IndexMap<String, Bucket<'_>> = IndexMap::new();
    for &row in rows {
        let formula_row = formula_results.and_then(|results| results.get(&row.id));
        let link_values = (column.column_type == ColumnType::Link)
            .then(|| resolve_links(snapshot, table, column, &row.id, &mut warnings));
        let label = row_group_label(
            column,
            row,
            formula_row,
            link_values.as_deref(),
            &query.options,
            snapshot,
        );
        for label in bucket_labels(label) {
            buckets
                .entry(bucket_key(label.as_ref()))
                .or_insert_with(|| Bucket {
                    label,
                    rows: Vec::new(),
                })
                .rows
                .push(row);
        }
    }

    let mut results: Vec<StatisticResult> = buckets
        .into_values()
        .map(|bucket| {
            let totals = summaries
                .iter()
                .map(|(summary, summary_column)| {
                    let total = get_total(
                        summary_column,
                        summary.kind,
                        summary.method,
                        &bucket.rows,
                        formula_results,
                    );
                    (summary_column.key.clone(), total)
                })
                .collect();
            StatisticResult {
                label: bucket.label,
                count: bucket.rows.len(),
                totals,
            }
        })
        .collect();
    sort_statistics(&mut results, column, |result| result.label.as_ref());

    tracing::debug!(
        table = %table.name,
        column = %column.name,
        groups = results.len(),
        degraded = warnings.len(),
        "grouped rows"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_labels() {
        let many = |values: &[&str]| {
            Some(GroupLabel::Many(values.iter().map(|v| v.to_string()).collect()))
        };
        assert_eq!(bucket_labels(many(&[])), vec![None]);
        assert_eq!(bucket_labels(many(&["", ""])), vec![None]);
        assert_eq!(
            bucket_labels(many(&["a", "b"])),
            vec![
                Some(GroupLabel::Text("a".into())),
                Some(GroupLabel::Text("b".into()))
            ]
        );
        assert_eq!(bucket_labels(Some(GroupLabel::Text(String::new()))), vec![None]);
        assert_eq!(
            bucket_labels(Some(GroupLabel::Number(0.0))),
            vec![Some(GroupLabel::Number(0.0))]
        );
    }

    #[test]
    fn test_bucket_keys_keep_types_apart() {
        assert_ne!(
            bucket_key(Some(&GroupLabel::Number(1.0))),
            bucket_key(Some(&GroupLabel::Text("1".into())))
        );
    }
}
