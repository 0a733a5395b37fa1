//! Summary totals over a group of rows.

use dtable_model::{Column, FormulaResults, Row};
use dtable_utils::{round_to, to_number};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Whether a summary counts rows or aggregates a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    #[default]
    Count,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    #[default]
    Sum,
    Mean,
    Max,
    Min,
    /// Anything else; always totals to 0.
    #[serde(other)]
    Unknown,
}

/// One requested summary: a column and how to total it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Column name.
    pub column: String,
    #[serde(default)]
    pub kind: SummaryKind,
    #[serde(default)]
    pub method: SummaryMethod,
}

impl Summary {
    pub fn count(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: SummaryKind::Count,
            method: SummaryMethod::default(),
        }
    }

    pub fn advanced(column: impl Into<String>, method: SummaryMethod) -> Self {
        Self {
            column: column.into(),
            kind: SummaryKind::Advanced,
            method,
        }
    }
}

/// Parses `COLUMN:count|sum|mean|max|min`.
impl FromStr for Summary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, method) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected COLUMN:METHOD, got {s}"))?;
        if column.is_empty() {
            return Err(format!("missing column name in {s}"));
        }
        let method = match method.to_ascii_lowercase().as_str() {
            "count" => return Ok(Self::count(column)),
            "sum" => SummaryMethod::Sum,
            "mean" => SummaryMethod::Mean,
            "max" => SummaryMethod::Max,
            "min" => SummaryMethod::Min,
            other => return Err(format!("unknown summary method: {other}")),
        };
        Ok(Self::advanced(column, method))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match (self.kind, self.method) {
            (SummaryKind::Count, _) => "count",
            (SummaryKind::Advanced, SummaryMethod::Sum) => "sum",
            (SummaryKind::Advanced, SummaryMethod::Mean) => "mean",
            (SummaryKind::Advanced, SummaryMethod::Max) => "max",
            (SummaryKind::Advanced, SummaryMethod::Min) => "min",
            (SummaryKind::Advanced, SummaryMethod::Unknown) => "unknown",
        };
        write!(f, "{}:{method}", self.column)
    }
}

/// Value a summary reads for a row: formula results for formula columns,
/// the raw cell otherwise.
fn summary_value<'a>(
    column: &Column,
    row: &'a Row,
    formula_results: Option<&'a FormulaResults>,
) -> Option<&'a Value> {
    if column.column_type.is_formula() {
        formula_results?.get(&row.id)?.get(&column.key)
    } else {
        row.cell(column)
    }
}

fn best_by(
    column: &Column,
    rows: &[&Row],
    formula_results: Option<&FormulaResults>,
    better: fn(f64, f64) -> bool,
) -> f64 {
    let mut best: Option<f64> = None;
    for row in rows {
        let Some(candidate) = summary_value(column, row, formula_results).and_then(to_number)
        else {
            continue;
        };
        let replace = match best {
            Some(current) => better(candidate, current),
            None => true,
        };
        if replace {
            best = Some(candidate);
        }
    }
    best.unwrap_or(0.0)
}

/// Total of one summary over a group of rows.
///
/// Non-numeric cells are skipped. Every method yields `0` when nothing
/// contributes, so totals are always well-formed numbers.
pub fn get_total(
    column: &Column,
    kind: SummaryKind,
    method: SummaryMethod,
    rows: &[&Row],
    formula_results: Option<&FormulaResults>,
) -> f64 {
    if kind == SummaryKind::Count {
        return rows.len() as f64;
    }
    let numbers = || {
        rows.iter()
            .filter_map(|row| summary_value(column, row, formula_results))
            .filter_map(to_number)
    };
    match method {
        SummaryMethod::Sum => round_to(numbers().sum(), 8),
        SummaryMethod::Mean => {
            let (sum, count) = numbers()
                .fold((0.0, 0usize), |(sum, count), n| (sum + n, count + 1));
            if count == 0 {
                0.0
            } else {
                sum / count as f64
            }
        }
        // strict comparison keeps the earlier row on ties
        SummaryMethod::Max => best_by(column, rows, formula_results, |a, b| a > b),
        SummaryMethod::Min => best_by(column, rows, formula_results, |a, b| a < b),
        SummaryMethod::Unknown => {
            tracing::debug!(column = %column.name, "unknown summary method, total is 0");
            0.0
        }
    }
}
