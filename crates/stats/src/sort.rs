//! Ordering of grouped results by their labels.

use crate::label::GroupLabel;
use dtable_model::{Column, ColumnType, FormulaResultType};
use dtable_utils::{compare_dates, compare_numbers, compare_option_index, compare_text};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
enum LabelOrder {
    Option,
    Number,
    Date,
    Text,
}

impl LabelOrder {
    fn for_column(column: &Column) -> Self {
        match column.column_type {
            ColumnType::SingleSelect | ColumnType::MultipleSelect => LabelOrder::Option,
            ColumnType::Number | ColumnType::Rate => LabelOrder::Number,
            ColumnType::Formula | ColumnType::LinkFormula
                if column.formula_result_type() == FormulaResultType::Number =>
            {
                LabelOrder::Number
            }
            ColumnType::Date | ColumnType::Ctime | ColumnType::Mtime => LabelOrder::Date,
            _ => LabelOrder::Text,
        }
    }
}

fn compare_present(column: &Column, a: &GroupLabel, b: &GroupLabel) -> Ordering {
    let text = || compare_text(&a.to_string(), &b.to_string());
    match LabelOrder::for_column(column) {
        LabelOrder::Option => {
            let index = |label: &GroupLabel| {
                label
                    .first_text()
                    .and_then(|id| column.option_index(id))
            };
            compare_option_index(index(a), index(b)).then_with(text)
        }
        // numeric labels before the rest
        LabelOrder::Number => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => text(),
        },
        LabelOrder::Date => compare_dates(&a.to_string(), &b.to_string()),
        LabelOrder::Text => text(),
    }
}

/// Compare two labels the way groups of `column` are ordered.
///
/// Missing labels come first. Select labels follow the declared option
/// order. On numeric columns numbers compare numerically and sort before
/// labels that are not numbers. Dates compare chronologically and any
/// other label compares as text.
pub fn compare_labels(
    column: &Column,
    a: Option<&GroupLabel>,
    b: Option<&GroupLabel>,
) -> Ordering {
    let a = a.filter(|label| !label.is_missing());
    let b = b.filter(|label| !label.is_missing());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(column, a, b),
    }
}

/// Sort grouped results in ascending label order, in place.
///
/// The sort is stable: results with equal labels keep their order.
pub fn sort_statistics<T, F>(items: &mut [T], column: &Column, label: F)
where
    F: Fn(&T) -> Option<&GroupLabel>,
{
    items.sort_by(|x, y| compare_labels(column, label(x), label(y)));
}
