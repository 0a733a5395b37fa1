//! Comparators used when ordering grouped values.
//!
//! All of them are total so a stable sort gives the same order on every run.

use std::cmp::Ordering;

/// Case-insensitive text order, falling back to byte order on ties.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Order by declared option position; ids without a position go last.
pub fn compare_option_index(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_text() {
        assert_eq!(compare_text("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_text("B", "b"), Ordering::Less);
        assert_eq!(compare_text("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_compare_numbers() {
        assert_eq!(compare_numbers(2.0, 10.0), Ordering::Less);
        assert_eq!(compare_numbers(-0.5, -0.5), Ordering::Equal);
    }

    #[test]
    fn test_compare_option_index() {
        assert_eq!(compare_option_index(Some(2), Some(0)), Ordering::Greater);
        assert_eq!(compare_option_index(Some(5), None), Ordering::Less);
    }
}
