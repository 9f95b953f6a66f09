//! Assertions for scenario validation.
//!
//! Each helper returns `Ok(())` or an `AssertionMismatch` naming what was
//! checked, so scenarios chain them with `?`.

use crate::result::{PagecheckError, PagecheckResult};
use std::fmt::Debug;

/// Assertion helpers for scenarios
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    pub fn equals<T: PartialEq + Debug + ?Sized>(
        what: &str,
        expected: &T,
        actual: &T,
    ) -> PagecheckResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(PagecheckError::mismatch(what, &expected, &actual))
        }
    }

    /// Assert a collection has `expected` items
    pub fn count<T>(what: &str, expected: usize, items: &[T]) -> PagecheckResult<()> {
        Self::equals(what, &expected, &items.len())
    }

    /// Assert a string contains a substring
    pub fn contains(what: &str, haystack: &str, needle: &str) -> PagecheckResult<()> {
        if haystack.contains(needle) {
            Ok(())
        } else {
            Err(PagecheckError::AssertionMismatch {
                what: what.to_string(),
                expected: format!("text containing {needle:?}"),
                actual: format!("{haystack:?}"),
            })
        }
    }

    /// Assert a condition is true
    pub fn is_true(what: &str, condition: bool) -> PagecheckResult<()> {
        Self::equals(what, &true, &condition)
    }

    /// Assert a condition is false
    pub fn is_false(what: &str, condition: bool) -> PagecheckResult<()> {
        Self::equals(what, &false, &condition)
    }

    /// Assert a sequence never decreases
    pub fn non_decreasing<T: PartialOrd + Debug>(what: &str, samples: &[T]) -> PagecheckResult<()> {
        match samples.windows(2).find(|pair| pair[1] < pair[0]) {
            None => Ok(()),
            Some(pair) => Err(PagecheckError::AssertionMismatch {
                what: what.to_string(),
                expected: "non-decreasing values".to_string(),
                actual: format!("{:?} followed by {:?} in {samples:?}", pair[0], pair[1]),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_equals() {
        assert!(Assertion::equals("title", "Automation Project", "Automation Project").is_ok());
        let err = Assertion::equals("title", "Automation Project", "Other").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assertion failed for title: expected \"Automation Project\", got \"Other\""
        );
    }

    #[test]
    fn test_equals_on_sequences() {
        let names = vec!["John".to_string(), "Jane".to_string()];
        assert!(Assertion::equals("names", &names, &names.clone()).is_ok());
        assert!(Assertion::equals("names", &names[..1], &names[..]).is_err());
    }

    #[test]
    fn test_count() {
        assert!(Assertion::count("h1 count", 1, &[()]).is_ok());
        let err = Assertion::count("table count", 2, &[(), (), ()]).unwrap_err();
        assert!(err.to_string().contains("expected 2, got 3"));
    }

    #[test]
    fn test_contains_and_booleans() {
        assert!(Assertion::contains("url", "file:///w/next.html", "next").is_ok());
        assert!(Assertion::contains("url", "file:///w/home.html", "next").is_err());
        assert!(Assertion::is_true("visible", true).is_ok());
        assert!(Assertion::is_false("visible", true).is_err());
    }

    #[test]
    fn test_non_decreasing() {
        assert!(Assertion::non_decreasing("progress", &[0, 10, 10, 40, 100]).is_ok());
        assert!(Assertion::non_decreasing::<u32>("progress", &[]).is_ok());
        let err = Assertion::non_decreasing("progress", &[0, 30, 20]).unwrap_err();
        assert!(err.to_string().contains("30 followed by 20"));
    }
}
