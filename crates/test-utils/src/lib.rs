//! Shared test utilities for the point-extract workspace.
//!
//! - Test data path helpers
//! - Skip macros for optional test data
//! - Synthetic `[time, y, x]` cube generators
//! - In-memory dataset fixtures
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Skip a test if the required file is not found.
///
/// Used by tests that read real NetCDF downloads which are not checked in.
///
/// ```ignore
/// #[test]
/// fn test_real_rainfall_file() {
///     let path = require_test_file!("rainfall_hadukgrid_uk_1km_day_20210101-20210131.nc");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Set TEST_DATA_DIR to a directory containing it.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Approximate floating-point equality.
///
/// ```ignore
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Element-wise approximate equality for series values, treating NaN as
/// equal to NaN.
#[macro_export]
macro_rules! assert_series_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: &[f64] = &$left;
        let right: &[f64] = &$right;
        assert_eq!(left.len(), right.len(), "series lengths differ: {:?} vs {:?}", left, right);
        for (l, r) in left.iter().zip(right.iter()) {
            if l.is_nan() || r.is_nan() {
                assert!(l.is_nan() && r.is_nan(), "NaN mismatch: {:?} vs {:?}", left, right);
            } else {
                $crate::assert_approx_eq!(*l, *r, $epsilon);
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_series_approx_eq_with_nan() {
        assert_series_approx_eq!(vec![0.5, f64::NAN, 1.0], vec![0.50001, f64::NAN, 1.0], 0.001);
    }

    #[test]
    #[should_panic(expected = "NaN mismatch")]
    fn test_series_approx_eq_nan_mismatch() {
        assert_series_approx_eq!(vec![f64::NAN], vec![1.0], 0.001);
    }
}
