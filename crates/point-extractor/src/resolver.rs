//! Nearest-grid-point resolution along one coordinate axis.

use serde::{Deserialize, Serialize};

use series_common::{ExtractError, ExtractResult};

/// Result of resolving a target against one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestIndex {
    /// Index into the coordinate array
    pub index: usize,
    /// Coordinate value at that index
    pub value: f64,
}

/// Index of the coordinate closest to `target` by absolute difference.
///
/// The array does not need to be sorted. Ties go to the lowest index, and a
/// target outside the axis range silently resolves to the nearest endpoint.
/// `axis` only labels the error for an empty array.
pub fn nearest_index(coords: &[f64], target: f64, axis: &str) -> ExtractResult<NearestIndex> {
    let (first, rest) = coords
        .split_first()
        .ok_or_else(|| ExtractError::EmptyGrid(axis.to_string()))?;

    let mut best = NearestIndex {
        index: 0,
        value: *first,
    };
    let mut best_distance = (first - target).abs();

    for (i, &value) in rest.iter().enumerate() {
        let distance = (value - target).abs();
        // Strict comparison keeps the first minimum
        if distance < best_distance || (best_distance.is_nan() && !distance.is_nan()) {
            best = NearestIndex { index: i + 1, value };
            best_distance = distance;
        }
    }

    Ok(best)
}
