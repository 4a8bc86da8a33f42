//! Reader seam between file formats and the extraction engine.

use crate::error::{ExtractError, ExtractResult};
use crate::metadata::{GridMetadata, RawSample};

/// An opened gridded source exposing `x`, `y`, `time` and `[time, y, x]`
/// data variables.
pub trait RasterDataset {
    /// Names of every variable in the source.
    fn variable_names(&self) -> Vec<String>;

    /// Whether a variable of this name exists.
    fn has_variable(&self, name: &str) -> bool {
        self.variable_names().iter().any(|n| n == name)
    }

    /// Parse coordinates and attributes for `variable`.
    fn metadata(&self, variable: &str) -> ExtractResult<GridMetadata>;

    /// Raw numeric time axis, in source order.
    fn read_time(&self) -> ExtractResult<Vec<f64>>;

    /// Raw samples across the full time axis at one spatial index.
    ///
    /// Only the `[.., y_index, x_index]` slice is read, never the full grid.
    fn read_point(
        &self,
        metadata: &GridMetadata,
        y_index: usize,
        x_index: usize,
    ) -> ExtractResult<Vec<RawSample>>;
}

/// Something that can be opened into a [`RasterDataset`]: a file path, an
/// uploaded byte buffer, an in-memory array set.
pub trait DatasetSource: Sync {
    type Dataset: RasterDataset;

    /// Identifier reported alongside per-source errors.
    fn source_id(&self) -> &str;

    /// Open the source for reading.
    fn open(&self) -> ExtractResult<Self::Dataset>;
}

/// Bounds check shared by dataset implementations.
pub fn check_point_index(metadata: &GridMetadata, y_index: usize, x_index: usize) -> ExtractResult<()> {
    let [_, ny, nx] = metadata.shape();
    if y_index >= ny || x_index >= nx {
        return Err(ExtractError::IndexOutOfRange {
            y_index,
            x_index,
            ny,
            nx,
        });
    }
    Ok(())
}
