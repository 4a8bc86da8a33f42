//! Common fixtures: axes, attributes and in-memory rainfall datasets.

use series_common::{MemoryDataset, MemorySource, VariableAttributes};

use crate::generators::{create_rainfall_cube, pack_values, regular_axis};

/// Name of the rainfall variable in HadUK-style files.
pub const RAINFALL_VARIABLE: &str = "rainfall_amount";

/// Time units used by the fixture datasets.
pub const TIME_UNITS: &str = "days since 2021-01-01 00:00:00";

/// Fill value used by the packed fixture variable.
pub const FILL_VALUE: f64 = -9999.0;

/// Scale factor used by the packed fixture variable.
pub const SCALE_FACTOR: f64 = 0.1;

/// Irish Grid axes around the default target (341914.1, 392651.1),
/// 1 km spacing.
pub mod irish_grid {
    /// Easting of column 0
    pub const X_START: f64 = 339_500.0;
    /// Northing of row 0
    pub const Y_START: f64 = 390_500.0;
    pub const STEP: f64 = 1000.0;
    pub const NX: usize = 5;
    pub const NY: usize = 4;

    /// Column nearest to the default target easting
    pub const TARGET_COL: usize = 2;
    /// Row nearest to the default target northing
    pub const TARGET_ROW: usize = 2;
}

/// Attributes of the packed rainfall variable.
pub fn rainfall_attributes() -> VariableAttributes {
    VariableAttributes::new(RAINFALL_VARIABLE)
        .with_scale_factor(SCALE_FACTOR)
        .with_fill_value(FILL_VALUE)
        .with_units("mm")
}

/// Daily rainfall on the Irish Grid fixture axes covering
/// `start_day .. start_day + days` (days since 2021-01-01).
///
/// Values are the seeded rainfall cube, packed with [`SCALE_FACTOR`].
pub fn rainfall_dataset(start_day: usize, days: usize, seed: u32) -> MemoryDataset {
    use irish_grid::*;

    let physical = create_rainfall_cube(days, NY, NX, seed);
    let raw = pack_values(&physical, SCALE_FACTOR, 0.0, FILL_VALUE);
    let time = regular_axis(start_day as f64, 1.0, days);

    MemoryDataset::new(
        regular_axis(X_START, STEP, NX),
        regular_axis(Y_START, STEP, NY),
        time,
        TIME_UNITS,
    )
    .with_variable(rainfall_attributes(), raw)
    .expect("fixture cube matches its axes")
}

/// Same as [`rainfall_dataset`], wrapped as a named source.
pub fn rainfall_source(id: &str, start_day: usize, days: usize, seed: u32) -> MemorySource {
    MemorySource::new(id, rainfall_dataset(start_day, days, seed))
}

/// One-cell dataset with explicit time offsets and raw values, unpacked.
pub fn single_cell_dataset(time: Vec<f64>, values: Vec<f64>) -> MemoryDataset {
    MemoryDataset::new(vec![0.0], vec![0.0], time, TIME_UNITS)
        .with_variable(VariableAttributes::new(RAINFALL_VARIABLE), values)
        .expect("one value per time step")
}

#[cfg(test)]
mod tests {
    use super::*;
    use series_common::RasterDataset;

    #[test]
    fn test_rainfall_dataset_shape() {
        let ds = rainfall_dataset(0, 7, 1);
        let meta = ds.metadata(RAINFALL_VARIABLE).unwrap();
        assert_eq!(meta.shape(), [7, irish_grid::NY, irish_grid::NX]);
        assert_eq!(meta.variable.fill_value, Some(FILL_VALUE));
        assert_eq!(ds.read_time().unwrap(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_single_cell_dataset() {
        let ds = single_cell_dataset(vec![0.0, 1.0], vec![3.0, 4.0]);
        assert!(ds.has_variable(RAINFALL_VARIABLE));
        assert_eq!(ds.time_len(), 2);
    }
}
