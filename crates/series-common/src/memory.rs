//! In-memory raster datasets.
//!
//! Useful when the caller already holds decoded arrays, and as the backing
//! store for tests. Data is laid out row-major as `[time][y][x]`.

use std::collections::BTreeMap;

use crate::dataset::{check_point_index, DatasetSource, RasterDataset};
use crate::error::{ExtractError, ExtractResult};
use crate::metadata::{GridMetadata, RawSample, TimeAttributes, VariableAttributes};

#[derive(Debug, Clone)]
struct MemoryVariable {
    attrs: VariableAttributes,
    data: Vec<f64>,
    mask: Option<Vec<bool>>,
}

/// A `[time, y, x]` raster held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    x: Vec<f64>,
    y: Vec<f64>,
    time: Vec<f64>,
    time_attrs: TimeAttributes,
    variables: BTreeMap<String, MemoryVariable>,
}

impl MemoryDataset {
    /// Create a dataset with the given axes and no variables.
    pub fn new(x: Vec<f64>, y: Vec<f64>, time: Vec<f64>, time_units: impl Into<String>) -> Self {
        Self {
            x,
            y,
            time,
            time_attrs: TimeAttributes::new(time_units, None),
            variables: BTreeMap::new(),
        }
    }

    /// Declare the calendar of the time axis.
    pub fn with_calendar(mut self, calendar: impl Into<String>) -> Self {
        self.time_attrs = TimeAttributes::new(self.time_attrs.units, Some(calendar.into()));
        self
    }

    /// Add a data variable. `data` must hold `time * y * x` values.
    pub fn with_variable(mut self, attrs: VariableAttributes, data: Vec<f64>) -> ExtractResult<Self> {
        let expected = self.cell_count();
        if data.len() != expected {
            return Err(ExtractError::shape_mismatch(&attrs.name, expected, data.len()));
        }
        self.variables.insert(
            attrs.name.clone(),
            MemoryVariable {
                attrs,
                data,
                mask: None,
            },
        );
        Ok(self)
    }

    /// Attach an explicit per-cell missing mask to an existing variable.
    pub fn with_mask(mut self, name: &str, mask: Vec<bool>) -> ExtractResult<Self> {
        let expected = self.cell_count();
        let variable = self
            .variables
            .get_mut(name)
            .ok_or_else(|| ExtractError::MissingVariable(name.to_string()))?;
        if mask.len() != expected {
            return Err(ExtractError::shape_mismatch(
                format!("{} mask", name),
                expected,
                mask.len(),
            ));
        }
        variable.mask = Some(mask);
        Ok(self)
    }

    /// Length of the time axis.
    pub fn time_len(&self) -> usize {
        self.time.len()
    }

    fn cell_count(&self) -> usize {
        self.time.len() * self.y.len() * self.x.len()
    }

    fn offset(&self, t: usize, y: usize, x: usize) -> usize {
        (t * self.y.len() + y) * self.x.len() + x
    }
}

impl RasterDataset for MemoryDataset {
    fn variable_names(&self) -> Vec<String> {
        let mut names = vec!["time".to_string(), "x".to_string(), "y".to_string()];
        names.extend(self.variables.keys().cloned());
        names
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn metadata(&self, variable: &str) -> ExtractResult<GridMetadata> {
        let var = self
            .variables
            .get(variable)
            .ok_or_else(|| ExtractError::MissingVariable(variable.to_string()))?;

        Ok(GridMetadata {
            x_coords: self.x.clone(),
            y_coords: self.y.clone(),
            time_len: self.time.len(),
            variable: var.attrs.clone(),
            time: self.time_attrs.clone(),
        })
    }

    fn read_time(&self) -> ExtractResult<Vec<f64>> {
        Ok(self.time.clone())
    }

    fn read_point(
        &self,
        metadata: &GridMetadata,
        y_index: usize,
        x_index: usize,
    ) -> ExtractResult<Vec<RawSample>> {
        check_point_index(metadata, y_index, x_index)?;
        let var = self
            .variables
            .get(&metadata.variable.name)
            .ok_or_else(|| ExtractError::MissingVariable(metadata.variable.name.clone()))?;

        let samples = (0..self.time.len())
            .map(|t| {
                let offset = self.offset(t, y_index, x_index);
                let mut sample = metadata.variable.raw_sample(var.data[offset]);
                if let Some(mask) = &var.mask {
                    sample.missing |= mask[offset];
                }
                sample
            })
            .collect();

        Ok(samples)
    }
}

/// A named in-memory source, optionally simulating an unreadable file.
#[derive(Debug, Clone)]
pub struct MemorySource {
    id: String,
    content: Result<MemoryDataset, String>,
}

impl MemorySource {
    pub fn new(id: impl Into<String>, dataset: MemoryDataset) -> Self {
        Self {
            id: id.into(),
            content: Ok(dataset),
        }
    }

    /// A source whose `open` always fails with an InvalidFile error.
    pub fn unreadable(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Err(reason.into()),
        }
    }
}

impl DatasetSource for MemorySource {
    type Dataset = MemoryDataset;

    fn source_id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> ExtractResult<MemoryDataset> {
        match &self.content {
            Ok(dataset) => Ok(dataset.clone()),
            Err(reason) => Err(ExtractError::invalid_file(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_dataset() -> MemoryDataset {
        // 2 time steps, 2 rows, 3 columns; value = t*100 + y*10 + x
        let mut data = Vec::new();
        for t in 0..2 {
            for y in 0..2 {
                for x in 0..3 {
                    data.push((t * 100 + y * 10 + x) as f64);
                }
            }
        }
        MemoryDataset::new(
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            "days since 2000-01-01",
        )
        .with_variable(VariableAttributes::new("v"), data)
        .unwrap()
    }

    #[test]
    fn test_read_point_slices_time_axis() {
        let ds = small_dataset();
        let metadata = ds.metadata("v").unwrap();
        let samples = ds.read_point(&metadata, 1, 2).unwrap();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![12.0, 112.0]);
        assert!(samples.iter().all(|s| !s.missing));
    }

    #[test]
    fn test_mask_marks_samples_missing() {
        let mut mask = vec![false; 12];
        mask[6 + 3 + 2] = true; // t=1, y=1, x=2
        let ds = small_dataset().with_mask("v", mask).unwrap();
        let metadata = ds.metadata("v").unwrap();
        let samples = ds.read_point(&metadata, 1, 2).unwrap();
        assert!(!samples[0].missing);
        assert!(samples[1].missing);
    }

    #[test]
    fn test_shape_validation() {
        let result = MemoryDataset::new(vec![0.0], vec![0.0], vec![0.0, 1.0], "days since 2000-01-01")
            .with_variable(VariableAttributes::new("v"), vec![1.0]);
        assert!(matches!(result, Err(ExtractError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_missing_variable() {
        let ds = small_dataset();
        assert!(!ds.has_variable("rain"));
        assert!(matches!(ds.metadata("rain"), Err(ExtractError::MissingVariable(_))));
    }

    #[test]
    fn test_out_of_range_index() {
        let ds = small_dataset();
        let metadata = ds.metadata("v").unwrap();
        assert!(matches!(
            ds.read_point(&metadata, 2, 0),
            Err(ExtractError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unreadable_source() {
        let source = MemorySource::unreadable("broken.nc", "not a NetCDF file");
        assert_eq!(source.source_id(), "broken.nc");
        assert!(matches!(source.open(), Err(ExtractError::InvalidFile(_))));
    }
}
