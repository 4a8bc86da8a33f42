//! Single-source point extraction.
//!
//! Composes nearest-index resolution, value decoding and time decoding for
//! one opened dataset. Informational notes are returned with the series so
//! that callers can render them however they like.

use serde::{Deserialize, Serialize};
use tracing::debug;

use series_common::{ExtractError, ExtractResult, RasterDataset};

use crate::decoder::decode_values;
use crate::resolver::{nearest_index, NearestIndex};
use crate::series::{DecodedSample, TimeSeries};
use crate::time::TimeDecoder;

const PREVIEW_LEN: usize = 5;

/// Grid cell chosen for the target coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestPoint {
    pub x: NearestIndex,
    pub y: NearestIndex,
}

/// Time series extracted from one source, before merging.
#[derive(Debug, Clone)]
pub struct SourceSeries {
    pub source_id: String,
    pub nearest: NearestPoint,
    pub series: TimeSeries,
    pub messages: Vec<String>,
}

/// Extract the time series of `variable` at the grid point nearest to
/// (`target_x`, `target_y`).
///
/// The two axes are resolved independently. Fails with `MissingVariable`
/// when the variable is absent and `EmptyGrid` when an axis is empty.
pub fn extract_point<D: RasterDataset + ?Sized>(
    dataset: &D,
    source_id: &str,
    variable: &str,
    target_x: f64,
    target_y: f64,
) -> ExtractResult<SourceSeries> {
    let mut messages = Vec::new();
    messages.push(format!("Variables in the file: {:?}", dataset.variable_names()));

    if !dataset.has_variable(variable) {
        return Err(ExtractError::MissingVariable(variable.to_string()));
    }
    messages.push(format!("Using variable: {}", variable));

    let metadata = dataset.metadata(variable)?;

    let x = nearest_index(&metadata.x_coords, target_x, "x")?;
    let y = nearest_index(&metadata.y_coords, target_y, "y")?;
    messages.push(format!("Nearest grid point: x={}, y={}", x.value, y.value));
    debug!(
        source = %source_id,
        x_index = x.index,
        y_index = y.index,
        x = x.value,
        y = y.value,
        "Resolved nearest grid point"
    );

    let attrs = &metadata.variable;
    messages.push(format!("Scale factor: {}", attrs.scale_factor));
    messages.push(format!("Add offset: {}", attrs.add_offset));
    messages.push(format!(
        "Fill value: {}",
        attrs
            .fill_value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "None".to_string())
    ));

    let raw = dataset.read_point(&metadata, y.index, x.index)?;
    let raw_time = dataset.read_time()?;
    if raw.len() != raw_time.len() {
        return Err(ExtractError::shape_mismatch(
            format!("{} time axis", variable),
            raw_time.len(),
            raw.len(),
        ));
    }

    let values = decode_values(&raw, attrs);
    let preview: Vec<f64> = raw.iter().take(PREVIEW_LEN).map(|s| s.value).collect();
    messages.push(format!("Raw {} data (first {} values): {:?}", variable, PREVIEW_LEN, preview));
    messages.push(format!(
        "Processed {} data (first {} values): {:?}",
        variable,
        PREVIEW_LEN,
        &values[..values.len().min(PREVIEW_LEN)]
    ));

    let decoder = TimeDecoder::new(&metadata.time)?;
    let timestamps = decoder.decode_all(&raw_time)?;
    messages.push(format!(
        "Time axis: {} ({} calendar), {} steps",
        metadata.time.units,
        decoder.calendar(),
        timestamps.len()
    ));

    let series: TimeSeries = timestamps
        .into_iter()
        .zip(values)
        .map(|(timestamp, value)| DecodedSample::new(timestamp, value))
        .collect();

    debug!(source = %source_id, samples = series.len(), "Extracted point series");

    Ok(SourceSeries {
        source_id: source_id.to_string(),
        nearest: NearestPoint { x, y },
        series,
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use series_common::{MemoryDataset, VariableAttributes};

    fn dataset() -> MemoryDataset {
        // 3 time steps on a 2x4 grid; value = t*100 + row*10 + col
        let mut data = Vec::new();
        for t in 0..3 {
            for row in 0..2 {
                for col in 0..4 {
                    data.push((t * 100 + row * 10 + col) as f64);
                }
            }
        }
        MemoryDataset::new(
            vec![0.0, 10.0, 20.0, 30.0],
            vec![500.0, 400.0],
            vec![0.0, 1.0, 2.0],
            "days since 2020-01-01",
        )
        .with_variable(
            VariableAttributes::new("rainfall_amount").with_scale_factor(0.5),
            data,
        )
        .unwrap()
    }

    #[test]
    fn test_extracts_nearest_point_series() {
        let result = extract_point(&dataset(), "a.nc", "rainfall_amount", 15.0, 410.0).unwrap();

        assert_eq!(result.nearest.x.index, 1);
        assert_eq!(result.nearest.y.index, 1);
        assert_eq!(result.series.len(), 3);
        assert_eq!(result.series.values(), vec![5.5, 55.5, 105.5]);
        assert_eq!(result.series.samples()[2].timestamp.to_string(), "2020-01-03 00:00:00");
        assert!(result.messages.iter().any(|m| m.starts_with("Nearest grid point")));
    }

    #[test]
    fn test_missing_variable() {
        let result = extract_point(&dataset(), "a.nc", "tas", 0.0, 0.0);
        assert!(matches!(result, Err(ExtractError::MissingVariable(name)) if name == "tas"));
    }

    #[test]
    fn test_empty_axis() {
        let ds = MemoryDataset::new(vec![], vec![0.0], vec![0.0], "days since 2020-01-01")
            .with_variable(VariableAttributes::new("v"), vec![])
            .unwrap();
        let result = extract_point(&ds, "empty.nc", "v", 0.0, 0.0);
        assert!(matches!(result, Err(ExtractError::EmptyGrid(_))));
    }

    #[test]
    fn test_nan_values_are_kept_at_extraction() {
        let ds = MemoryDataset::new(vec![0.0], vec![0.0], vec![0.0, 1.0], "days since 2020-01-01")
            .with_variable(VariableAttributes::new("v").with_fill_value(-1.0), vec![-1.0, 2.0])
            .unwrap();
        let result = extract_point(&ds, "a.nc", "v", 0.0, 0.0).unwrap();
        assert_eq!(result.series.len(), 2);
        assert!(result.series.samples()[0].is_missing());
    }
}
