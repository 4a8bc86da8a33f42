//! CF decoding of raw samples into physical values.

use series_common::{RawSample, VariableAttributes};

/// Decode one raw sample.
///
/// A sample is missing when it equals the declared `_FillValue` or already
/// carries the array's native missing marker; missing samples decode to NaN.
/// Everything else becomes `raw * scale_factor + add_offset`.
#[inline]
pub fn decode_sample(sample: RawSample, attrs: &VariableAttributes) -> f64 {
    let is_fill = attrs.fill_value.is_some_and(|fill| fill == sample.value);
    if sample.missing || is_fill {
        f64::NAN
    } else {
        sample.value * attrs.scale_factor + attrs.add_offset
    }
}

/// Decode a time-axis slice in a single pass. Output length equals input length.
pub fn decode_values(samples: &[RawSample], attrs: &VariableAttributes) -> Vec<f64> {
    samples.iter().map(|&s| decode_sample(s, attrs)).collect()
}
