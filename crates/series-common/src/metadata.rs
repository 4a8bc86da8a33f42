//! Parsed attributes of one opened raster source.
//!
//! Attributes are probed once when a source is opened and stored here with
//! their CF defaults applied, so downstream code never re-checks whether an
//! attribute exists.

use serde::{Deserialize, Serialize};

/// Calendar assumed when the time variable carries no `calendar` attribute.
pub const DEFAULT_CALENDAR: &str = "standard";

/// CF attributes of the selected data variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAttributes {
    /// Variable name in the source
    pub name: String,
    /// Multiplicative packing factor (`scale_factor`, default 1.0)
    pub scale_factor: f64,
    /// Additive packing offset (`add_offset`, default 0.0)
    pub add_offset: f64,
    /// Declared `_FillValue` sentinel
    pub fill_value: Option<f64>,
    /// Declared `missing_value` sentinels
    pub missing_values: Vec<f64>,
    /// Lower bound of valid raw values (`valid_min` or `valid_range[0]`)
    pub valid_min: Option<f64>,
    /// Upper bound of valid raw values (`valid_max` or `valid_range[1]`)
    pub valid_max: Option<f64>,
    /// Physical units after decoding
    pub units: Option<String>,
    /// Human-readable description
    pub long_name: Option<String>,
}

impl VariableAttributes {
    /// Attributes for a variable with every CF attribute absent.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale_factor: 1.0,
            add_offset: 0.0,
            fill_value: None,
            missing_values: Vec::new(),
            valid_min: None,
            valid_max: None,
            units: None,
            long_name: None,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_add_offset(mut self, add_offset: f64) -> Self {
        self.add_offset = add_offset;
        self
    }

    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_values.push(missing_value);
        self
    }

    pub fn with_valid_range(mut self, min: f64, max: f64) -> Self {
        self.valid_min = Some(min);
        self.valid_max = Some(max);
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Whether the array representation itself marks `raw` as missing.
    ///
    /// This covers NaN raw values, `missing_value` sentinels and values outside
    /// the declared valid range. The `_FillValue` comparison is deliberately not
    /// part of this check; it belongs to the decoder.
    pub fn is_natively_missing(&self, raw: f64) -> bool {
        if raw.is_nan() {
            return true;
        }
        if self.missing_values.iter().any(|&mv| mv == raw) {
            return true;
        }
        if self.valid_min.is_some_and(|min| raw < min) {
            return true;
        }
        self.valid_max.is_some_and(|max| raw > max)
    }

    /// Tag a raw reading with the native missing marker.
    pub fn raw_sample(&self, raw: f64) -> RawSample {
        RawSample {
            value: raw,
            missing: self.is_natively_missing(raw),
        }
    }
}

impl Default for VariableAttributes {
    fn default() -> Self {
        Self::new("")
    }
}

/// Attributes of the time coordinate variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAttributes {
    /// Units string, e.g. `"days since 1970-01-01"`
    pub units: String,
    /// Calendar name, `"standard"` when not declared
    pub calendar: String,
}

impl TimeAttributes {
    pub fn new(units: impl Into<String>, calendar: Option<String>) -> Self {
        Self {
            units: units.into(),
            calendar: calendar
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CALENDAR.to_string()),
        }
    }
}

/// Everything needed to locate and decode one point in a `[time, y, x]` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMetadata {
    /// One entry per grid column
    pub x_coords: Vec<f64>,
    /// One entry per grid row
    pub y_coords: Vec<f64>,
    /// Length of the time dimension
    pub time_len: usize,
    /// Attributes of the selected variable
    pub variable: VariableAttributes,
    /// Attributes of the time axis
    pub time: TimeAttributes,
}

impl GridMetadata {
    /// Shape of the data variable as `[time, y, x]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.time_len, self.y_coords.len(), self.x_coords.len()]
    }
}

/// One raw reading at a fixed spatial index for one time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Stored (packed) value
    pub value: f64,
    /// Native missing-data marker from the array representation
    pub missing: bool,
}

impl RawSample {
    pub fn valid(value: f64) -> Self {
        Self {
            value,
            missing: false,
        }
    }

    pub fn masked(value: f64) -> Self {
        Self {
            value,
            missing: true,
        }
    }
}
