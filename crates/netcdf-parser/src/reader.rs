//! CF NetCDF datasets behind the [`RasterDataset`] seam.

use std::path::Path;

use tempfile::TempPath;
use tracing::debug;

use series_common::dataset::check_point_index;
use series_common::{
    ExtractError, ExtractResult, GridMetadata, RasterDataset, RawSample, TimeAttributes,
    VariableAttributes,
};

use crate::error::NetCdfError;
use crate::native::{
    default_fill_value, f64_attr, f64_list_attr, silence_hdf5_errors, spill_to_temp, string_attr,
};

/// Names tried for the x coordinate, in order.
pub const X_ALIASES: &[&str] = &["x", "projection_x_coordinate", "lon", "longitude"];
/// Names tried for the y coordinate, in order.
pub const Y_ALIASES: &[&str] = &["y", "projection_y_coordinate", "lat", "latitude"];
/// Names tried for the time coordinate.
pub const TIME_ALIASES: &[&str] = &["time"];

/// An open NetCDF file.
pub struct NetCdfDataset {
    // Declared before the spill path so the handle closes before the file is removed
    file: netcdf::File,
    _spill: Option<TempPath>,
}

impl NetCdfDataset {
    /// Open a file on disk.
    pub fn open(path: impl AsRef<Path>) -> ExtractResult<Self> {
        silence_hdf5_errors();
        let path = path.as_ref();
        let file = netcdf::open(path).map_err(|e| {
            ExtractError::invalid_file(format!("failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { file, _spill: None })
    }

    /// Open an in-memory NetCDF buffer (for example an upload).
    pub fn from_bytes(data: &[u8]) -> ExtractResult<Self> {
        silence_hdf5_errors();
        let spill = spill_to_temp(data)?;
        let file = netcdf::open(&spill)
            .map_err(|e| ExtractError::invalid_file(format!("failed to open NetCDF buffer: {}", e)))?;
        debug!(path = %spill.display(), size = data.len(), "Spilled NetCDF buffer to temp file");
        Ok(Self {
            file,
            _spill: Some(spill),
        })
    }

    /// Variables that can be extracted: those with exactly three dimensions.
    pub fn data_variables(&self) -> Vec<String> {
        self.file
            .variables()
            .filter(|v| v.dimensions().len() == 3)
            .map(|v| v.name())
            .collect()
    }

    fn coordinate(&self, aliases: &[&str], axis: &str) -> Result<netcdf::Variable<'_>, NetCdfError> {
        aliases
            .iter()
            .find_map(|name| self.file.variable(name))
            .ok_or_else(|| {
                NetCdfError::MissingData(format!("{} coordinate variable (tried {:?})", axis, aliases))
            })
    }

    fn read_axis(var: &netcdf::Variable) -> Result<Vec<f64>, NetCdfError> {
        let ndims = var.dimensions().len();
        if ndims != 1 {
            return Err(NetCdfError::InvalidFormat(format!(
                "coordinate variable '{}' has {} dimensions, expected 1",
                var.name(),
                ndims
            )));
        }
        Ok(var.get_values::<f64, _>(..)?)
    }

    fn time_attributes(var: &netcdf::Variable) -> ExtractResult<TimeAttributes> {
        let units = string_attr(var, "units").ok_or_else(|| {
            ExtractError::invalid_time_units("", format!("'{}' has no units attribute", var.name()))
        })?;
        Ok(TimeAttributes::new(units, string_attr(var, "calendar")))
    }
}

/// Read every CF attribute the decoder uses.
fn variable_attributes(var: &netcdf::Variable) -> VariableAttributes {
    let mut attrs = VariableAttributes::new(var.name());
    if let Some(scale) = f64_attr(var, "scale_factor") {
        attrs.scale_factor = scale;
    }
    if let Some(offset) = f64_attr(var, "add_offset") {
        attrs.add_offset = offset;
    }
    attrs.fill_value = f64_attr(var, "_FillValue").or_else(|| default_fill_value(&var.vartype()));
    attrs.missing_values = f64_list_attr(var, "missing_value");

    let valid_range = f64_list_attr(var, "valid_range");
    if let [min, max] = valid_range[..] {
        attrs.valid_min = Some(min);
        attrs.valid_max = Some(max);
    }
    if let Some(min) = f64_attr(var, "valid_min") {
        attrs.valid_min = Some(min);
    }
    if let Some(max) = f64_attr(var, "valid_max") {
        attrs.valid_max = Some(max);
    }

    attrs.units = string_attr(var, "units");
    attrs.long_name = string_attr(var, "long_name");
    attrs
}

impl RasterDataset for NetCdfDataset {
    fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    fn metadata(&self, variable: &str) -> ExtractResult<GridMetadata> {
        let var = self
            .file
            .variable(variable)
            .ok_or_else(|| ExtractError::MissingVariable(variable.to_string()))?;

        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let [nt, ny, nx] = dims[..] else {
            return Err(ExtractError::invalid_file(format!(
                "variable '{}' has {} dimensions, expected [time, y, x]",
                variable,
                dims.len()
            )));
        };

        let x_coords = Self::read_axis(&self.coordinate(X_ALIASES, "x")?)?;
        let y_coords = Self::read_axis(&self.coordinate(Y_ALIASES, "y")?)?;
        let time_var = self.coordinate(TIME_ALIASES, "time")?;
        let time_len = time_var.dimensions().iter().map(|d| d.len()).product::<usize>();

        if x_coords.len() != nx {
            return Err(ExtractError::shape_mismatch(format!("{} x dimension", variable), x_coords.len(), nx));
        }
        if y_coords.len() != ny {
            return Err(ExtractError::shape_mismatch(format!("{} y dimension", variable), y_coords.len(), ny));
        }
        if time_len != nt {
            return Err(ExtractError::shape_mismatch(format!("{} time dimension", variable), time_len, nt));
        }

        let metadata = GridMetadata {
            x_coords,
            y_coords,
            time_len,
            variable: variable_attributes(&var),
            time: Self::time_attributes(&time_var)?,
        };
        debug!(
            variable,
            shape = ?metadata.shape(),
            scale_factor = metadata.variable.scale_factor,
            fill_value = ?metadata.variable.fill_value,
            calendar = %metadata.time.calendar,
            "Read NetCDF metadata"
        );
        Ok(metadata)
    }

    fn read_time(&self) -> ExtractResult<Vec<f64>> {
        let var = self.coordinate(TIME_ALIASES, "time")?;
        Ok(Self::read_axis(&var)?)
    }

    fn read_point(
        &self,
        metadata: &GridMetadata,
        y_index: usize,
        x_index: usize,
    ) -> ExtractResult<Vec<RawSample>> {
        check_point_index(metadata, y_index, x_index)?;
        let name = &metadata.variable.name;
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| ExtractError::MissingVariable(name.clone()))?;

        let values = var
            .get_values::<f64, _>((.., y_index, x_index))
            .map_err(NetCdfError::from)?;

        Ok(values
            .into_iter()
            .map(|raw| metadata.variable.raw_sample(raw))
            .collect())
    }
}
