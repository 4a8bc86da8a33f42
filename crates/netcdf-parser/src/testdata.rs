//! Small CF-style NetCDF files for tests.
//!
//! ```ignore
//! let fixture = NetCdfFixture::new(vec![0.0, 10.0], vec![0.0], vec![0.0, 1.0], data);
//! write_netcdf(&dir.path().join("rain.nc"), &fixture)?;
//! ```

use std::path::Path;

use crate::error::NetCdfResult;

/// How the data variable is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// 64-bit floats, values written as given
    Double,
    /// 32-bit floats
    Float,
    /// 16-bit integers, values rounded (for packed `scale_factor` encodings)
    Short,
}

/// Description of a `[time, y, x]` NetCDF file.
#[derive(Debug, Clone)]
pub struct NetCdfFixture {
    pub x_name: String,
    pub y_name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub time: Vec<f64>,
    pub time_units: String,
    pub calendar: Option<String>,
    pub variable: String,
    /// Raw values in `[time, y, x]` row-major order
    pub data: Vec<f64>,
    pub storage: Storage,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
    pub valid_range: Option<(f64, f64)>,
    pub units: Option<String>,
    /// Only the first N time steps are written; the rest keep the library fill
    pub written_steps: Option<usize>,
}

impl NetCdfFixture {
    /// Unpacked `rainfall_amount` on `projection_x_coordinate` /
    /// `projection_y_coordinate` axes, time in days since 2021-01-01.
    pub fn new(x: Vec<f64>, y: Vec<f64>, time: Vec<f64>, data: Vec<f64>) -> Self {
        Self {
            x_name: "projection_x_coordinate".to_string(),
            y_name: "projection_y_coordinate".to_string(),
            x,
            y,
            time,
            time_units: "days since 2021-01-01 00:00:00".to_string(),
            calendar: Some("standard".to_string()),
            variable: "rainfall_amount".to_string(),
            data,
            storage: Storage::Double,
            scale_factor: None,
            add_offset: None,
            fill_value: None,
            missing_value: None,
            valid_range: None,
            units: Some("mm".to_string()),
            written_steps: None,
        }
    }

    pub fn with_axis_names(mut self, x_name: &str, y_name: &str) -> Self {
        self.x_name = x_name.to_string();
        self.y_name = y_name.to_string();
        self
    }

    pub fn with_variable(mut self, name: &str) -> Self {
        self.variable = name.to_string();
        self
    }

    pub fn with_time_units(mut self, units: &str, calendar: Option<&str>) -> Self {
        self.time_units = units.to_string();
        self.calendar = calendar.map(str::to_string);
        self
    }

    /// Store as i16 with the given packing attributes.
    pub fn packed(mut self, scale_factor: f64, fill_value: f64) -> Self {
        self.storage = Storage::Short;
        self.scale_factor = Some(scale_factor);
        self.fill_value = Some(fill_value);
        self
    }

    pub fn with_add_offset(mut self, add_offset: f64) -> Self {
        self.add_offset = Some(add_offset);
        self
    }

    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_value = Some(missing_value);
        self
    }

    pub fn with_valid_range(mut self, min: f64, max: f64) -> Self {
        self.valid_range = Some((min, max));
        self
    }

    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Leave every time step from `steps` on unwritten.
    pub fn with_written_steps(mut self, steps: usize) -> Self {
        self.written_steps = Some(steps);
        self
    }
}

/// Write `fixture` to `path` as a NetCDF-4 file.
pub fn write_netcdf(path: &Path, fixture: &NetCdfFixture) -> NetCdfResult<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("time", fixture.time.len())?;
    file.add_dimension(&fixture.y_name, fixture.y.len())?;
    file.add_dimension(&fixture.x_name, fixture.x.len())?;

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("standard_name", "time")?;
        time_var.put_attribute("units", fixture.time_units.as_str())?;
        if let Some(calendar) = &fixture.calendar {
            time_var.put_attribute("calendar", calendar.as_str())?;
        }
        time_var.put_values(&fixture.time, ..)?;
    }

    {
        let mut y_var = file.add_variable::<f64>(&fixture.y_name, &[fixture.y_name.as_str()])?;
        y_var.put_attribute("units", "m")?;
        y_var.put_values(&fixture.y, ..)?;
    }

    {
        let mut x_var = file.add_variable::<f64>(&fixture.x_name, &[fixture.x_name.as_str()])?;
        x_var.put_attribute("units", "m")?;
        x_var.put_values(&fixture.x, ..)?;
    }

    let dims = ["time", fixture.y_name.as_str(), fixture.x_name.as_str()];
    match fixture.storage {
        Storage::Double => {
            let mut var = file.add_variable::<f64>(&fixture.variable, &dims)?;
            if let Some(fill) = fixture.fill_value {
                var.put_attribute("_FillValue", fill)?;
            }
            if let Some(missing) = fixture.missing_value {
                var.put_attribute("missing_value", missing)?;
            }
            if let Some((min, max)) = fixture.valid_range {
                var.put_attribute("valid_range", vec![min, max])?;
            }
            write_common_attributes(&mut var, fixture)?;
            put_data(&mut var, &fixture.data, fixture)?;
        }
        Storage::Float => {
            let mut var = file.add_variable::<f32>(&fixture.variable, &dims)?;
            if let Some(fill) = fixture.fill_value {
                var.put_attribute("_FillValue", fill as f32)?;
            }
            if let Some(missing) = fixture.missing_value {
                var.put_attribute("missing_value", missing as f32)?;
            }
            if let Some((min, max)) = fixture.valid_range {
                var.put_attribute("valid_range", vec![min as f32, max as f32])?;
            }
            write_common_attributes(&mut var, fixture)?;
            let values: Vec<f32> = fixture.data.iter().map(|&v| v as f32).collect();
            put_data(&mut var, &values, fixture)?;
        }
        Storage::Short => {
            let mut var = file.add_variable::<i16>(&fixture.variable, &dims)?;
            if let Some(fill) = fixture.fill_value {
                var.put_attribute("_FillValue", fill as i16)?;
            }
            if let Some(missing) = fixture.missing_value {
                var.put_attribute("missing_value", missing as i16)?;
            }
            if let Some((min, max)) = fixture.valid_range {
                var.put_attribute("valid_range", vec![min as i16, max as i16])?;
            }
            write_common_attributes(&mut var, fixture)?;
            let packed: Vec<i16> = fixture.data.iter().map(|v| v.round() as i16).collect();
            put_data(&mut var, &packed, fixture)?;
        }
    }

    Ok(())
}

fn put_data<T: netcdf::NcTypeDescriptor>(
    var: &mut netcdf::VariableMut,
    data: &[T],
    fixture: &NetCdfFixture,
) -> NetCdfResult<()> {
    let steps = fixture
        .written_steps
        .map_or(fixture.time.len(), |n| n.min(fixture.time.len()));
    if steps == 0 {
        return Ok(());
    }
    let len = (steps * fixture.y.len() * fixture.x.len()).min(data.len());
    var.put_values(&data[..len], (..steps, .., ..))?;
    Ok(())
}

fn write_common_attributes(var: &mut netcdf::VariableMut, fixture: &NetCdfFixture) -> NetCdfResult<()> {
    if let Some(scale) = fixture.scale_factor {
        var.put_attribute("scale_factor", scale)?;
    }
    if let Some(offset) = fixture.add_offset {
        var.put_attribute("add_offset", offset)?;
    }
    if let Some(units) = &fixture.units {
        var.put_attribute("units", units.as_str())?;
    }
    var.put_attribute("long_name", fixture.variable.as_str())?;
    Ok(())
}
