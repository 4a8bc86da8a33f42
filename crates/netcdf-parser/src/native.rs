//! Low-level helpers around the native netcdf library.
//!
//! libnetcdf only opens files by path, so in-memory buffers are spilled to a
//! temp file first. On Linux that file lives in `/dev/shm` (memory-backed
//! tmpfs) when it is writable.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Once, OnceLock};

use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use tempfile::TempPath;

use crate::error::NetCdfResult;

/// Silence HDF5's automatic error printing to stderr.
///
/// HDF5 prints diagnostics even for errors the caller handles, e.g. when an
/// optional attribute is absent:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Safe to call repeatedly; only the first call does anything. Call it before
/// the first file is opened.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with a null handler is the documented way to
        // disable automatic error printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Directory used for spilled buffers, probed once per process.
pub(crate) fn spill_dir() -> &'static PathBuf {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(optimal_temp_dir)
}

fn optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        use std::path::Path;
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() {
            let probe = shm_path.join(format!(".point_extract_probe_{}", std::process::id()));
            if std::fs::write(&probe, b"probe").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Write `data` to a uniquely named temp file. The file is deleted when the
/// returned path is dropped.
pub(crate) fn spill_to_temp(data: &[u8]) -> NetCdfResult<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("point_extract_")
        .suffix(".nc")
        .tempfile_in(spill_dir())?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file.into_temp_path())
}

/// Check for an attribute without triggering an HDF5 lookup error.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn attr_value(var: &netcdf::Variable, name: &str) -> Option<AttributeValue> {
    if !has_attr(var, name) {
        return None;
    }
    var.attribute_value(name)?.ok()
}

/// Numeric scalar attribute as f64.
pub(crate) fn f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    f64_list_attr(var, name).into_iter().next()
}

/// Numeric attribute as a list of f64, scalar or vector. Empty when absent
/// or not numeric.
pub(crate) fn f64_list_attr(var: &netcdf::Variable, name: &str) -> Vec<f64> {
    attr_value(var, name).map(numeric_values).unwrap_or_default()
}

/// Library default fill for a variable type, used when no `_FillValue` is
/// declared. Byte types have none.
pub(crate) fn default_fill_value(vartype: &NcVariableType) -> Option<f64> {
    let fill = match vartype {
        NcVariableType::Float(FloatType::F32) => 9.969_209_968_386_869e36_f32 as f64,
        NcVariableType::Float(FloatType::F64) => 9.969_209_968_386_869e36,
        NcVariableType::Int(IntType::I16) => -32_767.0,
        NcVariableType::Int(IntType::U16) => 65_535.0,
        NcVariableType::Int(IntType::I32) => -2_147_483_647.0,
        NcVariableType::Int(IntType::U32) => 4_294_967_295.0,
        NcVariableType::Int(IntType::I64) => -9_223_372_036_854_775_806_i64 as f64,
        NcVariableType::Int(IntType::U64) => 18_446_744_073_709_551_614_u64 as f64,
        _ => return None,
    };
    Some(fill)
}

/// Text attribute.
pub(crate) fn string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    match attr_value(var, name)? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(strs) => strs.into_iter().next(),
        _ => None,
    }
}

fn numeric_values(value: AttributeValue) -> Vec<f64> {
    match value {
        AttributeValue::Uchar(v) => vec![v as f64],
        AttributeValue::Uchars(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Schar(v) => vec![v as f64],
        AttributeValue::Schars(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ushort(v) => vec![v as f64],
        AttributeValue::Ushorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Short(v) => vec![v as f64],
        AttributeValue::Shorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Uint(v) => vec![v as f64],
        AttributeValue::Uints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Int(v) => vec![v as f64],
        AttributeValue::Ints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ulonglong(v) => vec![v as f64],
        AttributeValue::Ulonglongs(v) => v.into_iter().map(|x| x as f64).collect(),
        AttributeValue::Longlong(v) => vec![v as f64],
        AttributeValue::Longlongs(v) => v.into_iter().map(|x| x as f64).collect(),
        AttributeValue::Float(v) => vec![v as f64],
        AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Double(v) => vec![v],
        AttributeValue::Doubles(v) => v,
        _ => Vec::new(),
    }
}
