//! Finding NetCDF files in a directory.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{NetCdfError, NetCdfResult};

/// Whether `path` has a `.nc` extension (any case).
pub fn is_netcdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nc"))
}

/// `.nc` files under `dir`, sorted by path. Only the top level is scanned
/// unless `recursive` is set.
pub fn discover_netcdf_files(dir: &Path, recursive: bool) -> NetCdfResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(NetCdfError::MissingData(format!("{} is not a directory", dir.display())));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| NetCdfError::IoError(e.into()))?;
        if entry.file_type().is_file() && is_netcdf_path(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!(dir = %dir.display(), count = files.len(), recursive, "Discovered NetCDF files");
    Ok(files)
}
