//! NetCDF sources: files on disk or uploaded buffers.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use series_common::{DatasetSource, ExtractResult};

use crate::discover::discover_netcdf_files;
use crate::error::NetCdfResult;
use crate::reader::NetCdfDataset;

#[derive(Debug, Clone)]
enum Origin {
    Path(PathBuf),
    Bytes(Bytes),
}

/// A NetCDF file that has not been opened yet.
#[derive(Debug, Clone)]
pub struct NetCdfSource {
    id: String,
    origin: Origin,
}

impl NetCdfSource {
    /// A file on disk; the id is the path as given.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            origin: Origin::Path(path),
        }
    }

    /// An in-memory buffer, e.g. an uploaded file, identified by `name`.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            id: name.into(),
            origin: Origin::Bytes(data.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Path(path) => Some(path),
            Origin::Bytes(_) => None,
        }
    }
}

impl DatasetSource for NetCdfSource {
    type Dataset = NetCdfDataset;

    fn source_id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> ExtractResult<NetCdfDataset> {
        match &self.origin {
            Origin::Path(path) => NetCdfDataset::open(path),
            Origin::Bytes(data) => NetCdfDataset::from_bytes(data),
        }
    }
}

/// Turn command-line inputs into sources, keeping their order. Directories
/// expand to the `.nc` files inside them; anything else is taken as a file,
/// even if it does not exist, so that it is reported as a per-source error.
pub fn expand_sources(inputs: &[PathBuf], recursive: bool) -> NetCdfResult<Vec<NetCdfSource>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            sources.extend(
                discover_netcdf_files(input, recursive)?
                    .into_iter()
                    .map(NetCdfSource::from_path),
            );
        } else {
            sources.push(NetCdfSource::from_path(input.clone()));
        }
    }
    Ok(sources)
}

/// Names of every variable in `source`.
pub fn list_variables(source: &NetCdfSource) -> ExtractResult<Vec<String>> {
    use series_common::RasterDataset;
    Ok(source.open()?.variable_names())
}

/// Names of the `[time, y, x]` variables in `source`.
pub fn data_variables(source: &NetCdfSource) -> ExtractResult<Vec<String>> {
    Ok(source.open()?.data_variables())
}

#[cfg(test)]
mod tests {
    use super::*;
    use series_common::ErrorKind;
    use std::fs;

    #[test]
    fn test_expand_keeps_order_and_expands_directories() {
        let dir = tempfile::tempdir().unwrap();
        let monthly = dir.path().join("monthly");
        fs::create_dir(&monthly).unwrap();
        fs::write(monthly.join("02.nc"), b"").unwrap();
        fs::write(monthly.join("01.nc"), b"").unwrap();
        let single = dir.path().join("z.nc");

        let sources = expand_sources(&[single.clone(), monthly.clone()], false).unwrap();
        let ids: Vec<&str> = sources.iter().map(|s| s.source_id()).collect();
        assert_eq!(
            ids,
            vec![
                single.display().to_string(),
                monthly.join("01.nc").display().to_string(),
                monthly.join("02.nc").display().to_string(),
            ]
        );
    }

    #[test]
    fn test_garbage_bytes_are_invalid_file() {
        let source = NetCdfSource::from_bytes("upload.nc", b"definitely not netcdf".to_vec());
        assert_eq!(source.source_id(), "upload.nc");
        assert!(source.path().is_none());
        let err = source.open().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFile);
    }

    #[test]
    fn test_missing_path_is_invalid_file() {
        let source = NetCdfSource::from_path("/nonexistent/rain.nc");
        let err = source.open().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFile);
    }
}
