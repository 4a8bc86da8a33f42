//! Error types for NetCDF access.

use series_common::ExtractError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF access.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by libnetcdf / HDF5
    #[error("NetCDF error: {0}")]
    Library(#[from] netcdf::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<NetCdfError> for ExtractError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => ExtractError::Io(e),
            other => ExtractError::invalid_file(other.to_string()),
        }
    }
}
