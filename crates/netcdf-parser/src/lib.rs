//! CF NetCDF raster sources.
//!
//! Opens NetCDF-4 files (from disk or from an in-memory buffer), locates the
//! `x`, `y` and `time` coordinate variables, reads CF packing attributes and
//! serves single-point time-axis slices through the
//! [`series_common::RasterDataset`] seam.
//!
//! ```ignore
//! use netcdf_parser::NetCdfSource;
//! use point_extractor::{PointRequest, SeriesAssembler};
//!
//! let sources = netcdf_parser::expand_sources(&["data/rainfall".into()], false)?;
//! let result = SeriesAssembler::default()
//!     .assemble(&sources, &PointRequest::new("rainfall_amount", 341914.1, 392651.1))?;
//! ```

pub mod discover;
pub mod error;
pub mod native;
pub mod reader;
pub mod source;
pub mod testdata;

pub use discover::{discover_netcdf_files, is_netcdf_path};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use reader::{NetCdfDataset, TIME_ALIASES, X_ALIASES, Y_ALIASES};
pub use source::{data_variables, expand_sources, list_variables, NetCdfSource};
