//! Common types shared across the point-series workspace.
//!
//! Everything that describes an opened raster source lives here: the parsed
//! [`GridMetadata`], raw samples, the [`RasterDataset`] / [`DatasetSource`]
//! traits that readers implement, and the error taxonomy used when a single
//! source fails.

pub mod coords;
pub mod dataset;
pub mod error;
pub mod memory;
pub mod metadata;

pub use coords::CoordinateSystem;
pub use dataset::{DatasetSource, RasterDataset};
pub use error::{ErrorKind, ExtractError, ExtractResult};
pub use memory::{MemoryDataset, MemorySource};
pub use metadata::{GridMetadata, RawSample, TimeAttributes, VariableAttributes, DEFAULT_CALENDAR};
