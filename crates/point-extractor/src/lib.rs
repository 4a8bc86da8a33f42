//! Point time-series extraction from gridded rainfall/climate data.
//!
//! Given a variable name and a target coordinate pair, this crate finds the
//! nearest grid cell in each source, decodes the CF-encoded values and
//! timestamps at that cell, and merges the per-source fragments into one
//! date-ordered series.
//!
//! # Example
//!
//! ```
//! use point_extractor::{PointRequest, SeriesAssembler};
//! use series_common::{MemoryDataset, MemorySource, VariableAttributes};
//!
//! let dataset = MemoryDataset::new(vec![0.0, 10.0], vec![0.0], vec![0.0, 1.0], "days since 2021-01-01")
//!     .with_variable(VariableAttributes::new("rainfall_amount"), vec![1.0, 2.0, 3.0, 4.0])
//!     .unwrap();
//! let sources = vec![MemorySource::new("rain.nc", dataset)];
//!
//! let result = SeriesAssembler::default()
//!     .assemble(&sources, &PointRequest::new("rainfall_amount", 9.0, 0.0))
//!     .unwrap();
//! assert_eq!(result.series.values(), vec![2.0, 4.0]);
//! ```

pub mod assembler;
pub mod calendar;
pub mod decoder;
pub mod export;
pub mod extractor;
pub mod resolver;
pub mod series;
pub mod summary;
pub mod time;

pub use assembler::{
    AssembledSeries, AssemblerOptions, ExtractionError, PointRequest, Progress, SeriesAssembler,
    SourceReport,
};
pub use calendar::{Calendar, CfDateTime};
pub use decoder::{decode_sample, decode_values};
pub use export::{default_file_name, to_csv_string, write_csv, write_csv_file};
pub use extractor::{extract_point, NearestPoint, SourceSeries};
pub use resolver::{nearest_index, NearestIndex};
pub use series::{DecodedSample, TimeSeries};
pub use summary::SummaryStatistics;
pub use time::{decode_times, TimeDecoder, TimeUnit};
