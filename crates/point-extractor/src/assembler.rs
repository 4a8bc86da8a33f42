//! Multi-source series assembly.
//!
//! Runs the point extractor once per source, isolates per-source failures,
//! then merges the fragments into one date-ordered series with missing
//! values removed.
//!
//! ```text
//! sources ──► open + extract_point (one task per source, rayon)
//!                 │
//!                 ├─► Ok  ──► fragment
//!                 └─► Err ──► ExtractionError { source_id, kind, reason }
//!                 │
//!   collect in source-list order
//!                 │
//!   stable sort by timestamp ──► drop NaN ──► summary statistics
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use series_common::{CoordinateSystem, DatasetSource, ErrorKind, ExtractError, ExtractResult};

use crate::extractor::{extract_point, NearestPoint, SourceSeries};
use crate::series::TimeSeries;
use crate::summary::SummaryStatistics;

/// What to extract: one variable at one target coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRequest {
    /// Variable name in the sources
    pub variable: String,
    /// Target x in the dataset's native grid units
    pub target_x: f64,
    /// Target y in the dataset's native grid units
    pub target_y: f64,
    /// System the caller says the target is expressed in (not transformed)
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
}

impl PointRequest {
    pub fn new(variable: impl Into<String>, target_x: f64, target_y: f64) -> Self {
        Self {
            variable: variable.into(),
            target_x,
            target_y,
            coordinate_system: CoordinateSystem::default(),
        }
    }

    pub fn with_coordinate_system(mut self, coordinate_system: CoordinateSystem) -> Self {
        self.coordinate_system = coordinate_system;
        self
    }

    /// Request-level validation, independent of any source.
    pub fn validate(&self) -> ExtractResult<()> {
        if self.variable.trim().is_empty() {
            return Err(ExtractError::invalid_request("variable name is empty"));
        }
        self.coordinate_system
            .validate_target(self.target_x, self.target_y)
    }
}

/// Failure of one source, recorded instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionError {
    pub source_id: String,
    pub kind: ErrorKind,
    pub reason: String,
}

impl ExtractionError {
    fn from_error(source_id: &str, err: &ExtractError) -> Self {
        Self {
            source_id: source_id.to_string(),
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error processing {}: {} ({})", self.source_id, self.reason, self.kind)
    }
}

/// Per-source details kept alongside the merged series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source_id: String,
    pub nearest: NearestPoint,
    /// Samples extracted, NaN entries included
    pub samples: usize,
    pub messages: Vec<String>,
}

/// Progress notification, sent once per processed source.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub completed: usize,
    pub total: usize,
    pub source_id: &'a str,
}

/// Result of one extraction request.
#[derive(Debug, Clone)]
pub struct AssembledSeries {
    /// Date-ordered series with NaN entries removed
    pub series: TimeSeries,
    /// One entry per failed source, in source-list order
    pub errors: Vec<ExtractionError>,
    /// Statistics over the retained values
    pub summary: SummaryStatistics,
    /// One entry per successful source, in source-list order
    pub sources: Vec<SourceReport>,
}

impl AssembledSeries {
    /// True when no source produced a fragment.
    pub fn all_failed(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Options controlling batch execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssemblerOptions {
    /// Process sources concurrently
    pub parallel: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Runs point extraction over a batch of sources.
#[derive(Debug, Clone, Default)]
pub struct SeriesAssembler {
    options: AssemblerOptions,
}

impl SeriesAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self { options }
    }

    /// Extract, merge, order and filter the series for `request`.
    ///
    /// Only request-level problems (no sources, empty variable name, invalid
    /// target) return `Err`; per-source failures land in
    /// [`AssembledSeries::errors`].
    pub fn assemble<S: DatasetSource>(
        &self,
        sources: &[S],
        request: &PointRequest,
    ) -> ExtractResult<AssembledSeries> {
        self.assemble_with_progress(sources, request, |_| {})
    }

    /// Like [`SeriesAssembler::assemble`], calling `on_progress` after each
    /// source completes.
    pub fn assemble_with_progress<S, F>(
        &self,
        sources: &[S],
        request: &PointRequest,
        on_progress: F,
    ) -> ExtractResult<AssembledSeries>
    where
        S: DatasetSource,
        F: Fn(Progress<'_>) + Sync,
    {
        if sources.is_empty() {
            return Err(ExtractError::invalid_request("at least one source is required"));
        }
        request.validate()?;

        info!(
            sources = sources.len(),
            variable = %request.variable,
            x = request.target_x,
            y = request.target_y,
            coordinate_system = %request.coordinate_system,
            parallel = self.options.parallel,
            "Assembling point series"
        );

        let total = sources.len();
        let completed = AtomicUsize::new(0);
        let run = |source: &S| {
            let outcome = process_source(source, request);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            on_progress(Progress {
                completed: done,
                total,
                source_id: source.source_id(),
            });
            outcome
        };

        // Both paths yield outcomes in source-list order
        let outcomes: Vec<ExtractResult<SourceSeries>> = if self.options.parallel {
            sources.par_iter().map(run).collect()
        } else {
            sources.iter().map(run).collect()
        };

        Ok(merge_outcomes(sources, outcomes))
    }
}

fn process_source<S: DatasetSource>(source: &S, request: &PointRequest) -> ExtractResult<SourceSeries> {
    let dataset = source.open()?;
    extract_point(
        &dataset,
        source.source_id(),
        &request.variable,
        request.target_x,
        request.target_y,
    )
}

fn merge_outcomes<S: DatasetSource>(
    sources: &[S],
    outcomes: Vec<ExtractResult<SourceSeries>>,
) -> AssembledSeries {
    let mut series = TimeSeries::new();
    let mut errors = Vec::new();
    let mut reports = Vec::new();

    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            Ok(fragment) => {
                reports.push(SourceReport {
                    source_id: fragment.source_id,
                    nearest: fragment.nearest,
                    samples: fragment.series.len(),
                    messages: fragment.messages,
                });
                series.extend(fragment.series.into_samples());
            }
            Err(err) => {
                warn!(source = %source.source_id(), error = %err, "Failed to extract point series");
                errors.push(ExtractionError::from_error(source.source_id(), &err));
            }
        }
    }

    series.sort_by_time();
    let extracted = series.len();
    series.drop_missing();
    let summary = SummaryStatistics::from_values(&series.values());

    info!(
        succeeded = reports.len(),
        failed = errors.len(),
        extracted,
        retained = series.len(),
        "Point series assembled"
    );

    AssembledSeries {
        series,
        errors,
        summary,
        sources: reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use series_common::{MemoryDataset, MemorySource, VariableAttributes};
    use std::sync::Mutex;

    fn single_cell(id: &str, time: Vec<f64>, values: Vec<f64>) -> MemorySource {
        let ds = MemoryDataset::new(vec![0.0], vec![0.0], time, "days since 2021-01-01")
            .with_variable(VariableAttributes::new("v"), values)
            .unwrap();
        MemorySource::new(id, ds)
    }

    #[test]
    fn test_merge_interleaves_and_drops_nan() {
        let sources = vec![
            single_cell("a.nc", vec![0.0, 2.0], vec![1.0, f64::NAN]),
            single_cell("b.nc", vec![1.0], vec![2.0]),
        ];
        let result = SeriesAssembler::default()
            .assemble(&sources, &PointRequest::new("v", 0.0, 0.0))
            .unwrap();

        let rows: Vec<(String, f64)> = result
            .series
            .iter()
            .map(|s| (s.timestamp.to_string(), s.value))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("2021-01-01 00:00:00".to_string(), 1.0),
                ("2021-01-02 00:00:00".to_string(), 2.0),
            ]
        );
        assert!(result.errors.is_empty());
        assert_eq!(result.summary.count, 2);
    }

    #[test]
    fn test_equal_timestamps_keep_source_order() {
        for parallel in [true, false] {
            let sources = vec![
                single_cell("a.nc", vec![0.0], vec![10.0]),
                single_cell("b.nc", vec![0.0], vec![20.0]),
                single_cell("c.nc", vec![0.0], vec![30.0]),
            ];
            let result = SeriesAssembler::new(AssemblerOptions { parallel })
                .assemble(&sources, &PointRequest::new("v", 0.0, 0.0))
                .unwrap();
            assert_eq!(result.series.values(), vec![10.0, 20.0, 30.0]);
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let sources = vec![
            single_cell("a.nc", vec![0.0], vec![1.0]),
            MemorySource::unreadable("b.nc", "not a NetCDF file"),
            single_cell("c.nc", vec![1.0], vec![3.0]),
        ];
        let result = SeriesAssembler::default()
            .assemble(&sources, &PointRequest::new("v", 0.0, 0.0))
            .unwrap();
        assert_eq!(result.series.values(), vec![1.0, 3.0]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].source_id, "b.nc");
        assert_eq!(result.errors[0].kind, ErrorKind::InvalidFile);
        assert_eq!(result.sources.len(), 2);
    }

    #[test]
    fn test_unparseable_time_units_fail_only_their_source() {
        for parallel in [true, false] {
            let bad = MemoryDataset::new(vec![0.0], vec![0.0], vec![0.0], "days since 2021-01-01 µ")
                .with_variable(VariableAttributes::new("v"), vec![9.0])
                .unwrap();
            let sources = vec![
                single_cell("good.nc", vec![0.0], vec![1.0]),
                MemorySource::new("bad.nc", bad),
            ];
            let result = SeriesAssembler::new(AssemblerOptions { parallel })
                .assemble(&sources, &PointRequest::new("v", 0.0, 0.0))
                .unwrap();
            assert_eq!(result.series.values(), vec![1.0]);
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].source_id, "bad.nc");
            assert_eq!(result.errors[0].kind, ErrorKind::InvalidTime);
        }
    }

    #[test]
    fn test_all_sources_failing_is_not_a_request_error() {
        let sources = vec![
            MemorySource::unreadable("a.nc", "truncated"),
            MemorySource::unreadable("b.nc", "truncated"),
        ];
        let result = SeriesAssembler::default()
            .assemble(&sources, &PointRequest::new("v", 0.0, 0.0))
            .unwrap();
        assert!(result.series.is_empty());
        assert!(result.all_failed());
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.summary.count, 0);
    }

    #[test]
    fn test_request_level_failures() {
        let assembler = SeriesAssembler::default();
        let empty: Vec<MemorySource> = Vec::new();
        assert!(matches!(
            assembler.assemble(&empty, &PointRequest::new("v", 0.0, 0.0)),
            Err(ExtractError::InvalidRequest(_))
        ));

        let sources = vec![single_cell("a.nc", vec![0.0], vec![1.0])];
        assert!(matches!(
            assembler.assemble(&sources, &PointRequest::new("v", f64::NAN, 0.0)),
            Err(ExtractError::InvalidRequest(_))
        ));
        assert!(matches!(
            assembler.assemble(&sources, &PointRequest::new(" ", 0.0, 0.0)),
            Err(ExtractError::InvalidRequest(_))
        ));
        let out_of_range = PointRequest::new("v", 0.0, 120.0).with_coordinate_system(CoordinateSystem::LatLon);
        assert!(assembler.assemble(&sources, &out_of_range).is_err());
    }

    #[test]
    fn test_progress_reported_per_source() {
        let sources = vec![
            single_cell("a.nc", vec![0.0], vec![1.0]),
            MemorySource::unreadable("b.nc", "broken"),
        ];
        let seen = Mutex::new(Vec::new());
        SeriesAssembler::new(AssemblerOptions { parallel: false })
            .assemble_with_progress(&sources, &PointRequest::new("v", 0.0, 0.0), |p| {
                seen.lock().unwrap().push((p.completed, p.total, p.source_id.to_string()));
            })
            .unwrap();
        let seen = seen.into_inner().unwrap();
        assert_eq!(
            seen,
            vec![(1, 2, "a.nc".to_string()), (2, 2, "b.nc".to_string())]
        );
    }
}
