//! Command execution, independent of argument parsing and logging setup.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use netcdf_parser::{data_variables, expand_sources, list_variables, NetCdfSource};
use point_extractor::{
    default_file_name, write_csv_file, AssembledSeries, AssemblerOptions, ExtractionError,
    PointRequest, SeriesAssembler, SourceReport, SummaryStatistics,
};

use crate::cli::{ExtractArgs, VariablesArgs};
use crate::config::ExtractConfig;

/// Fully resolved extract settings: flags layered over config defaults.
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub sources: Vec<PathBuf>,
    pub request: PointRequest,
    pub output: PathBuf,
    pub summary_json: Option<PathBuf>,
    pub parallel: bool,
    pub recursive: bool,
}

impl ExtractSettings {
    pub fn resolve(args: &ExtractArgs, config: &ExtractConfig) -> Self {
        let coordinate_system = args.crs.unwrap_or(config.coordinate_system);
        let (default_x, default_y) = coordinate_system.default_target();
        let request = PointRequest::new(
            args.variable.clone(),
            args.x.unwrap_or(default_x),
            args.y.unwrap_or(default_y),
        )
        .with_coordinate_system(coordinate_system);

        let output = args.output.clone().unwrap_or_else(|| {
            let name = default_file_name(&args.variable);
            match &config.output_dir {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            }
        });

        Self {
            sources: args.sources.clone(),
            request,
            output,
            summary_json: args.summary_json.clone(),
            parallel: config.parallel && !args.sequential,
            recursive: config.recursive || args.recursive,
        }
    }
}

/// What an extract run produced.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub assembled: AssembledSeries,
    /// Written on every run; header-only when no rows survived
    pub csv_path: PathBuf,
}

impl ExtractOutcome {
    pub fn rows(&self) -> usize {
        self.assembled.series.len()
    }
}

/// JSON report written next to the CSV on request.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    request: &'a PointRequest,
    rows: usize,
    summary: &'a SummaryStatistics,
    sources: &'a [SourceReport],
    errors: &'a [ExtractionError],
}

/// Run the extract command. Only request-level problems are errors; files
/// that fail are listed in the outcome.
pub fn run_extract(settings: &ExtractSettings) -> Result<ExtractOutcome> {
    let sources: Vec<NetCdfSource> = expand_sources(&settings.sources, settings.recursive)
        .context("Failed to expand source paths")?;
    info!(
        inputs = settings.sources.len(),
        files = sources.len(),
        variable = %settings.request.variable,
        "Expanded sources"
    );

    let assembler = SeriesAssembler::new(AssemblerOptions {
        parallel: settings.parallel,
    });
    let assembled = assembler
        .assemble_with_progress(&sources, &settings.request, |progress| {
            info!(
                completed = progress.completed,
                total = progress.total,
                source = %progress.source_id,
                "Processed source"
            );
        })
        .context("Extraction request rejected")?;

    write_csv_file(&assembled.series, &settings.request.variable, &settings.output)
        .with_context(|| format!("Failed to write CSV to {:?}", settings.output))?;
    info!(path = %settings.output.display(), rows = assembled.series.len(), "Wrote CSV");
    let csv_path = settings.output.clone();

    if let Some(path) = &settings.summary_json {
        write_json_report(path, &settings.request, &assembled)?;
    }

    Ok(ExtractOutcome { assembled, csv_path })
}

fn write_json_report(path: &Path, request: &PointRequest, assembled: &AssembledSeries) -> Result<()> {
    let report = JsonReport {
        request,
        rows: assembled.series.len(),
        summary: &assembled.summary,
        sources: &assembled.sources,
        errors: &assembled.errors,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize summary")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write summary to {:?}", path))?;
    Ok(())
}

/// Human-readable report for stdout.
pub fn render_report(settings: &ExtractSettings, outcome: &ExtractOutcome) -> String {
    let mut out = String::new();
    let request = &settings.request;
    let (x_label, y_label) = request.coordinate_system.axis_labels();
    let assembled = &outcome.assembled;

    let _ = writeln!(
        out,
        "{} at {} {}, {} {} ({})",
        request.variable, x_label, request.target_x, y_label, request.target_y, request.coordinate_system
    );
    for source in &assembled.sources {
        let _ = writeln!(
            out,
            "{}: nearest x={}, y={}, {} samples",
            source.source_id, source.nearest.x.value, source.nearest.y.value, source.samples
        );
    }
    for error in &assembled.errors {
        let _ = writeln!(out, "{}", error);
    }

    if outcome.rows() == 0 {
        let _ = writeln!(
            out,
            "No data extracted. Wrote header only to {}",
            outcome.csv_path.display()
        );
    } else {
        let _ = writeln!(out, "\nSummary statistics:\n{}", assembled.summary);
        let _ = writeln!(out, "\nWrote {} rows to {}", outcome.rows(), outcome.csv_path.display());
    }
    out
}

/// Run the variables command.
pub fn run_variables(args: &VariablesArgs) -> Result<Vec<String>> {
    let source = NetCdfSource::from_path(args.source.clone());
    let names = if args.all {
        list_variables(&source)
    } else {
        data_variables(&source)
    };
    names.with_context(|| format!("Failed to read variables from {:?}", args.source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use series_common::CoordinateSystem;

    fn args(variable: &str) -> ExtractArgs {
        ExtractArgs {
            sources: vec![PathBuf::from("rain.nc")],
            variable: variable.to_string(),
            x: None,
            y: None,
            crs: None,
            output: None,
            summary_json: None,
            sequential: false,
            recursive: false,
        }
    }

    #[test]
    fn test_resolve_uses_coordinate_system_defaults() {
        let settings = ExtractSettings::resolve(&args("rainfall_amount"), &ExtractConfig::default());
        assert_eq!(settings.request.target_x, 341914.1);
        assert_eq!(settings.request.target_y, 392651.1);
        assert_eq!(settings.output, PathBuf::from("rainfall_amount_time_series.csv"));
        assert!(settings.parallel);

        let mut latlon = args("tas");
        latlon.crs = Some(CoordinateSystem::LatLon);
        let settings = ExtractSettings::resolve(&latlon, &ExtractConfig::default());
        assert_eq!((settings.request.target_x, settings.request.target_y), (-5.9, 54.5));
    }

    #[test]
    fn test_flags_override_config() {
        let config = ExtractConfig {
            coordinate_system: CoordinateSystem::BritishNationalGrid,
            parallel: true,
            output_dir: Some(PathBuf::from("/exports")),
            recursive: true,
        };
        let mut a = args("rainfall_amount");
        a.sequential = true;
        a.x = Some(100.0);
        let settings = ExtractSettings::resolve(&a, &config);
        assert!(!settings.parallel);
        assert!(settings.recursive);
        assert_eq!(settings.request.coordinate_system, CoordinateSystem::BritishNationalGrid);
        assert_eq!(settings.request.target_x, 100.0);
        assert_eq!(settings.output, PathBuf::from("/exports/rainfall_amount_time_series.csv"));

        a.output = Some(PathBuf::from("out.csv"));
        assert_eq!(ExtractSettings::resolve(&a, &config).output, PathBuf::from("out.csv"));
    }
}
