//! Command line arguments.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use series_common::CoordinateSystem;

/// Extract a point time series from gridded NetCDF files
#[derive(Parser, Debug)]
#[command(name = "point-extract")]
#[command(about = "Extract point time series from gridded NetCDF rainfall/climate data")]
pub struct Args {
    /// YAML file with default settings
    #[arg(short, long, env = "POINT_EXTRACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "POINT_EXTRACT_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the variables of a NetCDF file
    Variables(VariablesArgs),
    /// Extract one variable at one point from one or more files
    Extract(ExtractArgs),
}

#[derive(ClapArgs, Debug)]
pub struct VariablesArgs {
    /// NetCDF file
    pub source: PathBuf,

    /// Include coordinate and auxiliary variables
    #[arg(long)]
    pub all: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExtractArgs {
    /// NetCDF files or directories containing them
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Variable to extract
    #[arg(short, long)]
    pub variable: String,

    /// Target x (Easting or longitude); defaults per coordinate system
    #[arg(long, allow_hyphen_values = true)]
    pub x: Option<f64>,

    /// Target y (Northing or latitude); defaults per coordinate system
    #[arg(long, allow_hyphen_values = true)]
    pub y: Option<f64>,

    /// Coordinate system of the target (irish-grid, bng, latlon, EPSG codes)
    #[arg(long)]
    pub crs: Option<CoordinateSystem>,

    /// CSV output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write summary statistics and per-file errors as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Process files one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Search directories recursively
    #[arg(long)]
    pub recursive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let args = Args::try_parse_from([
            "point-extract",
            "extract",
            "jan.nc",
            "feb.nc",
            "--variable",
            "rainfall_amount",
            "--x",
            "-5.9",
            "--y",
            "54.5",
            "--crs",
            "EPSG:4326",
            "--sequential",
        ])
        .unwrap();

        let Command::Extract(extract) = args.command else {
            panic!("expected extract subcommand");
        };
        assert_eq!(extract.sources, vec![PathBuf::from("jan.nc"), PathBuf::from("feb.nc")]);
        assert_eq!(extract.variable, "rainfall_amount");
        assert_eq!(extract.x, Some(-5.9));
        assert_eq!(extract.crs, Some(CoordinateSystem::LatLon));
        assert!(extract.sequential);
        assert!(!extract.recursive);
    }

    #[test]
    fn test_extract_requires_a_source() {
        assert!(Args::try_parse_from(["point-extract", "extract", "--variable", "v"]).is_err());
    }

    #[test]
    fn test_parse_variables() {
        let args = Args::try_parse_from(["point-extract", "variables", "rain.nc"]).unwrap();
        assert!(matches!(args.command, Command::Variables(VariablesArgs { all: false, .. })));
    }
}
