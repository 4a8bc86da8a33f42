//! point-extract command line tool.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use point_extract::cli::{Args, Command, LogFormat};
use point_extract::config::{load_config, ExtractConfig};
use point_extract::run::{render_report, run_extract, run_variables, ExtractSettings};

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);
    netcdf_parser::silence_hdf5_errors();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Request failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => {
            let config = load_config(path)?;
            info!(path = %path.display(), "Loaded configuration");
            config
        }
        None => ExtractConfig::default(),
    };

    match args.command {
        Command::Variables(variables) => {
            for name in run_variables(&variables)? {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Extract(extract) => {
            let settings = ExtractSettings::resolve(&extract, &config);
            let outcome = run_extract(&settings)?;
            print!("{}", render_report(&settings, &outcome));

            if outcome.rows() == 0 {
                warn!(
                    failed = outcome.assembled.errors.len(),
                    "No rows extracted from any source"
                );
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
