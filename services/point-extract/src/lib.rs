//! Point time-series extraction service.
//!
//! Wires the NetCDF sources, the series assembler and CSV export behind a
//! small command line interface. The binary in `main.rs` only parses
//! arguments, sets up logging and maps outcomes to exit codes.

pub mod cli;
pub mod config;
pub mod run;
