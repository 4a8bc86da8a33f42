//! Optional YAML defaults for the extract command.
//!
//! ```yaml
//! coordinate_system: irish_grid
//! parallel: true
//! output_dir: ${HOME}/rainfall/exports
//! recursive: false
//! ```
//!
//! Values support `${VAR}` and `${VAR:-default}` environment substitution.
//! Command line flags override everything here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use series_common::CoordinateSystem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// System the target coordinates are given in
    pub coordinate_system: CoordinateSystem,
    /// Process sources concurrently
    pub parallel: bool,
    /// Directory for CSV output when `--output` is not given
    pub output_dir: Option<PathBuf>,
    /// Search source directories recursively
    pub recursive: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            coordinate_system: CoordinateSystem::default(),
            parallel: true,
            output_dir: None,
            recursive: false,
        }
    }
}

/// Load and parse a config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExtractConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
    parse_config(&content).with_context(|| format!("Invalid config in {:?}", path.as_ref()))
}

/// Parse config YAML after environment substitution. Empty input yields the
/// defaults.
pub fn parse_config(content: &str) -> Result<ExtractConfig> {
    let expanded = expand_env_vars(content)?;
    if expanded.trim().is_empty() {
        return Ok(ExtractConfig::default());
    }
    serde_yaml::from_str(&expanded).context("Failed to parse config YAML")
}

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut expr = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => expr.push(c),
                None => anyhow::bail!("Unclosed variable substitution: ${{{}", expr),
            }
        }
        result.push_str(&resolve_var_expr(&expr)?);
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    match expr.split_once(":-") {
        Some((name, default)) => match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        },
        None => std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_file() {
        assert_eq!(parse_config("").unwrap(), ExtractConfig::default());
        assert_eq!(parse_config("# nothing\n").unwrap(), ExtractConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config("coordinate_system: lat_lon\nrecursive: true\n").unwrap();
        assert_eq!(config.coordinate_system, CoordinateSystem::LatLon);
        assert!(config.recursive);
        assert!(config.parallel);
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(parse_config("paralel: false\n").is_err());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("POINT_EXTRACT_TEST_OUT", "/data/exports");
        let config = parse_config("output_dir: ${POINT_EXTRACT_TEST_OUT}\n").unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/data/exports")));
    }

    #[test]
    fn test_env_default_used_when_unset() {
        let expanded = expand_env_vars("dir: ${POINT_EXTRACT_SURELY_UNSET:-/tmp/out}").unwrap();
        assert_eq!(expanded, "dir: /tmp/out");
    }

    #[test]
    fn test_env_errors() {
        assert!(expand_env_vars("dir: ${POINT_EXTRACT_SURELY_UNSET}").is_err());
        assert!(expand_env_vars("dir: ${UNCLOSED").is_err());
        assert_eq!(expand_env_vars("cost: $5").unwrap(), "cost: $5");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extract.yaml");
        fs::write(&path, "parallel: false\ncoordinate_system: british_national_grid\n").unwrap();
        let config = load_config(&path).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.coordinate_system, CoordinateSystem::BritishNationalGrid);
        assert!(load_config(dir.path().join("missing.yaml")).is_err());
    }
}
