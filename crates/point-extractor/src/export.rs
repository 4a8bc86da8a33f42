//! Flat CSV export of an assembled series.

use std::io::Write;
use std::path::Path;

use series_common::ExtractResult;

use crate::series::TimeSeries;

/// File name offered for download: `<variable>_time_series.csv`.
pub fn default_file_name(variable: &str) -> String {
    format!("{}_time_series.csv", variable)
}

/// Write `date,<variable>` rows to `writer`, one per sample, in series order.
pub fn write_csv<W: Write>(series: &TimeSeries, variable: &str, writer: W) -> ExtractResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["date", variable]).map_err(std::io::Error::from)?;

    for sample in series {
        csv_writer
            .write_record([sample.timestamp.to_string(), format!("{:?}", sample.value)])
            .map_err(std::io::Error::from)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render the CSV table into a string.
pub fn to_csv_string(series: &TimeSeries, variable: &str) -> ExtractResult<String> {
    let mut buffer = Vec::new();
    write_csv(series, variable, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the CSV table to a file, creating parent directories as needed.
pub fn write_csv_file(series: &TimeSeries, variable: &str, path: &Path) -> ExtractResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(series, variable, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Calendar, CfDateTime};
    use crate::series::DecodedSample;

    fn series() -> TimeSeries {
        vec![
            DecodedSample::new(CfDateTime::from_ymd(Calendar::Gregorian, 2021, 1, 1).unwrap(), 1.0),
            DecodedSample::new(CfDateTime::from_ymd(Calendar::Day360, 2021, 2, 30).unwrap(), 0.25),
        ]
        .into()
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv_string(&series(), "rainfall_amount").unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,rainfall_amount");
        assert_eq!(lines[1], "2021-01-01 00:00:00,1.0");
        assert_eq!(lines[2], "2021-02-30 00:00:00,0.25");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_series_writes_header_only() {
        let csv = to_csv_string(&TimeSeries::new(), "tas").unwrap();
        assert_eq!(csv.trim_end(), "date,tas");
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name("rainfall_amount"), "rainfall_amount_time_series.csv");
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(default_file_name("tas"));
        write_csv_file(&series(), "tas", &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("date,tas\n"));
    }
}
