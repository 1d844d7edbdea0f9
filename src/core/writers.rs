//! CSV writers for analysis results.
//!
//! This module provides functions for writing:
//! - Aggregate slope series as `station,slope` rows
//! - Per-variant profile crossings as `variant,position,slope,intercept` rows

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::scan::StationKey;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to flush data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// One crossing found on a variant's profile, ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCrossingRow {
    pub variant: String,
    pub position: f64,
    pub slope: f64,
    pub intercept: f64,
}

/// Result file name for one region of a gradient batch.
///
/// `series_file_name(dir, "Ux_GRAD", "WINDOW")` gives
/// `dir/Ux_GRAD_results_WINDOW.csv`.
pub fn series_file_name(dir: &Path, base: &str, label: &str) -> PathBuf {
    dir.join(format!("{}_results_{}.csv", base, label))
}

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a CSV writer over a buffered file at `path`.
fn create_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    ensure_parent_dirs(path)?;
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(csv::Writer::from_writer(BufWriter::new(file)))
}

/// Write an aggregate series to CSV.
///
/// Creates a CSV file with header `station,slope`. Stations are written
/// with the label they were parsed from, in the order given.
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
pub fn write_series_csv(path: &Path, points: &[(StationKey, f64)]) -> Result<()> {
    let mut csv_writer = create_csv_writer(path)?;
    let path_str = path.display().to_string();

    csv_writer
        .write_record(["station", "slope"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for (station, slope) in points {
        csv_writer
            .write_record(&[station.label().to_string(), format!("{:.6}", slope)])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write profile crossings to CSV with header `variant,position,slope,intercept`.
pub fn write_profile_crossings_csv(path: &Path, rows: &[ProfileCrossingRow]) -> Result<()> {
    let mut csv_writer = create_csv_writer(path)?;
    let path_str = path.display().to_string();

    csv_writer
        .write_record(["variant", "position", "slope", "intercept"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for row in rows {
        csv_writer
            .write_record(&[
                row.variant.clone(),
                format!("{:.6}", row.position),
                format!("{:.6}", row.slope),
                format!("{:.6}", row.intercept),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_series_csv() {
        let dir = tempdir().unwrap();
        let path = series_file_name(dir.path(), "Ux_GRAD", "WINDOW");
        let points = vec![
            (StationKey::parse("0.700").unwrap(), 4.0),
            (StationKey::parse("0.750").unwrap(), 6.0),
        ];

        write_series_csv(&path, &points).unwrap();

        assert!(path.ends_with("Ux_GRAD_results_WINDOW.csv"));
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["station,slope", "0.700,4.000000", "0.750,6.000000"]);
    }

    #[test]
    fn test_write_empty_series_has_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_series_csv(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_write_profile_crossings_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("crossings.csv");
        let rows = vec![ProfileCrossingRow {
            variant: "V1".to_string(),
            position: 2.0,
            slope: 1.5,
            intercept: -2.5,
        }];

        write_profile_crossings_csv(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "variant,position,slope,intercept");
        assert_eq!(lines[1], "V1,2.000000,1.500000,-2.500000");
    }
}
