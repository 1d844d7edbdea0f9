//! Loaders for exported line-scan files.
//!
//! This module provides parsers for:
//! - Gradient line scans (`Ux_GRAD_0.700`): comma-separated `value, secondary`
//!   or `position, value, secondary` rows with `$` comments and a footer
//! - XY profile exports: `(X axis)`/`(Y axis)` labels followed by data lines
//!   indented with a space
//!
//! and helpers to discover the sibling files of one selected gradient scan.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;

use crate::config::InputConfig;

use super::scan::{LineScan, ScanError, StationKey};

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("{path}:{line}: expected {expected} columns, found {found}")]
    ColumnCount {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Invalid file-name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("No station suffix in file name: {0}")]
    MissingStation(PathBuf),

    #[error("Invalid scan in {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: ScanError,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// XY profile with its axis labels.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    pub x_label: String,
    pub y_label: String,
    pub scan: LineScan,
}

/// Split a gradient file name into its base and station suffix.
///
/// `Ux_GRAD_0.700` splits into `("Ux_GRAD", "0.700")`.
fn split_station_suffix(path: &Path) -> Option<(&str, &str)> {
    let name = path.file_name()?.to_str()?;
    name.rsplit_once('_')
}

/// Station key taken from the trailing `_`-separated suffix of the file name.
pub fn station_from_path(path: &Path) -> Option<StationKey> {
    let (_, suffix) = split_station_suffix(path)?;
    StationKey::parse(suffix)
}

/// File-name base shared by every station of a gradient batch.
pub fn gradient_base(path: &Path) -> Option<String> {
    split_station_suffix(path).map(|(base, _)| base.to_string())
}

/// Find every station file belonging to the same batch as `selected`.
///
/// Matches `<base>_<digit>.<three digits>` in the directory of `selected`
/// and returns the paths sorted by name.
pub fn find_gradient_siblings(selected: &Path) -> Result<Vec<PathBuf>> {
    let base = gradient_base(selected)
        .ok_or_else(|| LoaderError::MissingStation(selected.to_path_buf()))?;

    let pattern = format!(r"^{}_\d\.\d{{3}}$", regex::escape(&base));
    let sibling_pattern = Regex::new(&pattern)?;

    let directory = match selected.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut files: Vec<PathBuf> = fs::read_dir(&directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| sibling_pattern.is_match(n))
                    .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

fn parse_field(record: &StringRecord, idx: usize, path: &Path, line: u64) -> Result<f64> {
    let field = record.get(idx).unwrap_or_default();
    field.parse::<f64>().map_err(|_| LoaderError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("column {}: '{}' is not a number", idx + 1, field),
    })
}

/// Cut every line at the first `comment` character.
///
/// Every source line stays a line, blank ones as a single space, so csv
/// record positions still match the source line numbers.
fn strip_comments<R: Read>(reader: R, comment: char) -> Result<String> {
    let mut text = String::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let data = line.split(comment).next().unwrap_or_default();
        text.push_str(if data.is_empty() { " " } else { data });
        text.push('\n');
    }
    Ok(text)
}

/// Parse a gradient line scan from any reader.
///
/// Everything after the comment character is ignored, on any line.
/// `path` is used for error messages and as the scan's source.
pub fn parse_gradient_scan<R: Read>(
    reader: R,
    station: StationKey,
    path: &Path,
    config: &InputConfig,
) -> Result<LineScan> {
    let text = strip_comments(reader, config.comment_char)?;
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records: Vec<StringRecord> = Vec::with_capacity(256);
    for result in csv_reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        records.push(record);
    }

    let keep = records.len().saturating_sub(config.footer_lines);
    records.truncate(keep);

    let first = records
        .first()
        .ok_or_else(|| LoaderError::EmptyFile(path.to_path_buf()))?;
    let columns = first.len();

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != columns || !(2..=3).contains(&record.len()) {
            return Err(LoaderError::ColumnCount {
                path: path.to_path_buf(),
                line,
                expected: if (2..=3).contains(&columns) { columns } else { 2 },
                found: record.len(),
            });
        }

        let row = if columns == 2 {
            let value = parse_field(record, 0, path, line)?;
            let secondary = parse_field(record, 1, path, line)?;
            (secondary, value, Some(secondary))
        } else {
            let position = parse_field(record, 0, path, line)?;
            let value = parse_field(record, 1, path, line)?;
            let secondary = parse_field(record, 2, path, line)?;
            (position, value, Some(secondary))
        };
        rows.push(row);
    }

    LineScan::new(station, rows)
        .map(|scan| scan.with_source(path))
        .map_err(|source| LoaderError::Scan {
            path: path.to_path_buf(),
            source,
        })
}

/// Load one gradient line scan; the station comes from the file name.
pub fn load_gradient_scan(path: &Path, config: &InputConfig) -> Result<LineScan> {
    let station =
        station_from_path(path).ok_or_else(|| LoaderError::MissingStation(path.to_path_buf()))?;
    let file = File::open(path)?;
    parse_gradient_scan(BufReader::new(file), station, path, config)
}

/// Load many gradient scans in parallel.
///
/// Each file succeeds or fails on its own. The output keeps input order.
pub fn load_gradient_scans(
    paths: &[PathBuf],
    config: &InputConfig,
) -> Vec<(PathBuf, Result<LineScan>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), load_gradient_scan(path, config)))
        .collect()
}

/// Parse an XY profile export from any buffered reader.
pub fn parse_profile<R: BufRead>(reader: R, station: StationKey, path: &Path) -> Result<ProfileTable> {
    let mut x_label = String::new();
    let mut y_label = String::new();
    let mut positions = Vec::with_capacity(512);
    let mut values = Vec::with_capacity(512);

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_idx as u64 + 1;

        if let Some((_, label)) = line.split_once("(X axis) ") {
            x_label = label.trim_end().to_string();
        }
        if let Some((_, label)) = line.split_once("(Y axis) ") {
            y_label = label.trim_end().to_string();
        }
        if !line.starts_with(' ') || line.trim().is_empty() {
            continue;
        }

        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        let fields: Vec<&str> = compact.split(',').collect();
        if fields.len() < 2 {
            return Err(LoaderError::ColumnCount {
                path: path.to_path_buf(),
                line: line_no,
                expected: 2,
                found: fields.len(),
            });
        }

        let parse = |text: &str| {
            text.parse::<f64>().map_err(|_| LoaderError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("'{}' is not a number", text),
            })
        };
        positions.push(parse(fields[0])?);
        values.push(parse(fields[1])?);
    }

    if positions.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    let scan = LineScan::from_columns(station, &positions, &values, None)
        .map(|scan| scan.with_source(path))
        .map_err(|source| LoaderError::Scan {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(ProfileTable {
        x_label,
        y_label,
        scan,
    })
}

/// Load an XY profile export.
pub fn load_profile(path: &Path, station: StationKey) -> Result<ProfileTable> {
    let file = File::open(path)?;
    parse_profile(BufReader::new(file), station, path)
}
