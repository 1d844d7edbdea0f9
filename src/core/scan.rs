//! Line-scan data model.
//!
//! A [`LineScan`] is an ordered run of [`Sample`]s read from one exported
//! file, tagged with the [`StationKey`] of the cut it was sampled on.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Minimum number of samples needed for crossing detection.
pub const MIN_SAMPLES: usize = 3;

/// Errors raised while building a line scan.
#[derive(Debug, Error, PartialEq)]
pub enum ScanError {
    #[error("scan '{station}' has {len} samples, at least 3 are required")]
    TooFewSamples { station: String, len: usize },

    #[error("column length mismatch: {positions} positions, {values} values")]
    LengthMismatch { positions: usize, values: usize },
}

/// Result type for scan construction.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Identifies the cut a scan was taken on.
///
/// Keys compare by their numeric coordinate only; the label keeps the text
/// the key was parsed from so output can echo it back unchanged.
#[derive(Debug, Clone)]
pub struct StationKey {
    value: f64,
    label: String,
}

impl StationKey {
    /// Create a key from a coordinate, labelled with three decimals.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            label: format!("{:.3}", value),
        }
    }

    /// Create a key with an explicit label.
    pub fn labelled(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }

    /// Parse a key from its textual form, e.g. `"0.700"`.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let value: f64 = trimmed.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self::labelled(value, trimmed))
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for StationKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StationKey {}

impl PartialOrd for StationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// One sample of a line scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Rank within the scan, starting at 0.
    pub index: usize,
    /// Independent coordinate along the scan.
    pub position: f64,
    /// Scalar field value.
    pub value: f64,
    /// Spatial coordinate used for region classification.
    pub secondary: Option<f64>,
}

/// Ordered, immutable sequence of samples from one file.
#[derive(Debug, Clone)]
pub struct LineScan {
    station: StationKey,
    samples: Vec<Sample>,
    source: Option<PathBuf>,
}

impl LineScan {
    /// Build a scan from `(position, value, secondary)` rows, assigning
    /// contiguous indices in row order.
    pub fn new<I>(station: StationKey, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64, Option<f64>)>,
    {
        let samples: Vec<Sample> = rows
            .into_iter()
            .enumerate()
            .map(|(index, (position, value, secondary))| Sample {
                index,
                position,
                value,
                secondary,
            })
            .collect();

        if samples.len() < MIN_SAMPLES {
            return Err(ScanError::TooFewSamples {
                station: station.to_string(),
                len: samples.len(),
            });
        }

        Ok(Self {
            station,
            samples,
            source: None,
        })
    }

    /// Build a scan from parallel position/value columns.
    pub fn from_columns(
        station: StationKey,
        positions: &[f64],
        values: &[f64],
        secondary: Option<&[f64]>,
    ) -> Result<Self> {
        if positions.len() != values.len() {
            return Err(ScanError::LengthMismatch {
                positions: positions.len(),
                values: values.len(),
            });
        }
        if let Some(sec) = secondary {
            if sec.len() != values.len() {
                return Err(ScanError::LengthMismatch {
                    positions: sec.len(),
                    values: values.len(),
                });
            }
        }

        let rows = positions
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (&p, &v))| (p, v, secondary.map(|s| s[i])));

        Self::new(station, rows)
    }

    /// Attach the file the scan was read from.
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    #[inline]
    pub fn station(&self) -> &StationKey {
        &self.station
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed scan; present for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Field values in scan order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Positions in scan order.
    pub fn positions(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.position).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_key_parse_keeps_label() {
        let key = StationKey::parse("0.700").unwrap();
        assert_eq!(key.label(), "0.700");
        assert!((key.value() - 0.7).abs() < 1e-12);
        assert_eq!(key.to_string(), "0.700");
    }

    #[test]
    fn test_station_key_rejects_garbage() {
        assert!(StationKey::parse("abc").is_none());
        assert!(StationKey::parse("NaN").is_none());
        assert!(StationKey::parse("").is_none());
    }

    #[test]
    fn test_station_key_orders_numerically() {
        let mut keys = vec![
            StationKey::parse("0.750").unwrap(),
            StationKey::parse("0.655").unwrap(),
            StationKey::parse("0.700").unwrap(),
        ];
        keys.sort();
        let labels: Vec<&str> = keys.iter().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["0.655", "0.700", "0.750"]);

        assert_eq!(StationKey::parse("0.70").unwrap(), StationKey::new(0.7));
    }

    #[test]
    fn test_line_scan_assigns_indices() {
        let scan = LineScan::from_columns(
            StationKey::new(0.7),
            &[0.0, 1.0, 2.0, 3.0],
            &[-1.0, 1.0, 2.0, 3.0],
            None,
        )
        .unwrap();

        assert_eq!(scan.len(), 4);
        for (i, sample) in scan.samples().iter().enumerate() {
            assert_eq!(sample.index, i);
            assert_eq!(sample.secondary, None);
        }
        assert_eq!(scan.values(), vec![-1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_line_scan_too_few_samples() {
        let err = LineScan::from_columns(StationKey::new(0.7), &[0.0, 1.0], &[1.0, -1.0], None)
            .unwrap_err();
        assert_eq!(
            err,
            ScanError::TooFewSamples {
                station: "0.700".to_string(),
                len: 2
            }
        );
    }

    #[test]
    fn test_line_scan_length_mismatch() {
        let err = LineScan::from_columns(
            StationKey::new(0.7),
            &[0.0, 1.0, 2.0],
            &[1.0, -1.0, 2.0],
            Some(&[0.5, 0.6]),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::LengthMismatch { .. }));
    }
}
