//! Configuration types for the gradient analysis.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Two control points defining a boundary line in (station, elevation) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoints {
    /// First `(x, y)` point
    pub start: [f64; 2],
    /// Second `(x, y)` point
    pub end: [f64; 2],
}

impl ControlPoints {
    pub fn new(start: [f64; 2], end: [f64; 2]) -> Self {
        Self { start, end }
    }
}

/// Boundary curves separating the window, frame and door bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Upper boundary; crossings at or above it belong to the window band
    #[serde(default = "default_high_boundary")]
    pub high: ControlPoints,

    /// Lower boundary; crossings at or below it belong to the door band
    #[serde(default = "default_low_boundary")]
    pub low: ControlPoints,
}

fn default_high_boundary() -> ControlPoints {
    ControlPoints::new([0.655, 0.688], [0.8, 0.696])
}

fn default_low_boundary() -> ControlPoints {
    ControlPoints::new([0.655, 0.67], [0.8, 0.678])
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            high: default_high_boundary(),
            low: default_low_boundary(),
        }
    }
}

/// Configuration for the local slope fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Samples taken on each side of the resolved crossing index
    #[serde(default = "default_half_width")]
    pub half_width: usize,
}

fn default_half_width() -> usize {
    1
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            half_width: default_half_width(),
        }
    }
}

/// Configuration for reading input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Lines starting with this character are ignored in gradient files
    #[serde(default = "default_comment_char")]
    pub comment_char: char,

    /// Trailing non-comment lines dropped from gradient files
    #[serde(default = "default_footer_lines")]
    pub footer_lines: usize,

    /// Sub-directory of a variant holding exported plot data
    #[serde(default = "default_pictures_dir")]
    pub pictures_dir: String,
}

fn default_comment_char() -> char {
    '$'
}

fn default_footer_lines() -> usize {
    1
}

fn default_pictures_dir() -> String {
    "PICTURES".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            comment_char: default_comment_char(),
            footer_lines: default_footer_lines(),
            pictures_dir: default_pictures_dir(),
        }
    }
}

/// Configuration for result files and charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Label used for the region above the high boundary
    #[serde(default = "default_region_a_label")]
    pub region_a_label: String,

    /// Label used for the region below the low boundary
    #[serde(default = "default_region_b_label")]
    pub region_b_label: String,

    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
}

fn default_region_a_label() -> String {
    "WINDOW".to_string()
}

fn default_region_b_label() -> String {
    "DOOR".to_string()
}

fn default_chart_width() -> u32 {
    1280
}

fn default_chart_height() -> u32 {
    720
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            region_a_label: default_region_a_label(),
            region_b_label: default_region_b_label(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

/// XY profile sections analysed for every variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesConfig {
    /// File names looked up in each variant's pictures directory
    #[serde(default)]
    pub sections: Vec<String>,
}

/// Main configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub boundaries: BoundaryConfig,

    #[serde(default)]
    pub fit: FitConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub profiles: ProfilesConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_boundary_config() {
        let config = BoundaryConfig::default();
        assert_eq!(config.high.start, [0.655, 0.688]);
        assert_eq!(config.low.end, [0.8, 0.678]);
    }

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.fit.half_width, 1);
        assert_eq!(config.input.comment_char, '$');
        assert_eq!(config.input.footer_lines, 1);
        assert_eq!(config.output.region_a_label, "WINDOW");
        assert!(config.profiles.sections.is_empty());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "fit:\n  half_width: 2\nprofiles:\n  sections: [UX_PROFILE]\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.fit.half_width, 2);
        assert_eq!(config.profiles.sections, vec!["UX_PROFILE".to_string()]);
        assert_eq!(config.boundaries.high, default_high_boundary());
        assert_eq!(config.input.pictures_dir, "PICTURES");
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = PipelineConfig::default();
        config.boundaries.low = ControlPoints::new([0.0, 1.0], [2.0, 3.0]);
        config.to_yaml(&path).unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded.boundaries.low, ControlPoints::new([0.0, 1.0], [2.0, 3.0]));
        assert_eq!(loaded.output.region_b_label, "DOOR");
    }
}
