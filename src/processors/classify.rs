//! Region classification of crossings against two boundary lines.
//!
//! The high and low boundaries split elevation space into three bands:
//! the window band at or above the high line, the door band at or below the
//! low line, and the frame band strictly between them. Only the window and
//! door bands carry slopes into the aggregates.

use std::fmt;

use crate::config::BoundaryConfig;

use super::boundary::{BoundaryError, BoundaryLine};

/// Band a crossing falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionTag {
    /// At or above the high boundary (window).
    RegionA,
    /// At or below the low boundary (door).
    RegionB,
    /// Strictly between the boundaries (frame); never aggregated.
    Neutral,
    /// Fell through every band, e.g. a NaN elevation.
    Unclassified,
}

impl RegionTag {
    /// True for the regions that feed an aggregate series.
    #[inline]
    pub fn is_aggregated(self) -> bool {
        matches!(self, RegionTag::RegionA | RegionTag::RegionB)
    }
}

impl fmt::Display for RegionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RegionTag::RegionA => "region-a",
            RegionTag::RegionB => "region-b",
            RegionTag::Neutral => "neutral",
            RegionTag::Unclassified => "unclassified",
        };
        // Pad so log columns stay aligned.
        f.pad(text)
    }
}

/// The pair of boundaries shared by every classification in a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBoundaries {
    high: BoundaryLine,
    low: BoundaryLine,
}

impl RegionBoundaries {
    pub fn new(high: BoundaryLine, low: BoundaryLine) -> Self {
        Self { high, low }
    }

    /// Build both boundaries from configuration.
    pub fn from_config(config: &BoundaryConfig) -> Result<Self, BoundaryError> {
        Ok(Self {
            high: BoundaryLine::from_control_points(&config.high)?,
            low: BoundaryLine::from_control_points(&config.low)?,
        })
    }

    #[inline]
    pub fn high(&self) -> &BoundaryLine {
        &self.high
    }

    #[inline]
    pub fn low(&self) -> &BoundaryLine {
        &self.low
    }

    /// True when the low boundary lies above the high one at `x`.
    pub fn crossed_at(&self, x: f64) -> bool {
        self.low.evaluate(x) > self.high.evaluate(x)
    }

    /// Classify an elevation `secondary` at boundary coordinate `x`.
    pub fn classify(&self, x: f64, secondary: f64) -> RegionTag {
        let high = self.high.evaluate(x);
        let low = self.low.evaluate(x);

        if low < secondary && secondary < high {
            RegionTag::Neutral
        } else if secondary >= high {
            RegionTag::RegionA
        } else if secondary <= low {
            RegionTag::RegionB
        } else {
            RegionTag::Unclassified
        }
    }
}
