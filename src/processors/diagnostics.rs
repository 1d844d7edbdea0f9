//! Diagnostics reported by the analysis pass.
//!
//! The pass never logs directly. It hands [`Diagnostic`] events to a
//! [`DiagnosticsSink`] supplied by the caller, so the CLI can route them to
//! `log` and tests can inspect them.

use std::fmt;
use std::path::PathBuf;

use log::Level;

use super::classify::RegionTag;
use super::crossing::DiscardReason;
use super::slope::SlopeEstimate;

/// One event of an analysis pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    ScanLoaded {
        station: String,
        samples: usize,
    },
    ScanSkipped {
        source: Option<PathBuf>,
        reason: String,
    },
    CrossingFound {
        station: String,
        region: RegionTag,
        estimate: SlopeEstimate,
    },
    ProfileCrossing {
        variant: String,
        estimate: SlopeEstimate,
    },
    CrossingDiscarded {
        station: String,
        flagged_index: usize,
        reason: DiscardReason,
    },
    UnclassifiedCrossing {
        station: String,
        flagged_index: usize,
        secondary: Option<f64>,
        high: f64,
        low: f64,
    },
    BoundariesCrossed {
        station: String,
        high: f64,
        low: f64,
    },
}

impl Diagnostic {
    /// Log level the event maps to.
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::ScanLoaded { .. }
            | Diagnostic::CrossingFound { .. }
            | Diagnostic::ProfileCrossing { .. } => Level::Info,
            Diagnostic::CrossingDiscarded { .. } => Level::Debug,
            Diagnostic::ScanSkipped { .. }
            | Diagnostic::UnclassifiedCrossing { .. }
            | Diagnostic::BoundariesCrossed { .. } => Level::Warn,
        }
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        self.level() <= Level::Warn
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ScanLoaded { station, samples } => {
                write!(f, "station {}: {} samples", station, samples)
            }
            Diagnostic::ScanSkipped { source, reason } => match source {
                Some(path) => write!(f, "skipping {}: {}", path.display(), reason),
                None => write!(f, "skipping scan: {}", reason),
            },
            Diagnostic::CrossingFound {
                station,
                region,
                estimate,
            } => {
                let [prev, cur, next] = estimate.neighbor_values;
                write!(
                    f,
                    "{} {:<12} Intersection: [{:>12} > {:>12} < {:>12}]",
                    station, region, prev, cur, next
                )?;
                if region.is_aggregated() {
                    write!(
                        f,
                        " ... slope m: {:.0}, b: {:.0}",
                        estimate.fit.slope, estimate.fit.intercept
                    )?;
                }
                Ok(())
            }
            Diagnostic::ProfileCrossing { variant, estimate } => write!(
                f,
                "{} Intersection at {}: slope m: {:.3}, b: {:.3}",
                variant, estimate.neighbor_positions[1], estimate.fit.slope, estimate.fit.intercept
            ),
            Diagnostic::CrossingDiscarded {
                station,
                flagged_index,
                reason,
            } => write!(
                f,
                "{} crossing at index {} discarded: {}",
                station, flagged_index, reason
            ),
            Diagnostic::UnclassifiedCrossing {
                station,
                flagged_index,
                secondary,
                high,
                low,
            } => write!(
                f,
                "{} crossing at index {} is unclassified (secondary {:?}, high {}, low {})",
                station, flagged_index, secondary, high, low
            ),
            Diagnostic::BoundariesCrossed { station, high, low } => write!(
                f,
                "{} boundary lines cross: high {} is below low {}",
                station, high, low
            ),
        }
    }
}

/// Receiver for analysis diagnostics.
pub trait DiagnosticsSink {
    fn report(&mut self, event: Diagnostic);
}

/// Forwards every event to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn report(&mut self, event: Diagnostic) {
        log::log!(event.level(), "{}", event);
    }
}

/// Collects events in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Vec<Diagnostic>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter().filter(|e| e.is_warning())
    }
}

impl DiagnosticsSink for MemorySink {
    fn report(&mut self, event: Diagnostic) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::slope::LineFit;

    fn estimate() -> SlopeEstimate {
        SlopeEstimate {
            flagged_index: 2,
            resolved_index: 2,
            neighbor_values: [-1.0, 0.5, 2.0],
            neighbor_positions: [1.0, 2.0, 3.0],
            fit: LineFit {
                slope: 1.6,
                intercept: -2.4,
            },
        }
    }

    #[test]
    fn test_levels() {
        let found = Diagnostic::CrossingFound {
            station: "0.700".into(),
            region: RegionTag::RegionA,
            estimate: estimate(),
        };
        let discarded = Diagnostic::CrossingDiscarded {
            station: "0.700".into(),
            flagged_index: 1,
            reason: DiscardReason::AtScanBoundary,
        };
        let skipped = Diagnostic::ScanSkipped {
            source: None,
            reason: "bad row".into(),
        };

        assert_eq!(found.level(), Level::Info);
        assert_eq!(discarded.level(), Level::Debug);
        assert!(skipped.is_warning());
        assert!(!found.is_warning());
    }

    #[test]
    fn test_crossing_message_includes_slope_only_when_aggregated() {
        let aggregated = Diagnostic::CrossingFound {
            station: "0.700".into(),
            region: RegionTag::RegionB,
            estimate: estimate(),
        }
        .to_string();
        let neutral = Diagnostic::CrossingFound {
            station: "0.700".into(),
            region: RegionTag::Neutral,
            estimate: estimate(),
        }
        .to_string();

        assert!(aggregated.contains("Intersection"));
        assert!(aggregated.contains("slope m: 2, b: -2"));
        assert!(!neutral.contains("slope"));
    }

    #[test]
    fn test_memory_sink_filters_warnings() {
        let mut sink = MemorySink::new();
        sink.report(Diagnostic::ScanLoaded {
            station: "0.700".into(),
            samples: 5,
        });
        sink.report(Diagnostic::BoundariesCrossed {
            station: "0.700".into(),
            high: 0.1,
            low: 0.2,
        });

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.warnings().count(), 1);
    }
}
