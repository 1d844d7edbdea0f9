//! Crossing detection, slope fitting, classification and aggregation.

pub mod aggregate;
pub mod boundary;
pub mod classify;
pub mod crossing;
pub mod diagnostics;
pub mod pipeline;
pub mod slope;

// Re-export key types for convenience
pub use aggregate::{AggregateSeries, AggregatedSlopes, SlopeAggregator};
pub use boundary::{BoundaryError, BoundaryLine};
pub use classify::{RegionBoundaries, RegionTag};
pub use crossing::{detect, detect_signed, DiscardReason, ResolvedCrossing};
pub use diagnostics::{Diagnostic, DiagnosticsSink, LogSink, MemorySink};
pub use pipeline::{
    estimate_profile_slopes, gradients_from_file, profiles_from_variants, run_pass, AnalysisError,
    Crossing, GradientAnalysis, GradientRun, PassReport, SectionReport,
};
pub use slope::{fit_line, LineFit, LocalSlopeFitter, SlopeEstimate};
