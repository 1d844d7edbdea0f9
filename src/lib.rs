//! Zero-crossing slope extraction for CFD line-scan exports.
//!
//! This crate provides tools for:
//! - Loading gradient line scans and XY profiles exported by a CFD post-processor
//! - Detecting sign changes and resolving each to a representative sample
//! - Fitting local least-squares slopes around resolved crossings
//! - Classifying crossings into window/frame/door bands between two boundary lines
//! - Aggregating the strongest slope per station into sorted series
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use cfd_gradients::{processors::{gradients_from_file, MemorySink}, PipelineConfig};
//!
//! let mut sink = MemorySink::new();
//! let run = gradients_from_file(Path::new("PICTURES/Ux_GRAD_0.700"), &PipelineConfig::default(), &mut sink).unwrap();
//! for (station, slope) in run.report.slopes.region_a.iter() {
//!     println!("{station}: {slope}");
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{BoundaryConfig, ControlPoints, FitConfig, InputConfig, PipelineConfig};
pub use core::scan::{LineScan, Sample, StationKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
