//! Analysis pass over line scans.
//!
//! A pass walks scans in order, detects and resolves crossings, fits local
//! slopes, classifies each crossing against the region boundaries and folds
//! qualifying slopes into the per-region aggregates. Scans that failed to
//! load are skipped and reported; boundary setup failures abort the pass
//! before any scan is touched.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::core::loaders::{
    find_gradient_siblings, gradient_base, load_gradient_scans, load_profile, ProfileTable,
};
use crate::core::scan::{LineScan, StationKey};
use crate::core::writers::{
    series_file_name, write_profile_crossings_csv, write_series_csv, ProfileCrossingRow,
};

use super::aggregate::{AggregatedSlopes, SlopeAggregator};
use super::boundary::BoundaryError;
use super::classify::{RegionBoundaries, RegionTag};
use super::crossing::{detect, detect_signed, DiscardReason};
use super::diagnostics::{Diagnostic, DiagnosticsSink};
use super::slope::{LocalSlopeFitter, SlopeEstimate};

/// Most variants compared in one profile run.
pub const MAX_VARIANTS: usize = 3;

/// Errors that stop a whole analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid boundary configuration: {0}")]
    Boundary(#[from] BoundaryError),

    #[error("no gradient files found next to {0}")]
    NoInputFiles(PathBuf),

    #[error("between 1 and 3 variants are supported, got {0}")]
    VariantCount(usize),
}

/// A fitted and classified crossing.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub station: StationKey,
    pub estimate: SlopeEstimate,
    pub region: RegionTag,
}

impl Crossing {
    #[inline]
    pub fn resolved_index(&self) -> usize {
        self.estimate.resolved_index
    }

    #[inline]
    pub fn slope(&self) -> f64 {
        self.estimate.fit.slope
    }

    #[inline]
    pub fn intercept(&self) -> f64 {
        self.estimate.fit.intercept
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub slopes: AggregatedSlopes,
    pub scans_analyzed: usize,
    pub scans_skipped: usize,
    /// Crossings that produced a slope, classified or not.
    pub crossings: usize,
    pub discarded: usize,
    pub unclassified: usize,
}

/// State of a pass in progress.
pub struct GradientAnalysis<'a> {
    boundaries: RegionBoundaries,
    fitter: LocalSlopeFitter,
    aggregator: SlopeAggregator,
    sink: &'a mut dyn DiagnosticsSink,
    report: PassReport,
}

impl<'a> GradientAnalysis<'a> {
    /// Start a pass. Fails when either boundary cannot be built.
    pub fn new(
        config: &PipelineConfig,
        sink: &'a mut dyn DiagnosticsSink,
    ) -> std::result::Result<Self, AnalysisError> {
        let boundaries = RegionBoundaries::from_config(&config.boundaries)?;
        Ok(Self {
            boundaries,
            fitter: LocalSlopeFitter::new(config.fit.half_width),
            aggregator: SlopeAggregator::new(),
            sink,
            report: PassReport::default(),
        })
    }

    /// Analyse one scan and fold its qualifying slopes into the aggregates.
    pub fn analyze_scan(&mut self, scan: &LineScan) -> Vec<Crossing> {
        let station = scan.station();
        let x = station.value();

        self.report.scans_analyzed += 1;
        self.sink.report(Diagnostic::ScanLoaded {
            station: station.to_string(),
            samples: scan.len(),
        });

        if self.boundaries.crossed_at(x) {
            self.sink.report(Diagnostic::BoundariesCrossed {
                station: station.to_string(),
                high: self.boundaries.high().evaluate(x),
                low: self.boundaries.low().evaluate(x),
            });
        }

        let values = scan.values();
        let mut crossings = Vec::new();

        for (flagged_index, resolved) in detect(&values) {
            let estimate = match resolved
                .and_then(|r| self.fitter.fit(scan, flagged_index, r.resolved_index))
            {
                Ok(estimate) => estimate,
                Err(reason) => {
                    self.discard(station, flagged_index, reason);
                    continue;
                }
            };

            let secondary = scan.samples()[flagged_index].secondary;
            let region = match secondary {
                Some(s) => self.boundaries.classify(x, s),
                None => RegionTag::Unclassified,
            };

            self.report.crossings += 1;
            if region == RegionTag::Unclassified {
                self.report.unclassified += 1;
                self.sink.report(Diagnostic::UnclassifiedCrossing {
                    station: station.to_string(),
                    flagged_index,
                    secondary,
                    high: self.boundaries.high().evaluate(x),
                    low: self.boundaries.low().evaluate(x),
                });
            } else {
                self.sink.report(Diagnostic::CrossingFound {
                    station: station.to_string(),
                    region,
                    estimate,
                });
                self.aggregator.offer(station, region, estimate.fit.slope);
            }

            crossings.push(Crossing {
                station: station.clone(),
                estimate,
                region,
            });
        }

        crossings
    }

    /// Record a scan that could not be loaded.
    pub fn skip_scan(&mut self, source: Option<PathBuf>, reason: impl Display) {
        self.report.scans_skipped += 1;
        self.sink.report(Diagnostic::ScanSkipped {
            source,
            reason: reason.to_string(),
        });
    }

    fn discard(&mut self, station: &StationKey, flagged_index: usize, reason: DiscardReason) {
        self.report.discarded += 1;
        self.sink.report(Diagnostic::CrossingDiscarded {
            station: station.to_string(),
            flagged_index,
            reason,
        });
    }

    /// Close the pass and materialise both series.
    pub fn finish(self) -> PassReport {
        PassReport {
            slopes: self.aggregator.finish(),
            ..self.report
        }
    }
}

/// Run one pass over per-file load results, in the order given.
pub fn run_pass<I, E>(
    scans: I,
    config: &PipelineConfig,
    sink: &mut dyn DiagnosticsSink,
) -> std::result::Result<PassReport, AnalysisError>
where
    I: IntoIterator<Item = (PathBuf, std::result::Result<LineScan, E>)>,
    E: Display,
{
    let mut analysis = GradientAnalysis::new(config, sink)?;

    for (path, loaded) in scans {
        match loaded {
            Ok(scan) => {
                analysis.analyze_scan(&scan);
            }
            Err(err) => analysis.skip_scan(Some(path), err),
        }
    }

    Ok(analysis.finish())
}

/// Detect crossings on a profile and fit their slopes, without classification.
///
/// Crossings resolve to the positive sample first, see
/// [`resolve_signed`](super::crossing::resolve_signed).
pub fn estimate_profile_slopes(
    scan: &LineScan,
    fitter: &LocalSlopeFitter,
    sink: &mut dyn DiagnosticsSink,
) -> Vec<SlopeEstimate> {
    let values = scan.values();
    let variant = scan.station().to_string();
    let mut estimates = Vec::new();

    for (flagged_index, resolved) in detect_signed(&values) {
        match resolved.and_then(|r| fitter.fit(scan, flagged_index, r.resolved_index)) {
            Ok(estimate) => {
                sink.report(Diagnostic::ProfileCrossing {
                    variant: variant.clone(),
                    estimate,
                });
                estimates.push(estimate);
            }
            Err(reason) => sink.report(Diagnostic::CrossingDiscarded {
                station: variant.clone(),
                flagged_index,
                reason,
            }),
        }
    }

    estimates
}

/// A gradient batch discovered from one selected file.
#[derive(Debug, Clone)]
pub struct GradientRun {
    pub base: String,
    pub files: Vec<PathBuf>,
    pub report: PassReport,
}

impl GradientRun {
    /// Write both region series as CSV into `out_dir`.
    ///
    /// Returns the written paths, region A first.
    pub fn export_csv(&self, out_dir: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
        let outputs = [
            (&config.output.region_a_label, &self.report.slopes.region_a),
            (&config.output.region_b_label, &self.report.slopes.region_b),
        ];

        let mut written = Vec::with_capacity(outputs.len());
        for (label, series) in outputs {
            let path = series_file_name(out_dir, &self.base, label);
            write_series_csv(&path, series.points())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Analyse every station file that belongs to the batch of `selected`.
pub fn gradients_from_file(
    selected: &Path,
    config: &PipelineConfig,
    sink: &mut dyn DiagnosticsSink,
) -> Result<GradientRun> {
    let base = gradient_base(selected)
        .with_context(|| format!("No station suffix in {}", selected.display()))?;
    let files = find_gradient_siblings(selected)
        .with_context(|| format!("Failed to list gradient files next to {}", selected.display()))?;

    if files.is_empty() {
        return Err(AnalysisError::NoInputFiles(selected.to_path_buf()).into());
    }

    let loaded = load_gradient_scans(&files, &config.input);
    let report = run_pass(loaded, config, sink)?;

    Ok(GradientRun {
        base,
        files,
        report,
    })
}

/// One variant's profile for a section, with its crossings.
#[derive(Debug, Clone)]
pub struct VariantProfile {
    pub name: String,
    pub table: ProfileTable,
    pub estimates: Vec<SlopeEstimate>,
}

/// Every variant's profile for one section.
#[derive(Debug, Clone)]
pub struct SectionReport {
    pub section: String,
    pub variants: Vec<VariantProfile>,
}

impl SectionReport {
    /// Rows for CSV export, in variant order.
    pub fn crossing_rows(&self) -> Vec<ProfileCrossingRow> {
        self.variants
            .iter()
            .flat_map(|variant| {
                variant.estimates.iter().map(move |estimate| ProfileCrossingRow {
                    variant: variant.name.clone(),
                    position: estimate.neighbor_positions[1],
                    slope: estimate.fit.slope,
                    intercept: estimate.fit.intercept,
                })
            })
            .collect()
    }
}

fn variant_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Load and analyse the configured profile sections for each variant.
///
/// A missing or malformed profile skips that variant for that section only.
pub fn profiles_from_variants(
    variant_dirs: &[PathBuf],
    sections: &[String],
    config: &PipelineConfig,
    sink: &mut dyn DiagnosticsSink,
) -> Result<Vec<SectionReport>> {
    if variant_dirs.is_empty() || variant_dirs.len() > MAX_VARIANTS {
        return Err(AnalysisError::VariantCount(variant_dirs.len()).into());
    }
    if sections.is_empty() {
        anyhow::bail!("No profile sections given");
    }

    let fitter = LocalSlopeFitter::new(config.fit.half_width);
    let mut reports = Vec::with_capacity(sections.len());

    for section in sections {
        let mut variants = Vec::with_capacity(variant_dirs.len());

        for (idx, dir) in variant_dirs.iter().enumerate() {
            let name = variant_name(dir);
            let path = dir.join(&config.input.pictures_dir).join(section);

            match load_profile(&path, StationKey::labelled(idx as f64, name.clone())) {
                Ok(table) => {
                    let estimates = estimate_profile_slopes(&table.scan, &fitter, sink);
                    variants.push(VariantProfile {
                        name,
                        table,
                        estimates,
                    });
                }
                Err(err) => sink.report(Diagnostic::ScanSkipped {
                    source: Some(path),
                    reason: err.to_string(),
                }),
            }
        }

        reports.push(SectionReport {
            section: section.clone(),
            variants,
        });
    }

    Ok(reports)
}

/// Write one crossings CSV per section into `out_dir`.
pub fn export_profile_crossings(reports: &[SectionReport], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(reports.len());
    for report in reports {
        let path = out_dir.join(format!("{}_crossings.csv", report.section));
        write_profile_crossings_csv(&path, &report.crossing_rows())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
