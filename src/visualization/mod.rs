//! Chart rendering for slope series and profiles.
//!
//! This module renders PNG charts with the plotters library:
//! - the two aggregated slope series against station
//! - one or more variant profiles with their crossings marked
//!
//! plotters is built without a font backend, so charts reserve no label
//! areas and draw no text.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::scan::LineScan;
use crate::processors::aggregate::AggregatedSlopes;
use crate::processors::slope::SlopeEstimate;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot")]
    NoData,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Series color for the region above the high boundary.
const REGION_A_COLOR: RGBColor = RGBColor(228, 26, 28);

/// Series color for the region below the low boundary.
const REGION_B_COLOR: RGBColor = RGBColor(55, 126, 184);

/// Color palette for variant profiles.
const VARIANT_COLORS: &[(u8, u8, u8)] = &[
    (228, 26, 28),  // Red
    (55, 126, 184), // Blue
    (77, 175, 74),  // Green
];

/// One profile to draw.
#[derive(Debug, Clone, Copy)]
pub struct ProfilePlot<'a> {
    pub name: &'a str,
    pub scan: &'a LineScan,
    pub estimates: &'a [SlopeEstimate],
}

fn plotting_error<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Plot both aggregated slope series against station and save as PNG.
///
/// Each series is drawn as a line with circle markers. Either series may be
/// empty, but not both.
pub fn plot_slope_series(
    output_path: &Path,
    slopes: &AggregatedSlopes,
    width: u32,
    height: u32,
) -> Result<()> {
    let series: Vec<(Vec<(f64, f64)>, RGBColor)> = [
        (&slopes.region_a, REGION_A_COLOR),
        (&slopes.region_b, REGION_B_COLOR),
    ]
    .into_iter()
    .map(|(s, color)| {
        let points = s.iter().map(|(k, v)| (k.value(), *v)).collect::<Vec<_>>();
        (points, color)
    })
    .collect();

    let (x_min, x_max, y_min, y_max) =
        compute_bounds(series.iter().flat_map(|(points, _)| points.iter().copied()))
            .ok_or(VisualizationError::NoData)?;
    let x_padding = (x_max - x_min) * 0.05;
    let y_padding = (y_max - y_min) * 0.05;

    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(
            (x_min - x_padding)..(x_max + x_padding),
            (y_min - y_padding)..(y_max + y_padding),
        )
        .map_err(plotting_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(plotting_error)?;

    for (points, color) in &series {
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(plotting_error)?;
        chart
            .draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))
            .map_err(plotting_error)?;
    }

    root.present().map_err(plotting_error)?;

    Ok(())
}

/// Plot variant profiles with their crossings marked and save as PNG.
pub fn plot_profiles(
    output_path: &Path,
    profiles: &[ProfilePlot<'_>],
    width: u32,
    height: u32,
) -> Result<()> {
    let (x_min, x_max, y_min, y_max) = compute_bounds(profiles.iter().flat_map(|p| {
        p.scan.samples().iter().map(|s| (s.position, s.value))
    }))
    .ok_or(VisualizationError::NoData)?;
    let x_padding = (x_max - x_min) * 0.05;
    let y_padding = (y_max - y_min) * 0.05;

    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(
            (x_min - x_padding)..(x_max + x_padding),
            (y_min - y_padding)..(y_max + y_padding),
        )
        .map_err(plotting_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(plotting_error)?;

    // Zero line
    chart
        .draw_series(LineSeries::new(
            [(x_min - x_padding, 0.0), (x_max + x_padding, 0.0)],
            &BLACK,
        ))
        .map_err(plotting_error)?;

    for (idx, profile) in profiles.iter().enumerate() {
        let c = VARIANT_COLORS[idx % VARIANT_COLORS.len()];
        let color = RGBColor(c.0, c.1, c.2);
        log::debug!(
            "plotting {} ({} crossings)",
            profile.name,
            profile.estimates.len()
        );

        chart
            .draw_series(LineSeries::new(
                profile.scan.samples().iter().map(|s| (s.position, s.value)),
                color.stroke_width(2),
            ))
            .map_err(plotting_error)?;

        chart
            .draw_series(profile.estimates.iter().map(|e| {
                Circle::new(
                    (e.neighbor_positions[1], e.neighbor_values[1]),
                    5,
                    color.filled(),
                )
            }))
            .map_err(plotting_error)?;
    }

    root.present().map_err(plotting_error)?;

    Ok(())
}

/// Compute the bounds (min/max) for x and y coordinates.
///
/// Non-finite points are ignored. Returns `None` when no finite point is left.
fn compute_bounds<I>(points: I) -> Option<(f64, f64, f64, f64)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;
    let mut any = false;

    for (x, y) in points {
        if !x.is_finite() || !y.is_finite() {
            continue;
        }
        any = true;
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !any {
        return None;
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    Some((x_min, x_max, y_min, y_max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scan::StationKey;
    use crate::processors::aggregate::SlopeAggregator;
    use crate::processors::classify::RegionTag;
    use crate::processors::slope::LocalSlopeFitter;
    use tempfile::tempdir;

    #[test]
    fn test_compute_bounds() {
        let bounds = compute_bounds(vec![(0.0, 1.0), (2.0, -1.0), (f64::NAN, 9.0)]).unwrap();
        assert_eq!(bounds, (0.0, 2.0, -1.0, 1.0));

        let flat = compute_bounds(vec![(1.0, 3.0)]).unwrap();
        assert_eq!(flat, (0.0, 2.0, 2.0, 4.0));

        assert!(compute_bounds(Vec::<(f64, f64)>::new()).is_none());
    }

    #[test]
    fn test_plot_slope_series_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slopes.png");

        let mut agg = SlopeAggregator::new();
        agg.offer(&StationKey::parse("0.700").unwrap(), RegionTag::RegionA, 4.0);
        agg.offer(&StationKey::parse("0.750").unwrap(), RegionTag::RegionA, 6.0);
        agg.offer(&StationKey::parse("0.700").unwrap(), RegionTag::RegionB, 2.0);

        plot_slope_series(&path, &agg.finish(), 320, 240).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_plot_empty_series_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let err = plot_slope_series(&path, &AggregatedSlopes::default(), 320, 240).unwrap_err();

        assert!(matches!(err, VisualizationError::NoData));
        assert!(!path.exists());
    }

    #[test]
    fn test_plot_profiles_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.png");
        let scan = LineScan::from_columns(
            StationKey::labelled(0.0, "V1"),
            &[0.0, 1.0, 2.0, 3.0, 4.0],
            &[-3.0, -1.0, 0.5, 2.0, 4.0],
            None,
        )
        .unwrap();
        let estimate = LocalSlopeFitter::default().fit(&scan, 2, 2).unwrap();

        let profiles = [ProfilePlot {
            name: "V1",
            scan: &scan,
            estimates: &[estimate],
        }];
        plot_profiles(&path, &profiles, 320, 240).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_plot_single_station_at_configured_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.png");
        let output = crate::config::OutputConfig::default();

        let mut agg = SlopeAggregator::new();
        agg.offer(&StationKey::parse("0.800").unwrap(), RegionTag::RegionB, -2.0);

        plot_slope_series(&path, &agg.finish(), output.chart_width, output.chart_height)
            .unwrap();

        assert!(path.exists());
    }
}
