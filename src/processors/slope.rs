//! Least-squares slope fitting around a resolved crossing.

use crate::core::scan::LineScan;

use super::crossing::DiscardReason;

/// Degree-1 least-squares fit `value = slope * position + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Fit a straight line through `(xs[i], ys[i])`.
///
/// Returns `None` with fewer than two points, mismatched lengths, or when
/// every `x` is the same.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LineFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    if sxx == 0.0 || !sxx.is_finite() {
        return None;
    }

    let slope = sxy / sxx;
    Some(LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Local slope around one resolved crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeEstimate {
    pub flagged_index: usize,
    pub resolved_index: usize,
    /// Values at `resolved - 1`, `resolved`, `resolved + 1`.
    pub neighbor_values: [f64; 3],
    /// Positions at `resolved - 1`, `resolved`, `resolved + 1`.
    pub neighbor_positions: [f64; 3],
    pub fit: LineFit,
}

/// Fits local slopes on a fixed window around resolved indices.
#[derive(Debug, Clone, Copy)]
pub struct LocalSlopeFitter {
    half_width: usize,
}

impl Default for LocalSlopeFitter {
    fn default() -> Self {
        Self { half_width: 1 }
    }
}

impl LocalSlopeFitter {
    /// Create a fitter using `half_width` samples on each side, at least one.
    pub fn new(half_width: usize) -> Self {
        Self {
            half_width: half_width.max(1),
        }
    }

    #[inline]
    pub fn half_width(&self) -> usize {
        self.half_width
    }

    /// Fit the window `[resolved - w, resolved + w]` of `scan`.
    ///
    /// A window that would leave the scan is never truncated; the crossing
    /// is discarded instead.
    pub fn fit(
        &self,
        scan: &LineScan,
        flagged_index: usize,
        resolved_index: usize,
    ) -> Result<SlopeEstimate, DiscardReason> {
        let samples = scan.samples();
        let w = self.half_width;

        if resolved_index < w || resolved_index + w >= samples.len() {
            return Err(DiscardReason::AtScanBoundary);
        }

        let window = &samples[resolved_index - w..=resolved_index + w];
        let xs: Vec<f64> = window.iter().map(|s| s.position).collect();
        let ys: Vec<f64> = window.iter().map(|s| s.value).collect();
        let fit = fit_line(&xs, &ys).ok_or(DiscardReason::DegenerateWindow)?;

        let around = &samples[resolved_index - 1..=resolved_index + 1];
        Ok(SlopeEstimate {
            flagged_index,
            resolved_index,
            neighbor_values: [around[0].value, around[1].value, around[2].value],
            neighbor_positions: [around[0].position, around[1].position, around[2].position],
            fit,
        })
    }
}
