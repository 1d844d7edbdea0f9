//! Two-point boundary lines.

use thiserror::Error;

use crate::config::ControlPoints;

/// Errors raised when building a boundary line.
#[derive(Debug, Error, PartialEq)]
pub enum BoundaryError {
    #[error("boundary control points share x = {x}; a vertical boundary cannot be evaluated")]
    DegenerateControlPoints { x: f64 },

    #[error("boundary control point ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },
}

/// Straight line `y = slope * x + intercept` through two control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLine {
    slope: f64,
    intercept: f64,
}

impl BoundaryLine {
    /// Build the line through `(x1, y1)` and `(x2, y2)`.
    ///
    /// # Errors
    ///
    /// Fails if either point is not finite or both share the same x.
    pub fn through(p1: (f64, f64), p2: (f64, f64)) -> Result<Self, BoundaryError> {
        for &(x, y) in &[p1, p2] {
            if !x.is_finite() || !y.is_finite() {
                return Err(BoundaryError::NonFinite { x, y });
            }
        }

        let (x1, y1) = p1;
        let (x2, y2) = p2;
        if x1 == x2 {
            return Err(BoundaryError::DegenerateControlPoints { x: x1 });
        }

        let slope = (y2 - y1) / (x2 - x1);
        let intercept = y1 - slope * x1;
        Ok(Self { slope, intercept })
    }

    /// Build the line from configured control points.
    pub fn from_control_points(points: &ControlPoints) -> Result<Self, BoundaryError> {
        Self::through(
            (points.start[0], points.start[1]),
            (points.end[0], points.end[1]),
        )
    }

    /// Boundary height at `x`.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    #[inline]
    pub fn slope(&self) -> f64 {
        self.slope
    }

    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
