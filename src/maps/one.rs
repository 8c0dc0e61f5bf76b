//! 1-dimensional lookup curves (torque limits, OCV, resistance, OOL).

use super::{cell_fraction, find_cell_index, validate_axis};
use crate::error::MapError;

/// Piecewise-linear curve `f(x)` with clamped extrapolation.
///
/// # Examples
///
/// ```
/// use shev_sim::maps::Interp1D;
///
/// let curve = Interp1D::new(vec![0.0, 1.0, 2.0], vec![0.2, 0.4, 0.6]).unwrap();
/// assert!((curve.eval(1.5) - 0.5).abs() < 1e-12);
/// assert_eq!(curve.eval(-1.0), 0.2); // clamped below the grid
/// assert_eq!(curve.eval(5.0), 0.6); // clamped above the grid
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Interp1D {
    x: Vec<f64>,
    f_x: Vec<f64>,
}

impl Interp1D {
    /// Creates and validates a curve.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if `x` has fewer than two points, is not strictly
    /// increasing, contains non-finite values, or differs in length from `f_x`.
    pub fn new(x: Vec<f64>, f_x: Vec<f64>) -> Result<Self, MapError> {
        validate_axis(&x, 2)?;
        if f_x.len() != x.len() {
            return Err(MapError::ShapeMismatch {
                expected: x.len(),
                found: f_x.len(),
            });
        }
        if let Some(index) = f_x.iter().position(|v| !v.is_finite()) {
            return Err(MapError::NonFinite { index });
        }
        Ok(Self { x, f_x })
    }

    /// Creates a curve that returns `value` everywhere on `[x_min, x_max]`.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if the bounds are not finite and increasing.
    pub fn constant(x_min: f64, x_max: f64, value: f64) -> Result<Self, MapError> {
        Self::new(vec![x_min, x_max], vec![value, value])
    }

    /// Evaluates the curve at `point`, clamping to the grid bounds.
    ///
    /// A NaN point yields NaN.
    pub fn eval(&self, point: f64) -> f64 {
        if point.is_nan() {
            return f64::NAN;
        }
        let last = self.x.len() - 1;
        if point <= self.x[0] {
            return self.f_x[0];
        }
        if point >= self.x[last] {
            return self.f_x[last];
        }
        let i = find_cell_index(&self.x, point);
        let frac = cell_fraction(&self.x, i, point);
        self.f_x[i] * (1.0 - frac) + self.f_x[i + 1] * frac
    }

    /// Grid points.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Values at the grid points.
    pub fn f_x(&self) -> &[f64] {
        &self.f_x
    }

    /// Smallest grid point.
    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    /// Largest grid point.
    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Returns a copy with every value multiplied by `factor`.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if scaling produces non-finite values.
    pub fn scale_values(&self, factor: f64) -> Result<Self, MapError> {
        Self::new(
            self.x.clone(),
            self.f_x.iter().map(|v| v * factor).collect(),
        )
    }

    /// Returns a copy with every grid point multiplied by `factor` (> 0).
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if the scaled axis is no longer strictly increasing.
    pub fn scale_x(&self, factor: f64) -> Result<Self, MapError> {
        Self::new(
            self.x.iter().map(|v| v * factor).collect(),
            self.f_x.clone(),
        )
    }
}
