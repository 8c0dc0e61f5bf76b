//! 2-dimensional lookup maps (efficiency, fuel rate).

use super::{cell_fraction, find_cell_index, validate_axis};
use crate::error::MapError;

/// Bilinear map `f(x, y)` over a rectilinear grid with clamped extrapolation.
///
/// Values are stored x-major: `f_xy[i][j] = f(x[i], y[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Interp2D {
    x: Vec<f64>,
    y: Vec<f64>,
    f_xy: Vec<Vec<f64>>,
}

impl Interp2D {
    /// Creates and validates a map.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if either axis has fewer than two points or is not
    /// strictly increasing, if `f_xy` is not `x.len()` rows of `y.len()`
    /// values, or if any value is non-finite.
    pub fn new(x: Vec<f64>, y: Vec<f64>, f_xy: Vec<Vec<f64>>) -> Result<Self, MapError> {
        validate_axis(&x, 2)?;
        validate_axis(&y, 2)?;
        if f_xy.len() != x.len() {
            return Err(MapError::ShapeMismatch {
                expected: x.len(),
                found: f_xy.len(),
            });
        }
        for (i, row) in f_xy.iter().enumerate() {
            if row.len() != y.len() {
                return Err(MapError::ShapeMismatch {
                    expected: y.len(),
                    found: row.len(),
                });
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(MapError::NonFinite {
                    index: i * y.len() + j,
                });
            }
        }
        Ok(Self { x, y, f_xy })
    }

    /// Builds a map by sampling `f` at every grid point.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Interp2D::new`].
    pub fn from_fn(x: Vec<f64>, y: Vec<f64>, f: impl Fn(f64, f64) -> f64) -> Result<Self, MapError> {
        let f_xy = x
            .iter()
            .map(|&xi| y.iter().map(|&yj| f(xi, yj)).collect())
            .collect();
        Self::new(x, y, f_xy)
    }

    /// Evaluates the map at `(x, y)`, clamping each coordinate to its axis.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        if x.is_nan() || y.is_nan() {
            return f64::NAN;
        }
        let xc = x.clamp(self.x[0], self.x[self.x.len() - 1]);
        let yc = y.clamp(self.y[0], self.y[self.y.len() - 1]);

        let i = find_cell_index(&self.x, xc);
        let j = find_cell_index(&self.y, yc);
        let x_frac = cell_fraction(&self.x, i, xc);
        let y_frac = cell_fraction(&self.y, j, yc);

        // interpolate along x, then along y
        let c0 = self.f_xy[i][j] * (1.0 - x_frac) + self.f_xy[i + 1][j] * x_frac;
        let c1 = self.f_xy[i][j + 1] * (1.0 - x_frac) + self.f_xy[i + 1][j + 1] * x_frac;
        c0 * (1.0 - y_frac) + c1 * y_frac
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn f_xy(&self) -> &[Vec<f64>] {
        &self.f_xy
    }

    /// Returns a copy with the axes and values multiplied by the given factors.
    ///
    /// Used by component rescaling, where the torque axis and fuel values grow
    /// with rated power while the speed axis stays fixed.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if a scaled axis is no longer strictly increasing
    /// or a value becomes non-finite.
    pub fn scale(&self, x_factor: f64, y_factor: f64, value_factor: f64) -> Result<Self, MapError> {
        Self::new(
            self.x.iter().map(|v| v * x_factor).collect(),
            self.y.iter().map(|v| v * y_factor).collect(),
            self.f_xy
                .iter()
                .map(|row| row.iter().map(|v| v * value_factor).collect())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> Interp2D {
        // f(x, y) = 0.2 * x + 0.4 * y
        Interp2D::from_fn(vec![0., 1., 2.], vec![0., 1., 2.], |x, y| 0.2 * x + 0.4 * y).unwrap()
    }

    #[test]
    fn grid_points_are_exact() {
        let m = Interp2D::new(
            vec![0.05, 0.10, 0.15],
            vec![0.10, 0.20, 0.30],
            vec![vec![0., 1., 2.], vec![3., 4., 5.], vec![6., 7., 8.]],
        )
        .unwrap();
        assert_eq!(m.eval(0.15, 0.20), 7.0);
        assert_eq!(m.eval(0.05, 0.10), 0.0);
    }

    #[test]
    fn bilinear_interior() {
        let m = Interp2D::new(vec![0., 1.], vec![0., 1.], vec![vec![0., 1.], vec![2., 3.]]).unwrap();
        assert!((m.eval(0.25, 0.65) - 1.15).abs() < 1e-12);
        assert!((plane().eval(1.5, 1.5) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn clamps_outside_grid() {
        let m = plane();
        assert_eq!(m.eval(-1.0, 2.5), m.eval(0.0, 2.0));
        assert_eq!(m.eval(9.0, -9.0), m.eval(2.0, 0.0));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Interp2D::new(vec![0., 1.], vec![0., 1.], vec![vec![0., 1.], vec![2.]]);
        assert_eq!(
            err,
            Err(MapError::ShapeMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn rejects_wrong_row_count() {
        let err = Interp2D::new(vec![0., 1., 2.], vec![0., 1.], vec![vec![0., 1.], vec![2., 3.]]);
        assert!(matches!(err, Err(MapError::ShapeMismatch { expected: 3, found: 2 })));
    }

    #[test]
    fn scale_axes_and_values() {
        let m = plane().scale(1.0, 2.0, 3.0).unwrap();
        // f'(x, y) = 3 * f(x, y / 2)
        assert!((m.eval(1.0, 2.0) - 3.0 * plane().eval(1.0, 1.0)).abs() < 1e-12);
    }
}
