//! Component performance maps.
//!
//! Linear interpolation over strictly increasing rectilinear grids. Points
//! outside the grid are clamped to the nearest edge, so a validated table can
//! be evaluated anywhere without failing. Grid problems are caught once, at
//! construction, and reported as [`MapError`](crate::error::MapError).

pub mod one;
pub mod two;

pub use one::Interp1D;
pub use two::Interp2D;

use crate::error::MapError;

/// Returns the index `i` of the grid cell `[arr[i], arr[i + 1]]` holding `target`.
///
/// `arr` must have at least two points and `target` must lie within its bounds.
fn find_cell_index(arr: &[f64], target: f64) -> usize {
    let last = arr.len() - 1;
    if target >= arr[last] {
        return last - 1;
    }

    let mut low = 0;
    let mut high = last;
    while low < high {
        let mid = low + (high - low) / 2;
        if arr[mid] >= target {
            high = mid;
        } else {
            low = mid + 1;
        }
    }

    if low > 0 && arr[low] > target {
        low - 1
    } else {
        low.min(last - 1)
    }
}

/// Checks that a grid axis is usable for interpolation.
fn validate_axis(axis: &[f64], min_points: usize) -> Result<(), MapError> {
    if axis.is_empty() {
        return Err(MapError::EmptyAxis);
    }
    if axis.len() < min_points {
        return Err(MapError::TooFewPoints {
            min: min_points,
            found: axis.len(),
        });
    }
    if let Some(index) = axis.iter().position(|v| !v.is_finite()) {
        return Err(MapError::NonFinite { index });
    }
    if let Some(index) = axis.windows(2).position(|w| w[0] >= w[1]) {
        return Err(MapError::NotIncreasing { index: index + 1 });
    }
    Ok(())
}

/// Relative position of `target` inside cell `i`, with `target` already clamped.
fn cell_fraction(arr: &[f64], i: usize, target: f64) -> f64 {
    (target - arr[i]) / (arr[i + 1] - arr[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_index_interior_and_edges() {
        let x = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_cell_index(&x, 0.0), 0);
        assert_eq!(find_cell_index(&x, 0.5), 0);
        assert_eq!(find_cell_index(&x, 1.0), 1);
        assert_eq!(find_cell_index(&x, 2.5), 2);
        assert_eq!(find_cell_index(&x, 3.0), 2);
    }

    #[test]
    fn axis_validation() {
        assert_eq!(validate_axis(&[], 2), Err(MapError::EmptyAxis));
        assert_eq!(
            validate_axis(&[1.0], 2),
            Err(MapError::TooFewPoints { min: 2, found: 1 })
        );
        assert_eq!(
            validate_axis(&[0.0, 2.0, 1.0], 2),
            Err(MapError::NotIncreasing { index: 2 })
        );
        assert_eq!(
            validate_axis(&[0.0, f64::NAN], 2),
            Err(MapError::NonFinite { index: 1 })
        );
        assert!(validate_axis(&[0.0, 1.0], 2).is_ok());
    }
}
