use ahash::AHashMap;
use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SegmentError};

/// Checks the window/order pair shared by every smoothing entry point.
pub(crate) fn validate_window(window_length: usize, poly_order: usize) -> Result<()> {
    if window_length < 3 || window_length % 2 == 0 {
        return Err(SegmentError::invalid(
            "window_length",
            format!("{window_length} must be odd and at least 3"),
        ));
    }
    if poly_order >= window_length {
        return Err(SegmentError::invalid(
            "poly_order",
            format!("{poly_order} must be less than window length {window_length}"),
        ));
    }
    Ok(())
}

/// Computes Savitzky-Golay smoothing coefficients for a centered window.
///
/// Fits a polynomial of degree `poly_order` to `window_length` equally spaced
/// samples by least squares and returns the weights that evaluate the fit at the
/// center sample. Convolving the signal with these weights yields the smoothed
/// value.
///
/// # Example
///
/// ```rust
/// use savgol_segment::compute_coefficients;
///
/// let coeffs = compute_coefficients(5, 2).unwrap();
/// assert!((coeffs[2] - 17.0 / 35.0).abs() < 1e-12);
/// ```
pub fn compute_coefficients(window_length: usize, poly_order: usize) -> Result<Vec<f64>> {
    validate_window(window_length, poly_order)?;

    let half = (window_length / 2) as isize;
    let offsets: Vec<isize> = (-half..=half).collect();
    compute_coefficients_for_offsets(&offsets, poly_order)
}

/// Computes weights that evaluate, at offset 0, the polynomial fitted to samples at `offsets`.
///
/// Offsets are relative to the sample being estimated and need not be centered;
/// the smoother uses this near the edges of the signal, where the window is
/// shifted inside the data and the fit is extrapolated to the edge sample.
pub fn compute_coefficients_for_offsets(offsets: &[isize], poly_order: usize) -> Result<Vec<f64>> {
    let n = offsets.len();
    if n == 0 {
        return Err(SegmentError::invalid("offsets", "at least one offset is required"));
    }
    if poly_order >= n {
        return Err(SegmentError::invalid(
            "poly_order",
            format!("{poly_order} must be less than the number of offsets ({n})"),
        ));
    }

    // Scaling x to [-1, 1] keeps A^T A well conditioned for wide windows.
    // Evaluation happens at x = 0, so the weights are unaffected.
    let scale = offsets
        .iter()
        .map(|o| o.unsigned_abs())
        .max()
        .filter(|&m| m > 0)
        .unwrap_or(1) as f64;

    let mut vandermonde = DMatrix::<f64>::zeros(n, poly_order + 1);
    for (i, &off) in offsets.iter().enumerate() {
        let x = off as f64 / scale;
        for j in 0..=poly_order {
            vandermonde[(i, j)] = x.powi(j as i32);
        }
    }

    // Solve A^T A c = e_0, then weight_i = sum_j c_j x_i^j
    let ata = vandermonde.transpose() * &vandermonde;
    let mut rhs = DVector::<f64>::zeros(poly_order + 1);
    rhs[0] = 1.0;

    let poly = ata.lu().solve(&rhs).ok_or_else(|| {
        SegmentError::ComputationError("failed to solve least squares system".to_string())
    })?;

    Ok((&vandermonde * poly).iter().copied().collect())
}

/// Memoises coefficient sets so each distinct window shape is solved once per filter.
#[derive(Debug, Default)]
pub struct CoefficientCache {
    centered: AHashMap<(usize, usize), Vec<f64>>,
    // keyed by (first offset, window length, poly order); edge windows are contiguous
    shifted: AHashMap<(isize, usize, usize), Vec<f64>>,
}

impl CoefficientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets centered coefficients from cache or computes them if not cached
    pub fn centered(&mut self, window_length: usize, poly_order: usize) -> Result<&[f64]> {
        let key = (window_length, poly_order);
        if !self.centered.contains_key(&key) {
            let coeffs = compute_coefficients(window_length, poly_order)?;
            self.centered.insert(key, coeffs);
        }
        Ok(&self.centered[&key])
    }

    /// Coefficients for a contiguous window starting `first_offset` samples from the target.
    pub fn shifted(
        &mut self,
        first_offset: isize,
        window_length: usize,
        poly_order: usize,
    ) -> Result<&[f64]> {
        let key = (first_offset, window_length, poly_order);
        if !self.shifted.contains_key(&key) {
            let offsets: Vec<isize> = (0..window_length as isize)
                .map(|i| first_offset + i)
                .collect();
            let coeffs = compute_coefficients_for_offsets(&offsets, poly_order)?;
            self.shifted.insert(key, coeffs);
        }
        Ok(&self.shifted[&key])
    }

    /// Number of distinct coefficient sets held
    pub fn len(&self) -> usize {
        self.centered.len() + self.shifted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_5_point_quadratic_smoothing() {
        let coeffs = compute_coefficients(5, 2).unwrap();
        // [-3, 12, 17, 12, -3] / 35
        let expected = [-3.0 / 35.0, 12.0 / 35.0, 17.0 / 35.0, 12.0 / 35.0, -3.0 / 35.0];

        for (actual, expected) in coeffs.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_order_zero_is_moving_average() {
        let coeffs = compute_coefficients(7, 0).unwrap();
        for c in coeffs {
            assert_abs_diff_eq!(c, 1.0 / 7.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_coefficients_sum_to_one() {
        for (w, p) in [(5, 2), (11, 3), (89, 2), (111, 2)] {
            let sum: f64 = compute_coefficients(w, p).unwrap().iter().sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(compute_coefficients(4, 2).is_err()); // Even window size
        assert!(compute_coefficients(5, 5).is_err()); // Poly order >= window size
        assert!(compute_coefficients(1, 0).is_err()); // Window below 3
        assert!(compute_coefficients(0, 0).is_err());
        assert!(compute_coefficients_for_offsets(&[], 0).is_err());
    }

    #[test]
    fn test_shifted_window_extrapolates_line() {
        // Window [0, 5) fitted and evaluated two samples to the left of its start
        let coeffs = compute_coefficients_for_offsets(&[2, 3, 4, 5, 6], 1).unwrap();
        let line = |x: f64| 3.0 * x - 1.0;
        let estimate: f64 = coeffs
            .iter()
            .zip([2.0, 3.0, 4.0, 5.0, 6.0])
            .map(|(c, x)| c * line(x))
            .sum();
        assert_abs_diff_eq!(estimate, line(0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_coefficient_cache() {
        let mut cache = CoefficientCache::new();
        assert!(cache.is_empty());

        let first = cache.centered(5, 2).unwrap().to_vec();
        let second = cache.centered(5, 2).unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.shifted(-2, 5, 2).unwrap();
        cache.shifted(-2, 5, 2).unwrap();
        cache.shifted(-1, 5, 2).unwrap();
        assert_eq!(cache.len(), 3);
    }
}
