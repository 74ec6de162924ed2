use tracing::debug;

use crate::coefficients::{validate_window, CoefficientCache};
use crate::error::{Result, SegmentError};

/// How the smoother estimates samples closer than half a window to either end.
///
/// The choice moves the smoothed curve near index 0 and the final index, and
/// with it any peak or pattern boundary that lands there.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EdgeMode {
    /// Fit the polynomial to the full window shifted inside the signal and
    /// evaluate it at the edge sample (polynomial extrapolation)
    #[default]
    Interp,
    /// Reflect about the edge sample without repeating it: `d c b | a b c d | c b a`
    Mirror,
    /// Repeat the edge sample: `a a a | a b c d | d d d`
    Nearest,
    /// Pad with a fixed value
    Constant(f64),
    /// Treat the signal as circular, for captures spanning one full rotation
    Wrap,
}

/// Configuration for the Savitzky-Golay smoother.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Number of samples in the fitting window (odd, at least 3)
    pub window_length: usize,
    /// Degree of the fitted polynomial (less than `window_length`)
    pub poly_order: usize,
    /// Edge handling policy
    pub edge_mode: EdgeMode,
}

impl FilterConfig {
    /// Creates a new filter configuration with validation
    pub fn new(window_length: usize, poly_order: usize) -> Result<Self> {
        validate_window(window_length, poly_order)?;
        Ok(Self {
            window_length,
            poly_order,
            edge_mode: EdgeMode::default(),
        })
    }

    /// Sets the edge handling mode
    pub fn with_edge_mode(mut self, mode: EdgeMode) -> Self {
        self.edge_mode = mode;
        self
    }
}

/// A Savitzky-Golay smoothing filter.
///
/// Holds its configuration and a coefficient cache, so one filter can smooth
/// many signals of the same shape without re-solving the least-squares systems.
#[derive(Debug)]
pub struct SavitzkyGolayFilter {
    config: FilterConfig,
    cache: CoefficientCache,
}

impl SavitzkyGolayFilter {
    /// Creates a filter with the default [`EdgeMode::Interp`] policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use savgol_segment::SavitzkyGolayFilter;
    ///
    /// let mut filter = SavitzkyGolayFilter::new(5, 2).unwrap();
    /// let smoothed = filter.apply(&[1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0]).unwrap();
    /// assert_eq!(smoothed.len(), 7);
    /// ```
    pub fn new(window_length: usize, poly_order: usize) -> Result<Self> {
        let config = FilterConfig::new(window_length, poly_order)?;
        Ok(Self::with_config(config))
    }

    /// Creates a filter from an already validated configuration
    pub fn with_config(config: FilterConfig) -> Self {
        Self {
            config,
            cache: CoefficientCache::new(),
        }
    }

    /// Sets the edge handling mode
    pub fn with_edge_mode(mut self, mode: EdgeMode) -> Self {
        self.config.edge_mode = mode;
        self
    }

    /// Returns the filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Smooths `data`, returning one estimate per input sample.
    ///
    /// # Errors
    ///
    /// `InsufficientData` for an empty input, `InvalidParameter` when the
    /// window is longer than the input.
    pub fn apply(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        let n = data.len();
        let window = self.config.window_length;
        let order = self.config.poly_order;

        if n == 0 {
            return Err(SegmentError::InsufficientData(
                "cannot smooth an empty signal".to_string(),
            ));
        }
        if window > n {
            return Err(SegmentError::invalid(
                "window_length",
                format!("{window} exceeds signal length {n}"),
            ));
        }

        debug!(
            samples = n,
            window,
            order,
            edge_mode = ?self.config.edge_mode,
            "smoothing signal"
        );

        let half = window / 2;
        let centered = self.cache.centered(window, order)?.to_vec();
        let mut result = Vec::with_capacity(n);

        for i in 0..n {
            let value = if i >= half && i + half < n {
                dot(&centered, &data[i - half..=i + half])
            } else {
                self.edge_value(data, i, &centered)?
            };
            result.push(value);
        }

        Ok(result)
    }

    /// Estimates sample `center`, which lies within half a window of an edge
    fn edge_value(&mut self, data: &[f64], center: usize, centered: &[f64]) -> Result<f64> {
        let n = data.len();
        let window = self.config.window_length;
        let half = window / 2;

        if self.config.edge_mode == EdgeMode::Interp {
            // Shift the window so [start, start + window) lies inside the data
            let start = center.saturating_sub(half).min(n - window);
            let first_offset = start as isize - center as isize;
            let coeffs = self.cache.shifted(first_offset, window, self.config.poly_order)?;
            return Ok(dot(coeffs, &data[start..start + window]));
        }

        let sum: f64 = centered
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let idx = center as isize + k as isize - half as isize;
                c * self.padded_value(data, idx)
            })
            .sum();
        Ok(sum)
    }

    /// Value at `idx`, which may fall up to half a window outside the data
    fn padded_value(&self, data: &[f64], idx: isize) -> f64 {
        let n = data.len() as isize;
        if (0..n).contains(&idx) {
            return data[idx as usize];
        }

        match self.config.edge_mode {
            EdgeMode::Constant(value) => value,
            EdgeMode::Nearest | EdgeMode::Interp => {
                if idx < 0 {
                    data[0]
                } else {
                    data[(n - 1) as usize]
                }
            }
            EdgeMode::Mirror => {
                let reflected = if idx < 0 { -idx } else { 2 * (n - 1) - idx };
                data[reflected.clamp(0, n - 1) as usize]
            }
            EdgeMode::Wrap => data[idx.rem_euclid(n) as usize],
        }
    }
}

fn dot(coeffs: &[f64], samples: &[f64]) -> f64 {
    coeffs.iter().zip(samples).map(|(c, x)| c * x).sum()
}
