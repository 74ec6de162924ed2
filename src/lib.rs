//! # Savitzky-Golay pattern segmentation
//!
//! Splits a periodic intensity profile, such as the pixel sum of a tool-wear
//! inspection image against rotation degree, into its repeating patterns.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! - [`SavitzkyGolayFilter`] smooths the raw samples with a sliding
//!   least-squares polynomial fit. Edges follow an explicit [`EdgeMode`].
//! - [`find_peaks`] picks local maxima subject to a minimum separation and an
//!   optional minimum prominence.
//! - [`build_peak_to_peak`] (open capture) or [`build_trough_to_trough`]
//!   (one full rotation, wrapping the last pattern back to the first) turns
//!   peaks into [`PatternBoundary`] values.
//!
//! [`segment`] runs all three with one [`SegmentationConfig`].
//!
//! ## Example
//!
//! ```rust
//! use savgol_segment::{build_trough_to_trough, find_peaks, smooth, PeakConfig};
//!
//! let raw: Vec<f64> = (0..90)
//!     .map(|i| -(i as f64 * std::f64::consts::TAU / 30.0).cos())
//!     .collect();
//! let smoothed = smooth(&raw, 5, 2).unwrap();
//! let peaks = find_peaks(&smoothed, &PeakConfig::new(10).unwrap()).unwrap();
//! let result = build_trough_to_trough(&peaks, &smoothed).unwrap();
//! assert_eq!(peaks, vec![15, 45, 75]);
//! assert_eq!(result.boundaries.len(), 3);
//! ```
//!
//! Smoothing is not idempotent: feeding the filter its own output changes the
//! curve again, so repeated passes are not a substitute for a wider window.

mod boundaries;
mod coefficients;
mod csv_utils;
mod error;
mod filter;
mod peaks;
mod pipeline;
mod signal;

pub use boundaries::{
    build_peak_to_peak, build_trough_to_trough, PatternBoundary, TroughSegmentation,
};
pub use coefficients::{compute_coefficients, compute_coefficients_for_offsets, CoefficientCache};
pub use csv_utils::{
    read_signal, write_boundaries, write_smoothed, DEFAULT_INTENSITY_COLUMN,
    DEFAULT_POSITION_COLUMN,
};
pub use error::{Result, SegmentError};
pub use filter::{EdgeMode, FilterConfig, SavitzkyGolayFilter};
pub use peaks::{detect_peaks, find_peaks, peak_prominences, Peak, PeakConfig, Prominence};
pub use pipeline::{segment, BoundaryRow, PeakRow, Segmentation, SegmentationConfig, Variant};
pub use signal::Signal;

/// Smooths `data` with a Savitzky-Golay filter using [`EdgeMode::Interp`] edges.
///
/// # Errors
///
/// `InvalidParameter` when `window_length` is even, below 3 or longer than
/// `data`, or when `poly_order >= window_length`; `InsufficientData` for an
/// empty input.
///
/// # Example
///
/// ```rust
/// use savgol_segment::smooth;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
/// let smoothed = smooth(&data, 5, 2).unwrap();
/// assert_eq!(smoothed.len(), data.len());
/// ```
pub fn smooth(data: &[f64], window_length: usize, poly_order: usize) -> Result<Vec<f64>> {
    let mut filter = SavitzkyGolayFilter::new(window_length, poly_order)?;
    filter.apply(data)
}
