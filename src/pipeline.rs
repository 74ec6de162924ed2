//! The full smooth → peaks → boundaries run over one signal.

use std::fmt;

use tracing::info;

use crate::boundaries::{build_peak_to_peak, build_trough_to_trough, PatternBoundary};
use crate::error::Result;
use crate::filter::{EdgeMode, FilterConfig, SavitzkyGolayFilter};
use crate::peaks::{find_peaks, peak_prominences, PeakConfig};
use crate::signal::Signal;

/// How boundaries are derived from peaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Open-ended capture: consecutive peaks plus a leading partial pattern
    PeakToPeak,
    /// One full rotation: the last peak joins back to the first
    #[default]
    TroughToTrough,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::PeakToPeak => write!(f, "peak-to-peak"),
            Variant::TroughToTrough => write!(f, "trough-to-trough"),
        }
    }
}

/// Every numeric parameter of a segmentation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationConfig {
    pub window_length: usize,
    pub poly_order: usize,
    pub min_distance: usize,
    pub min_prominence: f64,
    pub edge_mode: EdgeMode,
}

impl SegmentationConfig {
    /// Settings tuned for the open, peak-to-peak captures
    pub fn open_preset() -> Self {
        Self {
            window_length: 89,
            poly_order: 2,
            min_distance: 20,
            min_prominence: 80.0,
            edge_mode: EdgeMode::Interp,
        }
    }

    /// Settings tuned for full-rotation, trough-to-trough captures
    pub fn circular_preset() -> Self {
        Self {
            window_length: 111,
            poly_order: 2,
            min_distance: 30,
            min_prominence: 0.0,
            edge_mode: EdgeMode::Interp,
        }
    }

    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::PeakToPeak => Self::open_preset(),
            Variant::TroughToTrough => Self::circular_preset(),
        }
    }

    pub fn filter_config(&self) -> Result<FilterConfig> {
        Ok(FilterConfig::new(self.window_length, self.poly_order)?.with_edge_mode(self.edge_mode))
    }

    pub fn peak_config(&self) -> Result<PeakConfig> {
        PeakConfig::new(self.min_distance)?.with_min_prominence(self.min_prominence)
    }
}

/// Everything one run produces, in sample-index space.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub variant: Variant,
    pub smoothed: Vec<f64>,
    pub peaks: Vec<usize>,
    /// Trough after each peak; empty for [`Variant::PeakToPeak`]
    pub troughs: Vec<usize>,
    pub boundaries: Vec<PatternBoundary>,
}

/// A peak translated to signal positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakRow {
    pub index: usize,
    pub position: f64,
    pub value: f64,
    pub prominence: f64,
}

/// A boundary translated to signal positions.
///
/// For a wrapped boundary `end_position` is below `start_position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryRow {
    pub pattern: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub start_position: f64,
    pub end_position: f64,
    pub wrapped: bool,
}

/// Smooths `signal`, finds its peaks and builds boundaries with the chosen variant.
///
/// # Errors
///
/// Any parameter or data error from the three stages. No peaks at all is
/// reported as `InsufficientData`.
///
/// # Example
///
/// ```rust
/// use savgol_segment::{segment, EdgeMode, SegmentationConfig, Signal, Variant};
///
/// let values: Vec<f64> = (0..90)
///     .map(|i| -(i as f64 * std::f64::consts::TAU / 40.0).cos())
///     .collect();
/// let signal = Signal::uniform(values, 3.0).unwrap();
/// let config = SegmentationConfig {
///     window_length: 7,
///     poly_order: 2,
///     min_distance: 10,
///     min_prominence: 0.0,
///     edge_mode: EdgeMode::Interp,
/// };
/// let result = segment(&signal, &config, Variant::TroughToTrough).unwrap();
/// assert_eq!(result.peaks, vec![20, 60]);
/// assert_eq!(result.boundaries.len(), 2);
/// ```
pub fn segment(
    signal: &Signal,
    config: &SegmentationConfig,
    variant: Variant,
) -> Result<Segmentation> {
    let mut filter = SavitzkyGolayFilter::with_config(config.filter_config()?);
    let peak_config = config.peak_config()?;

    let smoothed = filter.apply(signal.intensities())?;
    let peaks = find_peaks(&smoothed, &peak_config)?;

    let (troughs, boundaries) = match variant {
        Variant::PeakToPeak => (Vec::new(), build_peak_to_peak(&peaks, smoothed.len())?),
        Variant::TroughToTrough => {
            let result = build_trough_to_trough(&peaks, &smoothed)?;
            (result.troughs, result.boundaries)
        }
    };

    info!(
        samples = signal.len(),
        peaks = peaks.len(),
        patterns = boundaries.len(),
        %variant,
        "segmentation finished"
    );

    Ok(Segmentation {
        variant,
        smoothed,
        peaks,
        troughs,
        boundaries,
    })
}

impl Segmentation {
    /// Peaks with their positions, smoothed values and prominences
    pub fn peak_table(&self, signal: &Signal) -> Result<Vec<PeakRow>> {
        let prominences = peak_prominences(&self.smoothed, &self.peaks)?;
        self.peaks
            .iter()
            .zip(prominences)
            .map(|(&index, p)| -> Result<PeakRow> {
                Ok(PeakRow {
                    index,
                    position: signal.position(index)?,
                    value: self.smoothed[index],
                    prominence: p.prominence,
                })
            })
            .collect()
    }

    /// Boundaries with their start and end positions
    pub fn boundary_table(&self, signal: &Signal) -> Result<Vec<BoundaryRow>> {
        self.boundaries
            .iter()
            .enumerate()
            .map(|(i, b)| -> Result<BoundaryRow> {
                Ok(BoundaryRow {
                    pattern: i + 1,
                    start_index: b.start,
                    end_index: b.end,
                    start_position: signal.position(b.start)?,
                    end_position: signal.position(b.end)?,
                    wrapped: b.is_wrapped(),
                })
            })
            .collect()
    }

    /// Positions of the troughs, for overlaying on a plot
    pub fn trough_positions(&self, signal: &Signal) -> Result<Vec<f64>> {
        self.troughs.iter().map(|&i| signal.position(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentError;
    use std::f64::consts::TAU;

    fn periodic(n: usize, period: f64, phase: f64) -> Signal {
        let values = (0..n)
            .map(|i| 100.0 + 50.0 * ((i as f64 + phase) * TAU / period).cos())
            .collect();
        Signal::uniform(values, 360.0 / n as f64).unwrap()
    }

    fn small_config() -> SegmentationConfig {
        SegmentationConfig {
            window_length: 9,
            poly_order: 2,
            min_distance: 20,
            min_prominence: 0.0,
            edge_mode: EdgeMode::Interp,
        }
    }

    #[test]
    fn test_presets_validate() {
        for variant in [Variant::PeakToPeak, Variant::TroughToTrough] {
            let preset = SegmentationConfig::preset(variant);
            assert!(preset.filter_config().is_ok());
            assert!(preset.peak_config().is_ok());
        }
        assert_eq!(SegmentationConfig::open_preset().window_length, 89);
        assert_eq!(SegmentationConfig::circular_preset().min_distance, 30);
    }

    #[test]
    fn test_trough_variant_on_rotation() {
        // Peaks of cos((i + 10) * tau / 60) at 50, 110, 170, 230
        let signal = periodic(240, 60.0, 10.0);
        let result = segment(&signal, &small_config(), Variant::TroughToTrough).unwrap();

        assert_eq!(result.peaks, vec![50, 110, 170, 230]);
        assert_eq!(result.troughs, vec![80, 140, 200, 20]);
        let last = result.boundaries.last().unwrap();
        assert_eq!((last.start, last.end), (230, 50));
        assert!(last.is_wrapped());
    }

    #[test]
    fn test_peak_variant_on_rotation() {
        let signal = periodic(240, 60.0, 10.0);
        let result = segment(&signal, &small_config(), Variant::PeakToPeak).unwrap();

        assert!(result.troughs.is_empty());
        let pairs: Vec<_> = result.boundaries.iter().map(|b| (b.start, b.end)).collect();
        assert_eq!(pairs, vec![(0, 50), (50, 110), (110, 170), (170, 230)]);
    }

    #[test]
    fn test_tables_translate_positions() {
        let signal = periodic(240, 60.0, 10.0);
        let result = segment(&signal, &small_config(), Variant::TroughToTrough).unwrap();

        let peaks = result.peak_table(&signal).unwrap();
        assert_eq!(peaks[0].index, 50);
        assert_eq!(peaks[0].position, 75.0);

        let rows = result.boundary_table(&signal).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].pattern, 4);
        assert_eq!((rows[3].start_position, rows[3].end_position), (345.0, 75.0));
        assert!(rows[3].wrapped);

        let troughs = result.trough_positions(&signal).unwrap();
        assert_eq!(troughs[3], 30.0);
    }

    #[test]
    fn test_monotonic_signal_has_no_patterns() {
        let signal = Signal::uniform((0..50).map(|i| i as f64).collect(), 1.0).unwrap();
        let err = segment(&signal, &small_config(), Variant::PeakToPeak).unwrap_err();
        assert!(matches!(err, SegmentError::InsufficientData(_)));
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let signal = periodic(240, 60.0, 0.0);
        let mut config = small_config();
        config.window_length = 8;
        assert!(matches!(
            segment(&signal, &config, Variant::TroughToTrough),
            Err(SegmentError::InvalidParameter { name: "window_length", .. })
        ));

        let mut config = small_config();
        config.min_distance = 0;
        assert!(matches!(
            segment(&signal, &config, Variant::TroughToTrough),
            Err(SegmentError::InvalidParameter { name: "min_distance", .. })
        ));
    }
}
