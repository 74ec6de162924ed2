use crate::boundaries::PatternBoundary;
use crate::error::{Result, SegmentError};

/// An intensity profile sampled at increasing positions (rotation degrees).
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    positions: Vec<f64>,
    intensities: Vec<f64>,
}

impl Signal {
    /// Builds a signal from aligned columns.
    ///
    /// # Errors
    ///
    /// `InsufficientData` when empty, `MalformedSignal` when the columns differ
    /// in length, hold non-finite values, or positions do not strictly increase.
    pub fn new(positions: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        if intensities.is_empty() {
            return Err(SegmentError::InsufficientData("signal has no samples".to_string()));
        }
        if positions.len() != intensities.len() {
            return Err(SegmentError::MalformedSignal(format!(
                "{} positions but {} intensities",
                positions.len(),
                intensities.len()
            )));
        }
        if let Some(i) = intensities.iter().position(|v| !v.is_finite()) {
            return Err(SegmentError::MalformedSignal(format!(
                "intensity at row {i} is not finite"
            )));
        }
        if let Some(i) = positions.iter().position(|v| !v.is_finite()) {
            return Err(SegmentError::MalformedSignal(format!(
                "position at row {i} is not finite"
            )));
        }
        if let Some(i) = positions.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SegmentError::MalformedSignal(format!(
                "positions must increase: row {} ({}) follows {}",
                i + 1,
                positions[i + 1],
                positions[i]
            )));
        }
        Ok(Self {
            positions,
            intensities,
        })
    }

    /// Signal whose positions are `0, step, 2 * step, ...`
    pub fn uniform(intensities: Vec<f64>, step: f64) -> Result<Self> {
        let positions = (0..intensities.len()).map(|i| i as f64 * step).collect();
        Self::new(positions, intensities)
    }

    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Position of sample `index`
    pub fn position(&self, index: usize) -> Result<f64> {
        self.positions
            .get(index)
            .copied()
            .ok_or(SegmentError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Translates a boundary into `(start_position, end_position)` spans.
    ///
    /// Wrapped boundaries yield two spans: start to the last position, then the
    /// first position to end.
    pub fn position_spans(&self, boundary: &PatternBoundary) -> Result<Vec<(f64, f64)>> {
        boundary
            .display_spans(self.len())
            .into_iter()
            .map(|(first, last)| -> Result<(f64, f64)> {
                Ok((self.position(first)?, self.position(last)?))
            })
            .collect()
    }
}
