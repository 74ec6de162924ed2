//! Turning peak indices into pattern boundaries.
//!
//! Two variants exist because they model different captures. [`build_peak_to_peak`]
//! treats the signal as open-ended and never closes the last pattern.
//! [`build_trough_to_trough`] treats it as one full rotation and joins the last
//! peak back to the first.

use std::ops::Range;

use tracing::debug;

use crate::error::{Result, SegmentError};

/// One segmented repeating unit, as sample indices into the signal.
///
/// When `end <= start` the boundary closes a circular signal: it runs from
/// `start` to the last sample and continues from sample 0 up to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternBoundary {
    pub start: usize,
    pub end: usize,
}

impl PatternBoundary {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when the boundary crosses the end of the signal back into index 0.
    ///
    /// A closing boundary that ends exactly at 0 stops at the last sample and
    /// does not wrap.
    pub fn is_wrapped(&self) -> bool {
        self.end <= self.start && self.end > 0
    }

    /// Half-open sample ranges covered by this boundary in a signal of `signal_len` samples.
    ///
    /// The samples of consecutive boundaries from [`build_trough_to_trough`]
    /// tile the whole signal exactly once.
    pub fn sample_ranges(&self, signal_len: usize) -> Vec<Range<usize>> {
        if self.start < self.end {
            return vec![self.start..self.end];
        }
        let mut ranges = vec![self.start..signal_len];
        if self.end > 0 {
            ranges.push(0..self.end);
        }
        ranges
    }

    /// Inclusive `(first, last)` index spans for drawing or reporting.
    ///
    /// A wrapped boundary splits into `[start, signal_len - 1]` and `[0, end]`.
    pub fn display_spans(&self, signal_len: usize) -> Vec<(usize, usize)> {
        let last = signal_len.saturating_sub(1);
        if self.start < self.end {
            vec![(self.start, self.end)]
        } else if self.end == 0 {
            vec![(self.start, last)]
        } else {
            vec![(self.start, last), (0, self.end)]
        }
    }
}

/// Output of [`build_trough_to_trough`].
#[derive(Debug, Clone, PartialEq)]
pub struct TroughSegmentation {
    /// Lowest sample after each peak, one per peak
    pub troughs: Vec<usize>,
    /// Peak-to-peak boundaries, the last one joining the final peak to the first
    pub boundaries: Vec<PatternBoundary>,
}

/// Builds peak-to-peak boundaries for an open-ended signal.
///
/// Each consecutive pair of peaks becomes one boundary. If the first peak is
/// not at index 0, the partial pattern `(0, first_peak)` is prepended. Nothing
/// is emitted after the last peak.
///
/// # Example
///
/// ```rust
/// use savgol_segment::{build_peak_to_peak, PatternBoundary};
///
/// let boundaries = build_peak_to_peak(&[4, 9], 12).unwrap();
/// assert_eq!(boundaries, vec![PatternBoundary::new(0, 4), PatternBoundary::new(4, 9)]);
/// ```
pub fn build_peak_to_peak(peaks: &[usize], signal_len: usize) -> Result<Vec<PatternBoundary>> {
    validate_peaks(peaks, signal_len)?;

    let mut boundaries = Vec::with_capacity(peaks.len());
    if peaks[0] != 0 {
        boundaries.push(PatternBoundary::new(0, peaks[0]));
    }
    boundaries.extend(peaks.windows(2).map(|w| PatternBoundary::new(w[0], w[1])));

    debug!(peaks = peaks.len(), boundaries = boundaries.len(), "built peak-to-peak boundaries");
    Ok(boundaries)
}

/// Builds boundaries for a circular signal and locates the trough after each peak.
///
/// For every peak but the last, the trough is the lowest sample in
/// `smoothed[peak[i]..peak[i + 1]]`. For the last peak the search runs from it
/// to the end of the signal and continues from index 0 up to (not including)
/// the first peak. Ties resolve to the first occurrence in search order.
///
/// Boundaries run peak to peak; the final one is `(last_peak, first_peak)` and
/// is wrapped whenever the first peak is not at index 0. Troughs are reported
/// for diagnostics and are not boundary endpoints.
pub fn build_trough_to_trough(peaks: &[usize], smoothed: &[f64]) -> Result<TroughSegmentation> {
    let n = smoothed.len();
    validate_peaks(peaks, n)?;

    let first = peaks[0];
    let last = peaks.len() - 1;
    let mut troughs = Vec::with_capacity(peaks.len());
    let mut boundaries = Vec::with_capacity(peaks.len());

    for (i, &peak) in peaks.iter().enumerate() {
        let next = if i < last { peaks[i + 1] } else { first };
        let segment = CircularSegment::between(peak, next, n);

        let lowest = argmin(segment.values(smoothed));
        troughs.push(segment.to_signal_index(lowest)?);
        boundaries.push(PatternBoundary::new(peak, next));
    }

    debug!(
        peaks = peaks.len(),
        wrapped = boundaries.iter().filter(|b| b.is_wrapped()).count(),
        "built trough-to-trough boundaries"
    );
    Ok(TroughSegmentation {
        troughs,
        boundaries,
    })
}

/// A run of samples that may continue past the end of a circular signal.
///
/// Segment-space index `j` maps to signal index `start + j`, or to
/// `j - (signal_len - start)` once the run has passed the last sample.
#[derive(Debug, Clone, Copy)]
struct CircularSegment {
    start: usize,
    len: usize,
    signal_len: usize,
}

impl CircularSegment {
    /// Samples from `from` up to, not including, `to`; wraps when `to <= from`
    fn between(from: usize, to: usize, signal_len: usize) -> Self {
        let len = if to > from {
            to - from
        } else {
            signal_len - from + to
        };
        Self {
            start: from,
            len,
            signal_len,
        }
    }

    /// Tail of the signal from `start`, concatenated with its head when the run wraps
    fn values<'a>(&self, data: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
        let tail = (self.signal_len - self.start).min(self.len);
        let head = self.len - tail;
        data[self.start..self.start + tail]
            .iter()
            .chain(&data[..head])
            .copied()
    }

    fn to_signal_index(&self, segment_index: usize) -> Result<usize> {
        let tail = self.signal_len - self.start;
        let index = if segment_index < tail {
            self.start + segment_index
        } else {
            segment_index - tail
        };
        if segment_index >= self.len || index >= self.signal_len {
            return Err(SegmentError::IndexOutOfRange {
                index,
                len: self.signal_len,
            });
        }
        Ok(index)
    }
}

/// Position of the first minimum in segment space
fn argmin(values: impl Iterator<Item = f64>) -> usize {
    let mut best = (0, f64::INFINITY);
    for (j, v) in values.enumerate() {
        if v < best.1 {
            best = (j, v);
        }
    }
    best.0
}

fn validate_peaks(peaks: &[usize], signal_len: usize) -> Result<()> {
    if peaks.is_empty() {
        return Err(SegmentError::InsufficientData(
            "at least one peak is needed to build pattern boundaries".to_string(),
        ));
    }
    if peaks.windows(2).any(|w| w[0] >= w[1]) {
        return Err(SegmentError::invalid("peaks", "indices must be strictly increasing"));
    }
    if let Some(&beyond) = peaks.iter().find(|&&p| p >= signal_len) {
        return Err(SegmentError::invalid(
            "peaks",
            format!("index {beyond} is outside a signal of length {signal_len}"),
        ));
    }
    Ok(())
}
