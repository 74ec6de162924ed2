//! Local-maximum detection with distance and prominence filtering.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{Result, SegmentError};

/// Peak selection constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakConfig {
    /// Minimum index gap between two retained peaks (at least 1)
    pub min_distance: usize,
    /// Minimum prominence a retained peak needs; 0 disables the filter
    pub min_prominence: f64,
}

impl PeakConfig {
    pub fn new(min_distance: usize) -> Result<Self> {
        if min_distance < 1 {
            return Err(SegmentError::invalid("min_distance", "must be at least 1"));
        }
        Ok(Self {
            min_distance,
            min_prominence: 0.0,
        })
    }

    pub fn with_min_prominence(mut self, min_prominence: f64) -> Result<Self> {
        if !min_prominence.is_finite() || min_prominence < 0.0 {
            return Err(SegmentError::invalid(
                "min_prominence",
                format!("{min_prominence} must be finite and non-negative"),
            ));
        }
        self.min_prominence = min_prominence;
        Ok(self)
    }
}

/// A detected peak with the properties reported alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub value: f64,
    pub prominence: f64,
}

/// Prominence of one peak and the bases it was measured from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prominence {
    pub prominence: f64,
    pub left_base: usize,
    pub right_base: usize,
}

/// Finds peaks in `data` and returns their indices in ascending order.
///
/// A candidate is a sample strictly greater than both neighbours, so the first
/// and last samples never qualify. Candidates are visited from highest to
/// lowest and any candidate closer than `min_distance` to one already kept is
/// dropped; equal heights keep the later index, as in scipy. Survivors whose
/// prominence is below `min_prominence` are then removed. No qualifying sample
/// yields an empty list.
///
/// # Example
///
/// ```rust
/// use savgol_segment::{find_peaks, PeakConfig};
///
/// let data = [0.0, 3.0, 0.0, 1.0, 0.0, 2.0, 0.0];
/// let peaks = find_peaks(&data, &PeakConfig::new(3).unwrap()).unwrap();
/// assert_eq!(peaks, vec![1, 5]);
/// ```
pub fn find_peaks(data: &[f64], config: &PeakConfig) -> Result<Vec<usize>> {
    if config.min_distance < 1 {
        return Err(SegmentError::invalid("min_distance", "must be at least 1"));
    }
    if !config.min_prominence.is_finite() || config.min_prominence < 0.0 {
        return Err(SegmentError::invalid(
            "min_prominence",
            format!("{} must be finite and non-negative", config.min_prominence),
        ));
    }

    let candidates = local_maxima(data);
    let mut peaks = select_by_distance(data, &candidates, config.min_distance);

    if config.min_prominence > 0.0 {
        let prominences = peak_prominences(data, &peaks)?;
        peaks = peaks
            .into_iter()
            .zip(prominences)
            .filter(|(_, p)| p.prominence >= config.min_prominence)
            .map(|(idx, _)| idx)
            .collect();
    }

    debug!(
        candidates = candidates.len(),
        kept = peaks.len(),
        min_distance = config.min_distance,
        min_prominence = config.min_prominence,
        "peak detection finished"
    );

    Ok(peaks)
}

/// Like [`find_peaks`] but returns each peak with its value and prominence.
pub fn detect_peaks(data: &[f64], config: &PeakConfig) -> Result<Vec<Peak>> {
    let indices = find_peaks(data, config)?;
    let prominences = peak_prominences(data, &indices)?;
    Ok(indices
        .into_iter()
        .zip(prominences)
        .map(|(index, p)| Peak {
            index,
            value: data[index],
            prominence: p.prominence,
        })
        .collect())
}

/// Computes the prominence of each peak.
///
/// From the peak, each side is scanned outwards until a strictly higher sample
/// or the end of the data; the lowest sample seen is that side's base. The
/// prominence is the peak height above the higher of the two bases.
///
/// # Errors
///
/// `IndexOutOfRange` if a peak index does not lie inside `data`.
pub fn peak_prominences(data: &[f64], peaks: &[usize]) -> Result<Vec<Prominence>> {
    peaks
        .iter()
        .map(|&peak| -> Result<Prominence> {
            let height = *data.get(peak).ok_or(SegmentError::IndexOutOfRange {
                index: peak,
                len: data.len(),
            })?;

            let (left_min, left_base) = lowest_until_higher(data, peak, (0..peak).rev(), height);
            let (right_min, right_base) =
                lowest_until_higher(data, peak, peak + 1..data.len(), height);

            Ok(Prominence {
                prominence: height - left_min.max(right_min),
                left_base,
                right_base,
            })
        })
        .collect()
}

fn lowest_until_higher(
    data: &[f64],
    peak: usize,
    indices: impl Iterator<Item = usize>,
    height: f64,
) -> (f64, usize) {
    let mut lowest = (height, peak);
    for i in indices {
        if data[i] > height {
            break;
        }
        if data[i] < lowest.0 {
            lowest = (data[i], i);
        }
    }
    lowest
}

fn local_maxima(data: &[f64]) -> Vec<usize> {
    if data.len() < 3 {
        return Vec::new();
    }
    (1..data.len() - 1)
        .filter(|&i| data[i] > data[i - 1] && data[i] > data[i + 1])
        .collect()
}

fn select_by_distance(data: &[f64], candidates: &[usize], min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 {
        return candidates.to_vec();
    }

    // Stable ascending sort walked from the back: among equal heights the
    // later index is considered first
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|&a, &b| data[a].partial_cmp(&data[b]).unwrap_or(Ordering::Equal));

    let mut kept: Vec<usize> = Vec::with_capacity(ranked.len());
    for candidate in ranked.into_iter().rev() {
        if kept.iter().all(|&k| k.abs_diff(candidate) >= min_distance) {
            kept.push(candidate);
        }
    }
    kept.sort_unstable();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(distance: usize) -> PeakConfig {
        PeakConfig::new(distance).unwrap()
    }

    #[test]
    fn test_simple_peaks() {
        let data = [0.0, 1.0, 0.0, 2.0, 0.0, 1.5, 0.0];
        assert_eq!(find_peaks(&data, &config(1)).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_edges_are_not_peaks() {
        let data = [5.0, 1.0, 2.0, 1.0, 6.0];
        assert_eq!(find_peaks(&data, &config(1)).unwrap(), vec![2]);
    }

    #[test]
    fn test_plateau_is_not_a_strict_maximum() {
        let data = [0.0, 2.0, 2.0, 0.0];
        assert!(find_peaks(&data, &config(1)).unwrap().is_empty());
    }

    #[test]
    fn test_monotonic_has_no_peaks() {
        let rising: Vec<f64> = (0..50).map(|i| i as f64 * 0.5).collect();
        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert!(find_peaks(&rising, &config(1)).unwrap().is_empty());
        assert!(find_peaks(&falling, &config(5)).unwrap().is_empty());
    }

    #[test]
    fn test_short_inputs() {
        assert!(find_peaks(&[], &config(1)).unwrap().is_empty());
        assert!(find_peaks(&[1.0, 2.0], &config(1)).unwrap().is_empty());
    }

    #[test]
    fn test_distance_keeps_highest() {
        let data = [0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0, 0.5, 0.0];
        // 3 at index 3 suppresses 1 and 2 (both within 3); 0.5 at 7 is 4 away
        assert_eq!(find_peaks(&data, &config(3)).unwrap(), vec![3, 7]);
    }

    #[test]
    fn test_distance_tie_keeps_later_index() {
        let data = [0.0, 2.0, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&data, &config(3)).unwrap(), vec![3]);

        // The later of two equal peaks still suppresses its lower neighbour
        let data = [0.0, 2.0, 0.0, 2.0, 0.0, 1.5, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&data, &config(3)).unwrap(), vec![3, 7]);
    }

    #[test]
    fn test_distance_property() {
        let data: Vec<f64> = (0..400)
            .map(|i| {
                let x = i as f64 * 0.05;
                x.sin() + 0.3 * (7.3 * x).sin() + 0.1 * (23.0 * x).cos()
            })
            .collect();
        for distance in [1, 2, 5, 13, 40] {
            let peaks = find_peaks(&data, &config(distance)).unwrap();
            for w in peaks.windows(2) {
                assert!(w[0] < w[1]);
                assert!(w[1] - w[0] >= distance);
            }
        }
    }

    #[test]
    fn test_prominence_values() {
        let data = [0.0, 5.0, 1.0, 3.0, 2.0, 6.0, 0.0];
        let result = peak_prominences(&data, &[1, 3, 5]).unwrap();

        // Peak 1: left base 0 (0.0), right runs to 5 (6.0 > 5) with min 1.0
        assert_abs_diff_eq!(result[0].prominence, 4.0);
        assert_eq!(result[0].left_base, 0);
        assert_eq!(result[0].right_base, 2);
        // Peak 3: stopped by 5.0 on the left and 6.0 on the right
        assert_abs_diff_eq!(result[1].prominence, 1.0);
        assert_eq!((result[1].left_base, result[1].right_base), (2, 4));
        // Peak 5: highest sample, bases at the signal ends
        assert_abs_diff_eq!(result[2].prominence, 6.0);
    }

    #[test]
    fn test_prominence_filter() {
        let data = [0.0, 5.0, 1.0, 3.0, 2.0, 6.0, 0.0];
        let cfg = config(1).with_min_prominence(2.0).unwrap();
        assert_eq!(find_peaks(&data, &cfg).unwrap(), vec![1, 5]);

        let detailed = detect_peaks(&data, &cfg).unwrap();
        assert_eq!(detailed[1].index, 5);
        assert_abs_diff_eq!(detailed[1].value, 6.0);
        assert_abs_diff_eq!(detailed[1].prominence, 6.0);
    }

    #[test]
    fn test_prominence_out_of_range() {
        let err = peak_prominences(&[1.0, 2.0], &[5]).unwrap_err();
        assert!(matches!(err, SegmentError::IndexOutOfRange { index: 5, len: 2 }));
    }

    #[test]
    fn test_invalid_config() {
        assert!(PeakConfig::new(0).is_err());
        assert!(config(1).with_min_prominence(-1.0).is_err());
        assert!(config(1).with_min_prominence(f64::NAN).is_err());

        let raw = PeakConfig {
            min_distance: 0,
            min_prominence: 0.0,
        };
        assert!(matches!(
            find_peaks(&[0.0, 1.0, 0.0], &raw),
            Err(SegmentError::InvalidParameter { name: "min_distance", .. })
        ));
    }
}
