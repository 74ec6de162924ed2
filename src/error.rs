use thiserror::Error;

/// Errors produced while smoothing, detecting peaks or building pattern boundaries.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// A window, polynomial order, distance or prominence setting is out of range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Empty or too-short input, or no peaks where boundaries are requested
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// An index computed while mapping a segment back onto the signal fell outside it
    #[error("index {index} out of range for signal of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Position/intensity columns that cannot form a signal
    #[error("malformed signal: {0}")]
    MalformedSignal(String),

    /// Least-squares system could not be solved
    #[error("computation error: {0}")]
    ComputationError(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SegmentError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for segmentation operations
pub type Result<T> = std::result::Result<T, SegmentError>;
