/// Crate-level error type for the tremor onset detection library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A required dimension is zero or invalid.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// Signal data is empty when a non-empty signal was required.
    #[error("signal data is empty")]
    EmptySignal,

    /// The low-pass cutoff does not normalize into the open interval (0, 1).
    #[error("invalid cutoff frequency {cutoff_hz} Hz for sample rate {sample_rate_hz} Hz")]
    InvalidCutoff { cutoff_hz: f64, sample_rate_hz: f64 },

    /// Signal is too short for forward-backward filtering with edge padding.
    #[error("signal of length {len} is too short for filtering (needs more than {min} samples)")]
    SignalTooShort { len: usize, min: usize },

    /// Landscape tag with no cutoff mapping.
    #[error("unknown landscape `{0}` (expected `lunar` or `mars`)")]
    UnknownLandscape(String),

    /// Trace has too few samples to estimate a sample rate.
    #[error("trace `{id}` has insufficient data ({len} samples)")]
    InsufficientData { id: String, len: usize },

    /// Trace time axis and sample vector disagree in length.
    #[error("trace `{id}` has {times} time stamps but {samples} samples")]
    LengthMismatch {
        id: String,
        times: usize,
        samples: usize,
    },

    /// A result row lacks a field the metrics require.
    #[error("result `{id}` is missing `{field}`")]
    MissingField { id: String, field: &'static str },

    /// Metrics were requested over an empty result table.
    #[error("no results to compute metrics over")]
    EmptyResults,
}

/// Convenience Result type for tremor operations.
pub type Result<T> = std::result::Result<T, Error>;
