//! Error types for the imu-motion library

use thiserror::Error;

/// Failures surfaced by filter construction and the motion pipeline.
///
/// Degenerate samples (zero-length accelerometer or magnetometer vectors)
/// are not errors: the update is skipped and the previous state returned,
/// matching sensor-dropout behavior in real streams.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Sample frequency was zero, negative, or non-finite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    /// A feedback gain was negative or non-finite.
    #[error("{name} gain must be non-negative and finite, got {value}")]
    InvalidGain {
        /// Which gain was rejected ("proportional" or "integral")
        name: &'static str,
        /// The offending value
        value: f64,
    },

    /// High-pass cutoff outside (0, Nyquist).
    #[error("cutoff frequency {cutoff} Hz must lie in (0, {nyquist}) Hz")]
    InvalidCutoff {
        /// Requested corner frequency in Hz
        cutoff: f64,
        /// Nyquist frequency for the configured sample rate
        nyquist: f64,
    },

    /// High-pass filter order below 1.
    #[error("high-pass filter order must be at least 1, got {0}")]
    InvalidFilterOrder(usize),

    /// The quaternion state was driven to a zero or non-finite norm.
    ///
    /// This indicates unrecoverable numerical corruption (NaN/Inf in the
    /// state); the filter refuses to continue producing meaningless output.
    #[error("orientation state diverged: quaternion norm is zero or non-finite")]
    NumericalDivergence,

    /// Rotation and acceleration sequences differ in length.
    #[error("sequence length mismatch: {rotations} rotations vs {accelerations} accelerations")]
    LengthMismatch {
        /// Number of rotation matrices supplied
        rotations: usize,
        /// Number of acceleration samples supplied
        accelerations: usize,
    },

    /// Input series shorter than the zero-phase filter's edge padding.
    #[error("series of {len} samples is too short for zero-phase filtering (needs more than {padlen})")]
    SeriesTooShort {
        /// Length of the supplied series
        len: usize,
        /// Required padding per edge
        padlen: usize,
    },
}
