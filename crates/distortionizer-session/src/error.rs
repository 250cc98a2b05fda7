use distortionizer_core::{Channel, Eye, RadialCoefficients};
use thiserror::Error;

/// Errors reported by [`CalibrationSession`](crate::CalibrationSession)
/// operations and command parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// A batched coefficient update would break the configured magnitude
    /// ordering. The whole batch is rejected and the bank is unchanged.
    #[error(
        "coefficient ordering violated for {eye} eye, {channel} channel: \
         k = [{}, {}, {}]",
        .coefficients.k1,
        .coefficients.k2,
        .coefficients.k3
    )]
    CoefficientOrderingViolation {
        eye: Eye,
        channel: Channel,
        coefficients: RadialCoefficients,
    },

    /// A calibration record handed to the session holds a value that
    /// cannot be used (NaN or infinite).
    #[error("malformed calibration record: invalid value in `{field}`")]
    MalformedRecord { field: String },

    /// Textual command could not be parsed.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
