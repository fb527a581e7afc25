//! Error types for the wellcurve library.

use thiserror::Error;

/// Result type alias for wellcurve operations.
pub type Result<T> = std::result::Result<T, DeclineError>;

/// Errors that can occur while preparing or fitting production data.
///
/// The analytical entry points (`detect_breaks`, `fit_decline`,
/// `calculate_eur`, `fit_garch_volatility`) never return these; they log the
/// error and hand back an empty or "no fit" value instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeclineError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The optimizer did not reach a finite optimum.
    #[error("fit diverged: {0}")]
    FitDivergence(String),

    /// A log, division or power hit a degenerate value.
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}
