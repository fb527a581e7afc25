//! Numerical utilities: optimization, curve fitting and fit metrics.

pub mod curve_fit;
pub mod metrics;
pub mod optimization;
pub mod stats;

pub use curve_fit::{curve_fit, CurveFitConfig, CurveFitResult};
pub use metrics::{fit_metrics, mae, r_squared, rmse, FitMetrics};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
