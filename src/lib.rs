//! # wellcurve
//!
//! Decline-curve analysis for oil-well production series.
//!
//! Provides hyperbolic, power-law and stretched-exponential decline fits,
//! EUR integration, GARCH volatility and log-gradient break detection.
//! Every routine is a stateless function over in-memory data.

pub mod changepoint;
pub mod core;
pub mod error;
pub mod models;
pub mod transform;
pub mod utils;

pub use error::{DeclineError, Result};

pub mod prelude {
    pub use crate::changepoint::{analyze_breaks, detect_breaks, BreakAnalysis, BreakConfig};
    pub use crate::core::ProductionSeries;
    pub use crate::error::{DeclineError, Result};
    pub use crate::models::{
        calculate_eur, fit_decline, fit_garch_volatility, DeclineFit, DeclineModel, Garch,
    };
}
