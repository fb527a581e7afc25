//! Production models: decline curves, EUR and volatility.

pub mod decline;
pub mod eur;
pub mod garch;

pub use decline::{
    fit_decline, fit_decline_with, fit_series, hyperbolic_decline, power_law_decline,
    sepd_decline, DeclineFit, DeclineModel,
};
pub use eur::{calculate_eur, calculate_eur_default, DAYS_PER_MONTH, DEFAULT_Q_LIMIT};
pub use garch::{fit_garch_volatility, Garch};
