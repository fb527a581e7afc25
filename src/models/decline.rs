//! Decline-curve models and least-squares fitting.
//!
//! Three rate formulas are provided:
//!
//! - **Hyperbolic** (Arps): `q = qi / (1 + b·di·t)^(1/b)`, with the
//!   exponential limit `qi·exp(-di·t)` as `b → 0`
//! - **Power law**: `q = qi·(t + 1)^(-n)`, for declines whose loss ratio
//!   changes with time
//! - **Stretched exponential** (SEPD): `q = qi·exp(-(t/tau)^n)`, for
//!   transient early-life flow
//!
//! `t` is in whatever unit the caller uses for `x` (days, months); `di` and
//! `tau` follow that unit.

use crate::core::ProductionSeries;
use crate::models::eur::{calculate_eur, DEFAULT_Q_LIMIT};
use crate::utils::curve_fit::{curve_fit, CurveFitConfig};
use crate::utils::metrics::r_squared;
use crate::utils::stats::finite_pairs;

/// Below this `b` the hyperbolic formula is replaced by its exponential limit.
const EXPONENTIAL_B: f64 = 1e-8;

/// Smallest admissible `tau`, keeping `t / tau` finite.
const MIN_TAU: f64 = 1e-6;

/// Arps hyperbolic decline rate.
pub fn hyperbolic_decline(t: f64, qi: f64, di: f64, b: f64) -> f64 {
    if b.abs() < EXPONENTIAL_B {
        return qi * (-di * t).exp();
    }
    qi / (1.0 + b * di * t).powf(1.0 / b)
}

/// Power-law decline rate `qi·(t + 1)^(-n)`.
pub fn power_law_decline(t: f64, qi: f64, n: f64) -> f64 {
    qi * (t + 1.0).powf(-n)
}

/// Stretched-exponential decline rate `qi·exp(-(t/tau)^n)`.
pub fn sepd_decline(t: f64, qi: f64, tau: f64, n: f64) -> f64 {
    qi * (-(t / tau).powf(n)).exp()
}

/// Decline model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclineModel {
    /// Parameters `[qi, di, b]`
    Hyperbolic,
    /// Parameters `[qi, n]`
    PowerLaw,
    /// Parameters `[qi, tau, n]`
    StretchedExponential,
}

impl DeclineModel {
    pub fn name(&self) -> &'static str {
        match self {
            DeclineModel::Hyperbolic => "Hyperbolic",
            DeclineModel::PowerLaw => "PowerLaw",
            DeclineModel::StretchedExponential => "SEPD",
        }
    }

    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            DeclineModel::Hyperbolic => &["qi", "di", "b"],
            DeclineModel::PowerLaw => &["qi", "n"],
            DeclineModel::StretchedExponential => &["qi", "tau", "n"],
        }
    }

    pub fn n_params(&self) -> usize {
        self.param_names().len()
    }

    /// Evaluate the rate at `t`. `params` must hold `n_params()` values.
    pub fn rate(&self, t: f64, params: &[f64]) -> f64 {
        match self {
            DeclineModel::Hyperbolic => hyperbolic_decline(t, params[0], params[1], params[2]),
            DeclineModel::PowerLaw => power_law_decline(t, params[0], params[1]),
            DeclineModel::StretchedExponential => {
                sepd_decline(t, params[0], params[1], params[2])
            }
        }
    }

    /// Starting point for the optimizer given the first observed rate.
    pub fn initial_guess(&self, y0: f64) -> Vec<f64> {
        match self {
            DeclineModel::Hyperbolic => vec![y0, 0.1, 0.5],
            DeclineModel::PowerLaw => vec![y0, 0.5],
            DeclineModel::StretchedExponential => vec![y0, 100.0, 0.5],
        }
    }

    /// Box constraints given the first observed rate; `qi` may reach 1.5·y0.
    pub fn bounds(&self, y0: f64) -> Vec<(f64, f64)> {
        let qi = (0.0, y0 * 1.5);
        match self {
            DeclineModel::Hyperbolic => vec![qi, (0.0, 10.0), (0.0, 2.0)],
            DeclineModel::PowerLaw => vec![qi, (0.0, 2.0)],
            DeclineModel::StretchedExponential => vec![qi, (MIN_TAU, 10_000.0), (0.0, 1.0)],
        }
    }
}

impl std::fmt::Display for DeclineModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of [`fit_decline`].
///
/// A failed fit has no parameters, no fitted values and an R² of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclineFit {
    pub model: DeclineModel,
    /// Best-fit parameters, in `model.param_names()` order
    pub params: Option<Vec<f64>>,
    /// Coefficient of determination over the finite observations
    pub r_squared: f64,
    /// Model rate at every input `x`
    pub fitted: Option<Vec<f64>>,
}

impl DeclineFit {
    /// The "no fit" sentinel.
    pub fn no_fit(model: DeclineModel) -> Self {
        Self {
            model,
            params: None,
            r_squared: 0.0,
            fitted: None,
        }
    }

    pub fn is_fit(&self) -> bool {
        self.params.is_some()
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<f64> {
        let idx = self.model.param_names().iter().position(|&p| p == name)?;
        self.params.as_ref().map(|p| p[idx])
    }

    /// Rate predicted at `t`.
    pub fn predict(&self, t: f64) -> Option<f64> {
        self.params.as_ref().map(|p| self.model.rate(t, p))
    }

    /// Rates predicted over `t`.
    pub fn predict_many(&self, t: &[f64]) -> Option<Vec<f64>> {
        let params = self.params.as_ref()?;
        Some(t.iter().map(|&ti| self.model.rate(ti, params)).collect())
    }

    /// EUR of a hyperbolic fit down to `q_limit`; `None` for other models or
    /// a failed fit.
    pub fn eur(&self, q_limit: f64) -> Option<f64> {
        match (self.model, self.params.as_deref()) {
            (DeclineModel::Hyperbolic, Some(&[qi, di, b])) => calculate_eur(qi, di, b, q_limit),
            _ => None,
        }
    }

    /// EUR with the default economic limit.
    pub fn eur_default(&self) -> Option<f64> {
        self.eur(DEFAULT_Q_LIMIT)
    }
}

/// Fit a decline model to `(x, y)` with default optimizer settings.
///
/// Non-finite pairs are dropped first. Any failure (too few points, a
/// non-positive first rate, a diverging optimizer) is logged and returned as
/// [`DeclineFit::no_fit`].
///
/// # Example
/// ```
/// use wellcurve::models::decline::{fit_decline, power_law_decline, DeclineModel};
///
/// let x: Vec<f64> = (0..60).map(|i| i as f64).collect();
/// let y: Vec<f64> = x.iter().map(|&t| power_law_decline(t, 800.0, 0.7)).collect();
///
/// let fit = fit_decline(DeclineModel::PowerLaw, &x, &y);
/// assert!(fit.r_squared > 0.99);
/// ```
pub fn fit_decline(model: DeclineModel, x: &[f64], y: &[f64]) -> DeclineFit {
    fit_decline_with(model, x, y, &CurveFitConfig::default())
}

/// Fit a decline model with explicit optimizer settings.
pub fn fit_decline_with(
    model: DeclineModel,
    x: &[f64],
    y: &[f64],
    config: &CurveFitConfig,
) -> DeclineFit {
    if x.len() != y.len() {
        log::warn!(
            "{model} fit skipped: {} x values vs {} y values",
            x.len(),
            y.len()
        );
        return DeclineFit::no_fit(model);
    }

    let (xs, ys) = finite_pairs(x, y);
    let needed = model.n_params() + 1;
    if xs.len() < needed {
        log::warn!(
            "{model} fit skipped: need at least {needed} points, got {}",
            xs.len()
        );
        return DeclineFit::no_fit(model);
    }

    let y0 = ys[0];
    if y0 <= 0.0 {
        log::warn!("{model} fit skipped: first rate {y0} is not positive");
        return DeclineFit::no_fit(model);
    }

    let result = curve_fit(
        |t, p| model.rate(t, p),
        &xs,
        &ys,
        &model.initial_guess(y0),
        &model.bounds(y0),
        config,
    );

    match result {
        Ok(fit) => {
            let on_data: Vec<f64> = xs.iter().map(|&t| model.rate(t, &fit.params)).collect();
            let score = r_squared(&ys, &on_data);
            let fitted = x.iter().map(|&t| model.rate(t, &fit.params)).collect();
            log::debug!(
                "{model} fit: params {:?}, R² {score:.4}, {} iterations",
                fit.params,
                fit.iterations
            );
            DeclineFit {
                model,
                params: Some(fit.params),
                r_squared: score,
                fitted: Some(fitted),
            }
        }
        Err(err) => {
            log::warn!("{model} fit failed: {err}");
            DeclineFit::no_fit(model)
        }
    }
}

/// Fit a decline model against days elapsed since the first observation.
pub fn fit_series(model: DeclineModel, series: &ProductionSeries) -> DeclineFit {
    fit_decline(model, &series.elapsed_days(), series.values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * step).collect()
    }

    #[test]
    fn formulas_at_origin() {
        assert_relative_eq!(hyperbolic_decline(0.0, 500.0, 0.1, 0.5), 500.0);
        assert_relative_eq!(power_law_decline(0.0, 500.0, 0.8), 500.0);
        assert_relative_eq!(sepd_decline(0.0, 500.0, 30.0, 0.5), 500.0);
    }

    #[test]
    fn hyperbolic_reduces_to_exponential() {
        let exact = 100.0 * (-0.05_f64 * 10.0).exp();
        assert_relative_eq!(hyperbolic_decline(10.0, 100.0, 0.05, 0.0), exact);
        assert_relative_eq!(
            hyperbolic_decline(10.0, 100.0, 0.05, 1e-6),
            exact,
            max_relative = 1e-4
        );
    }

    #[test]
    fn hyperbolic_harmonic_case() {
        // b = 1 gives qi / (1 + di·t)
        assert_relative_eq!(
            hyperbolic_decline(4.0, 100.0, 0.25, 1.0),
            50.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn sepd_at_tau() {
        assert_relative_eq!(
            sepd_decline(30.0, 100.0, 30.0, 0.7),
            100.0 * (-1.0_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn model_metadata_is_consistent() {
        for model in [
            DeclineModel::Hyperbolic,
            DeclineModel::PowerLaw,
            DeclineModel::StretchedExponential,
        ] {
            assert_eq!(model.initial_guess(100.0).len(), model.n_params());
            assert_eq!(model.bounds(100.0).len(), model.n_params());
            for (p, (lo, hi)) in model.initial_guess(100.0).iter().zip(model.bounds(100.0)) {
                assert!(*p >= lo && *p <= hi, "{model}: {p} outside [{lo}, {hi}]");
            }
        }
        assert_eq!(DeclineModel::StretchedExponential.to_string(), "SEPD");
    }

    #[test]
    fn fit_power_law() {
        let x = grid(80, 1.0);
        let y: Vec<f64> = x.iter().map(|&t| power_law_decline(t, 800.0, 0.7)).collect();

        let fit = fit_decline(DeclineModel::PowerLaw, &x, &y);

        assert!(fit.is_fit());
        assert!(fit.r_squared > 0.999);
        assert_relative_eq!(fit.param("qi").unwrap(), 800.0, max_relative = 1e-2);
        assert_relative_eq!(fit.param("n").unwrap(), 0.7, max_relative = 1e-2);
    }

    #[test]
    fn fit_sepd() {
        let x = grid(73, 5.0);
        let y: Vec<f64> = x.iter().map(|&t| sepd_decline(t, 1000.0, 150.0, 0.6)).collect();

        let fit = fit_decline(DeclineModel::StretchedExponential, &x, &y);

        assert!(fit.is_fit());
        assert!(fit.r_squared > 0.999);
        assert_relative_eq!(fit.param("qi").unwrap(), 1000.0, max_relative = 2e-2);
        assert_relative_eq!(fit.param("tau").unwrap(), 150.0, max_relative = 5e-2);
        assert_relative_eq!(fit.param("n").unwrap(), 0.6, max_relative = 5e-2);
    }

    #[test]
    fn fit_hyperbolic_and_eur() {
        let x = grid(60, 1.0);
        let y: Vec<f64> = x
            .iter()
            .map(|&t| hyperbolic_decline(t, 1200.0, 0.08, 0.8))
            .collect();

        let fit = fit_decline(DeclineModel::Hyperbolic, &x, &y);

        assert!(fit.is_fit());
        assert!(fit.r_squared > 0.999);
        assert!(fit.eur_default().unwrap() > 0.0);
        assert!(fit.predict(0.0).unwrap() > 1000.0);
    }

    #[test]
    fn fitted_values_align_with_input() {
        let x = vec![0.0, 1.0, f64::NAN, 3.0, 4.0, 5.0];
        let y = vec![100.0, 80.0, 70.0, f64::NAN, 55.0, 50.0];

        let fit = fit_decline(DeclineModel::PowerLaw, &x, &y);

        let fitted = fit.fitted.unwrap();
        assert_eq!(fitted.len(), x.len());
        assert!(fitted[2].is_nan());
        assert!(fitted[3].is_finite());
    }

    #[test]
    fn too_few_points_is_no_fit() {
        let fit = fit_decline(DeclineModel::StretchedExponential, &[0.0, 1.0, 2.0], &[10.0, 9.0, 8.0]);

        assert!(!fit.is_fit());
        assert_eq!(fit.r_squared, 0.0);
        assert!(fit.fitted.is_none());
        assert!(fit.predict(1.0).is_none());
    }

    #[test]
    fn non_positive_first_rate_is_no_fit() {
        let fit = fit_decline(DeclineModel::PowerLaw, &[0.0, 1.0, 2.0, 3.0], &[0.0, 5.0, 4.0, 3.0]);
        assert_eq!(fit, DeclineFit::no_fit(DeclineModel::PowerLaw));
    }

    #[test]
    fn mismatched_lengths_is_no_fit() {
        let fit = fit_decline(DeclineModel::PowerLaw, &[0.0, 1.0], &[1.0]);
        assert!(!fit.is_fit());
    }

    #[test]
    fn eur_only_for_hyperbolic() {
        let x = grid(40, 1.0);
        let y: Vec<f64> = x.iter().map(|&t| power_law_decline(t, 500.0, 0.5)).collect();
        let fit = fit_decline(DeclineModel::PowerLaw, &x, &y);
        assert!(fit.is_fit());
        assert!(fit.eur_default().is_none());
    }

    #[test]
    fn fit_from_series() {
        let start = chrono::NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let values: Vec<f64> = (0..90).map(|t| power_law_decline(t as f64, 300.0, 0.4)).collect();
        let series = ProductionSeries::daily(start, values);

        let fit = fit_series(DeclineModel::PowerLaw, &series);
        assert!(fit.r_squared > 0.999);
    }
}
