//! GARCH (Generalized Autoregressive Conditional Heteroskedasticity) model.
//!
//! Used to describe how the variance of production changes over time.
//!
//! Model: y(t) = μ + ε(t), ε(t) = σ(t)·z(t), z ~ N(0, 1)
//!
//! σ²(t) = ω + Σ αᵢ·ε²(t-i) + Σ βⱼ·σ²(t-j)
//!
//! μ is the sample mean; ω, α and β are estimated by Gaussian maximum
//! likelihood with a multi-start Nelder-Mead search.

use crate::error::{DeclineError, Result};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Target standard deviation of the rescaled series in [`fit_garch_volatility`].
const TARGET_SCALE: f64 = 100.0;

/// α + β at or above this is rejected during estimation.
const MAX_PERSISTENCE: f64 = 0.9999;

/// GARCH(p,q) volatility model.
///
/// `p` lags of squared innovations (α) and `q` lags of conditional variance
/// (β).
///
/// # Example
/// ```
/// use wellcurve::models::garch::Garch;
///
/// let sim = Garch::garch_1_1()
///     .with_omega(0.2)
///     .with_alpha(vec![0.1])
///     .with_beta(vec![0.8])
///     .simulate(500, 7);
///
/// let mut model = Garch::garch_1_1();
/// model.fit(&sim).unwrap();
/// assert!(model.is_stationary());
/// let variance = model.forecast_variance(5).unwrap();
/// assert_eq!(variance.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Garch {
    p: usize,
    q: usize,
    omega: f64,
    alpha: Vec<f64>,
    beta: Vec<f64>,
    mean: f64,
    /// Innovations ε(t) = y(t) - μ of the fitted series.
    residuals: Option<Vec<f64>>,
    conditional_variance: Option<Vec<f64>>,
    log_likelihood: Option<f64>,
}

impl Garch {
    /// Create a GARCH(p,q) model with stationary starting parameters.
    pub fn new(p: usize, q: usize) -> Self {
        let p = p.max(1);
        let q = q.max(1);

        Self {
            p,
            q,
            omega: 0.01,
            alpha: vec![0.1 / p as f64; p],
            beta: vec![0.85 / q as f64; q],
            mean: 0.0,
            residuals: None,
            conditional_variance: None,
            log_likelihood: None,
        }
    }

    /// GARCH(1,1).
    pub fn garch_1_1() -> Self {
        Self::new(1, 1)
    }

    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega.max(1e-12);
        self
    }

    pub fn with_alpha(mut self, alpha: Vec<f64>) -> Self {
        self.alpha = alpha.into_iter().map(|a| a.max(0.0)).collect();
        if self.alpha.is_empty() {
            self.alpha.push(0.0);
        }
        self.p = self.alpha.len();
        self
    }

    pub fn with_beta(mut self, beta: Vec<f64>) -> Self {
        self.beta = beta.into_iter().map(|b| b.max(0.0)).collect();
        if self.beta.is_empty() {
            self.beta.push(0.0);
        }
        self.q = self.beta.len();
        self
    }

    /// Set the constant mean used by [`Garch::simulate`].
    pub fn with_mean(mut self, mean: f64) -> Self {
        self.mean = mean;
        self
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    pub fn alpha_params(&self) -> &[f64] {
        &self.alpha
    }

    pub fn beta_params(&self) -> &[f64] {
        &self.beta
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    pub fn conditional_variance(&self) -> Option<&[f64]> {
        self.conditional_variance.as_deref()
    }

    /// σ(t) of the fitted series.
    pub fn conditional_volatility(&self) -> Option<Vec<f64>> {
        self.conditional_variance
            .as_ref()
            .map(|v| v.iter().map(|s| s.sqrt()).collect())
    }

    /// Gaussian log-likelihood at the fitted parameters.
    pub fn log_likelihood(&self) -> Option<f64> {
        self.log_likelihood
    }

    pub fn is_fitted(&self) -> bool {
        self.conditional_variance.is_some()
    }

    /// α + β.
    pub fn persistence(&self) -> f64 {
        self.alpha.iter().sum::<f64>() + self.beta.iter().sum::<f64>()
    }

    pub fn is_stationary(&self) -> bool {
        self.persistence() < 1.0
    }

    /// Long-run variance ω / (1 - α - β), if stationary.
    pub fn unconditional_variance(&self) -> Option<f64> {
        self.is_stationary()
            .then(|| self.omega / (1.0 - self.persistence()))
    }

    /// σ² recursion. Pre-sample lags use the sample variance of `eps`.
    fn variance_path(eps: &[f64], omega: f64, alpha: &[f64], beta: &[f64]) -> Vec<f64> {
        let n = eps.len();
        let backcast = eps.iter().map(|e| e * e).sum::<f64>() / n.max(1) as f64;
        let mut sigma2 = Vec::with_capacity(n);

        for t in 0..n {
            let arch: f64 = alpha
                .iter()
                .enumerate()
                .map(|(i, a)| a * t.checked_sub(i + 1).map_or(backcast, |k| eps[k] * eps[k]))
                .sum();
            let garch: f64 = beta
                .iter()
                .enumerate()
                .map(|(j, b)| b * t.checked_sub(j + 1).map_or(backcast, |k| sigma2[k]))
                .sum();
            sigma2.push(omega + arch + garch);
        }

        sigma2
    }

    /// Negative Gaussian log-likelihood of `eps` given σ².
    fn neg_log_likelihood(eps: &[f64], sigma2: &[f64]) -> f64 {
        let ln_2pi = (2.0 * std::f64::consts::PI).ln();
        eps.iter()
            .zip(sigma2)
            .map(|(e, s)| 0.5 * (ln_2pi + s.ln() + e * e / s))
            .sum()
    }

    fn starting_points(&self, variance: f64) -> Vec<Vec<f64>> {
        let (p, q) = (self.p, self.q);
        let user = std::iter::once(self.omega)
            .chain(self.alpha.iter().copied())
            .chain(self.beta.iter().copied())
            .collect::<Vec<f64>>();

        let mut starts = vec![user];
        for (a, b) in [(0.05, 0.90), (0.10, 0.80), (0.20, 0.50), (0.02, 0.02)] {
            let omega = variance * (1.0 - a - b);
            starts.push(
                std::iter::once(omega)
                    .chain(std::iter::repeat(a / p as f64).take(p))
                    .chain(std::iter::repeat(b / q as f64).take(q))
                    .collect(),
            );
        }
        starts
    }

    /// Estimate μ, ω, α and β from `values`.
    pub fn fit(&mut self, values: &[f64]) -> Result<()> {
        let needed = self.p + self.q + 10;
        if values.len() < needed {
            return Err(DeclineError::InsufficientData {
                needed,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DeclineError::NumericDegeneracy(
                "series contains non-finite values".to_string(),
            ));
        }

        let mean = stats::mean(values);
        let eps: Vec<f64> = values.iter().map(|y| y - mean).collect();
        let variance = eps.iter().map(|e| e * e).sum::<f64>() / eps.len() as f64;
        if variance <= 0.0 || !variance.is_finite() {
            return Err(DeclineError::NumericDegeneracy(
                "series has zero variance".to_string(),
            ));
        }

        let (p, q) = (self.p, self.q);
        let bounds: Vec<(f64, f64)> = std::iter::once((variance * 1e-8, variance * 10.0))
            .chain(std::iter::repeat((0.0, 0.999)).take(p + q))
            .collect();

        let objective = |params: &[f64]| -> f64 {
            let (omega, rest) = (params[0], &params[1..]);
            let (alpha, beta) = rest.split_at(p);
            let persistence: f64 = rest.iter().sum();
            if omega <= 0.0 || persistence >= MAX_PERSISTENCE {
                return f64::INFINITY;
            }
            let sigma2 = Self::variance_path(&eps, omega, alpha, beta);
            let nll = Self::neg_log_likelihood(&eps, &sigma2);
            if nll.is_finite() {
                nll
            } else {
                f64::INFINITY
            }
        };

        let config = NelderMeadConfig::default().max_iter(2000).tolerance(1e-9);
        let best = self
            .starting_points(variance)
            .into_iter()
            .map(|start| nelder_mead(&objective, &start, Some(&bounds), config.clone()))
            .filter(|r| r.optimal_value.is_finite())
            .min_by(|a, b| a.optimal_value.total_cmp(&b.optimal_value))
            .ok_or_else(|| {
                DeclineError::FitDivergence("no starting point reached a finite likelihood".to_string())
            })?;

        let params = best.optimal_point;
        self.omega = params[0];
        self.alpha = params[1..=p].to_vec();
        self.beta = params[p + 1..].to_vec();
        self.mean = mean;
        self.conditional_variance = Some(Self::variance_path(&eps, self.omega, &self.alpha, &self.beta));
        self.log_likelihood = Some(-best.optimal_value);
        self.residuals = Some(eps);

        log::debug!(
            "GARCH({p},{q}) fit: omega {:.4e}, alpha {:?}, beta {:?}, loglik {:.3}",
            self.omega,
            self.alpha,
            self.beta,
            -best.optimal_value
        );

        Ok(())
    }

    /// Analytical variance forecast σ²(T+h) for h = 1..=horizon.
    pub fn forecast_variance(&self, horizon: usize) -> Result<Vec<f64>> {
        let (eps, sigma2) = match (&self.residuals, &self.conditional_variance) {
            (Some(e), Some(s)) => (e, s),
            _ => {
                return Err(DeclineError::InvalidParameter(
                    "model must be fitted before forecasting".to_string(),
                ))
            }
        };

        // Squared innovations beyond the sample are replaced by their
        // expectation σ².
        let mut eps2: Vec<f64> = eps.iter().map(|e| e * e).collect();
        let mut var = sigma2.clone();
        let mut forecast = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let t = var.len();
            let arch: f64 = self
                .alpha
                .iter()
                .enumerate()
                .map(|(i, a)| t.checked_sub(i + 1).map_or(0.0, |k| a * eps2[k]))
                .sum();
            let garch: f64 = self
                .beta
                .iter()
                .enumerate()
                .map(|(j, b)| t.checked_sub(j + 1).map_or(0.0, |k| b * var[k]))
                .sum();
            let next = self.omega + arch + garch;
            eps2.push(next);
            var.push(next);
            forecast.push(next);
        }

        Ok(forecast)
    }

    /// Draw `n` observations from the model with a seeded generator.
    ///
    /// The variance recursion starts at the unconditional variance (or ω when
    /// the parameters are not stationary).
    pub fn simulate(&self, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = self.unconditional_variance().unwrap_or(self.omega);
        let mut eps: Vec<f64> = Vec::with_capacity(n);
        let mut sigma2: Vec<f64> = Vec::with_capacity(n);

        for t in 0..n {
            let arch: f64 = self
                .alpha
                .iter()
                .enumerate()
                .map(|(i, a)| a * t.checked_sub(i + 1).map_or(start, |k| eps[k] * eps[k]))
                .sum();
            let garch: f64 = self
                .beta
                .iter()
                .enumerate()
                .map(|(j, b)| b * t.checked_sub(j + 1).map_or(start, |k| sigma2[k]))
                .sum();
            let s2 = self.omega + arch + garch;

            // Box-Muller
            let u1: f64 = 1.0 - rng.gen::<f64>();
            let u2: f64 = rng.gen();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();

            sigma2.push(s2);
            eps.push(z * s2.sqrt());
        }

        eps.into_iter().map(|e| self.mean + e).collect()
    }
}

impl Default for Garch {
    fn default() -> Self {
        Self::garch_1_1()
    }
}

/// Conditional volatility of a production series from a GARCH(1,1) fit.
///
/// The series is rescaled to a standard deviation of 100 before fitting and
/// the volatility is scaled back to the original units. Returns `None` (and
/// logs why) for short, constant or non-finite input, or when the fit fails.
pub fn fit_garch_volatility(series: &[f64]) -> Option<Vec<f64>> {
    let sd = stats::std_dev(series);
    if !sd.is_finite() || sd <= 0.0 {
        log::warn!("GARCH volatility skipped: standard deviation is {sd}");
        return None;
    }
    let scale = TARGET_SCALE / sd;
    let scaled: Vec<f64> = series.iter().map(|v| v * scale).collect();

    let mut model = Garch::garch_1_1();
    match model.fit(&scaled) {
        Ok(()) => model
            .conditional_volatility()
            .map(|vol| vol.into_iter().map(|v| v / scale).collect()),
        Err(err) => {
            log::warn!("GARCH volatility fit failed: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_model() -> Garch {
        Garch::garch_1_1()
            .with_omega(0.5)
            .with_alpha(vec![0.1])
            .with_beta(vec![0.8])
    }

    #[test]
    fn builder_and_stationarity() {
        let model = reference_model();
        assert_relative_eq!(model.omega(), 0.5);
        assert_relative_eq!(model.persistence(), 0.9, epsilon = 1e-12);
        assert!(model.is_stationary());
        assert_relative_eq!(model.unconditional_variance().unwrap(), 5.0, epsilon = 1e-9);

        let explosive = Garch::new(1, 1).with_alpha(vec![0.5]).with_beta(vec![0.6]);
        assert!(!explosive.is_stationary());
        assert!(explosive.unconditional_variance().is_none());
    }

    #[test]
    fn empty_coefficients_keep_one_lag() {
        let model = Garch::new(1, 1).with_alpha(Vec::new());
        assert_eq!(model.alpha_params(), &[0.0]);
        assert_eq!(Garch::default().alpha_params().len(), 1);
    }

    #[test]
    fn simulate_is_deterministic() {
        let model = reference_model();
        assert_eq!(model.simulate(200, 3), model.simulate(200, 3));
        assert_ne!(model.simulate(200, 3), model.simulate(200, 4));
    }

    #[test]
    fn fit_recovers_persistence() {
        let data = reference_model().with_mean(20.0).simulate(3000, 11);
        let mut model = Garch::garch_1_1();
        model.fit(&data).unwrap();

        assert!(model.is_fitted());
        assert!(model.is_stationary());
        assert!((model.persistence() - 0.9).abs() < 0.1, "persistence {}", model.persistence());
        assert_relative_eq!(model.mean(), 20.0, epsilon = 0.5);
        assert!(model.log_likelihood().unwrap().is_finite());
    }

    #[test]
    fn conditional_variance_is_positive() {
        let data = reference_model().simulate(300, 5);
        let mut model = Garch::garch_1_1();
        model.fit(&data).unwrap();

        let var = model.conditional_variance().unwrap();
        assert_eq!(var.len(), 300);
        assert!(var.iter().all(|v| *v > 0.0));
        assert_eq!(model.residuals().unwrap().len(), 300);
    }

    #[test]
    fn variance_forecast_converges_to_long_run() {
        let data = reference_model().simulate(1000, 9);
        let mut model = Garch::garch_1_1();
        model.fit(&data).unwrap();

        let forecast = model.forecast_variance(2000).unwrap();
        let long_run = model.unconditional_variance().unwrap();
        assert_eq!(forecast.len(), 2000);
        assert_relative_eq!(*forecast.last().unwrap(), long_run, max_relative = 1e-3);
        assert!(model.forecast_variance(0).unwrap().is_empty());
    }

    #[test]
    fn higher_order_fit() {
        let data = reference_model().simulate(600, 21);
        let mut model = Garch::new(2, 2);
        model.fit(&data).unwrap();

        assert_eq!(model.alpha_params().len(), 2);
        assert_eq!(model.beta_params().len(), 2);
        assert_eq!(model.forecast_variance(10).unwrap().len(), 10);
    }

    #[test]
    fn fit_errors() {
        let mut model = Garch::garch_1_1();
        assert!(matches!(
            model.fit(&[1.0; 5]),
            Err(DeclineError::InsufficientData { needed: 12, got: 5 })
        ));
        assert!(matches!(
            model.fit(&[3.0; 50]),
            Err(DeclineError::NumericDegeneracy(_))
        ));

        let mut with_nan = reference_model().simulate(50, 1);
        with_nan[10] = f64::NAN;
        assert!(matches!(
            model.fit(&with_nan),
            Err(DeclineError::NumericDegeneracy(_))
        ));
    }

    #[test]
    fn forecast_requires_fit() {
        assert!(Garch::garch_1_1().forecast_variance(3).is_err());
    }

    #[test]
    fn volatility_in_original_units() {
        let data = reference_model().with_mean(500.0).simulate(400, 13);
        let vol = fit_garch_volatility(&data).unwrap();
        assert_eq!(vol.len(), data.len());
        assert!(vol.iter().all(|v| v.is_finite() && *v > 0.0));

        let scaled: Vec<f64> = data.iter().map(|v| v * 10.0).collect();
        let vol_scaled = fit_garch_volatility(&scaled).unwrap();
        for (a, b) in vol.iter().zip(&vol_scaled) {
            assert_relative_eq!(b / a, 10.0, max_relative = 1e-2);
        }
    }

    #[test]
    fn volatility_of_constant_series_is_none() {
        assert!(fit_garch_volatility(&[100.0; 40]).is_none());
        assert!(fit_garch_volatility(&[1.0]).is_none());
        assert!(fit_garch_volatility(&[1.0, 2.0, 3.0]).is_none());
    }
}
