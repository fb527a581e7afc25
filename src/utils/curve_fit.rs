//! Bounded nonlinear least squares.
//!
//! Fits `y ≈ f(x, params)` by minimizing the sum of squared residuals with
//! the bounded Nelder-Mead simplex. The objective is divided by `Σy²`, which
//! makes the convergence tolerance independent of the production units.

use crate::error::{DeclineError, Result};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// Configuration for [`curve_fit`].
#[derive(Debug, Clone)]
pub struct CurveFitConfig {
    /// Simplex settings for each run
    pub optimizer: NelderMeadConfig,
    /// Extra runs restarted from the previous optimum
    pub restarts: usize,
}

impl Default for CurveFitConfig {
    fn default() -> Self {
        Self {
            optimizer: NelderMeadConfig::default().max_iter(4000).tolerance(1e-14),
            restarts: 2,
        }
    }
}

impl CurveFitConfig {
    pub fn optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }
}

/// Result of a successful [`curve_fit`].
#[derive(Debug, Clone)]
pub struct CurveFitResult {
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`
    pub sse: f64,
    /// Whether the final simplex run met its tolerance
    pub converged: bool,
    /// Total simplex iterations across all runs
    pub iterations: usize,
}

fn sum_squared_residuals<F>(f: &F, x: &[f64], y: &[f64], params: &[f64]) -> f64
where
    F: Fn(f64, &[f64]) -> f64,
{
    let mut sse = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let r = f(xi, params) - yi;
        if !r.is_finite() {
            return f64::INFINITY;
        }
        sse += r * r;
    }
    sse
}

/// Fit `f` to the observations `(x, y)`.
///
/// # Arguments
/// * `f` - Model `f(x, params)`
/// * `x`, `y` - Observations of equal length
/// * `p0` - Initial parameters
/// * `bounds` - `(lower, upper)` per parameter
/// * `config` - Optimizer settings
///
/// # Errors
/// `DimensionMismatch` for unequal inputs or bounds, `InsufficientData` when
/// there are fewer observations than parameters, `FitDivergence` when no
/// finite optimum is found.
///
/// # Example
/// ```
/// use wellcurve::utils::curve_fit::{curve_fit, CurveFitConfig};
///
/// let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
/// let y: Vec<f64> = x.iter().map(|t| 3.0 * t + 1.0).collect();
///
/// let fit = curve_fit(
///     |t, p| p[0] * t + p[1],
///     &x,
///     &y,
///     &[1.0, 0.0],
///     &[(-10.0, 10.0), (-10.0, 10.0)],
///     &CurveFitConfig::default(),
/// )
/// .unwrap();
///
/// assert!((fit.params[0] - 3.0).abs() < 1e-3);
/// assert!((fit.params[1] - 1.0).abs() < 1e-2);
/// ```
pub fn curve_fit<F>(
    f: F,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    bounds: &[(f64, f64)],
    config: &CurveFitConfig,
) -> Result<CurveFitResult>
where
    F: Fn(f64, &[f64]) -> f64,
{
    if x.len() != y.len() {
        return Err(DeclineError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    if bounds.len() != p0.len() {
        return Err(DeclineError::DimensionMismatch {
            expected: p0.len(),
            got: bounds.len(),
        });
    }
    if x.len() < p0.len() {
        return Err(DeclineError::InsufficientData {
            needed: p0.len(),
            got: x.len(),
        });
    }

    let scale = y.iter().map(|v| v * v).sum::<f64>();
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let objective = |params: &[f64]| sum_squared_residuals(&f, x, y, params) / scale;

    let mut start = p0.to_vec();
    let mut best = nelder_mead(&objective, &start, Some(bounds), config.optimizer.clone());
    let mut iterations = best.iterations;

    for _ in 0..config.restarts {
        start.clone_from(&best.optimal_point);
        let next = nelder_mead(&objective, &start, Some(bounds), config.optimizer.clone());
        iterations += next.iterations;
        if next.optimal_value <= best.optimal_value {
            best = next;
        }
    }

    if !best.optimal_value.is_finite() || best.optimal_point.iter().any(|p| !p.is_finite()) {
        return Err(DeclineError::FitDivergence(format!(
            "no finite optimum after {iterations} iterations"
        )));
    }
    if !best.converged {
        log::debug!("curve fit stopped at iteration cap ({iterations} iterations)");
    }

    Ok(CurveFitResult {
        sse: best.optimal_value * scale,
        params: best.optimal_point,
        converged: best.converged,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fits_exponential_decay() {
        let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|t| 500.0 * (-0.05 * t).exp()).collect();

        let fit = curve_fit(
            |t, p| p[0] * (-p[1] * t).exp(),
            &x,
            &y,
            &[400.0, 0.1],
            &[(0.0, 1000.0), (0.0, 1.0)],
            &CurveFitConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(fit.params[0], 500.0, max_relative = 1e-3);
        assert_relative_eq!(fit.params[1], 0.05, max_relative = 1e-3);
        assert!(fit.sse < 1e-3);
    }

    #[test]
    fn respects_bounds() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![0.0, 5.0, 10.0, 15.0];

        let fit = curve_fit(
            |t, p| p[0] * t,
            &x,
            &y,
            &[1.0],
            &[(0.0, 2.0)],
            &CurveFitConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(fit.params[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn mismatched_inputs() {
        let result = curve_fit(
            |t, p| p[0] * t,
            &[1.0, 2.0],
            &[1.0],
            &[1.0],
            &[(0.0, 2.0)],
            &CurveFitConfig::default(),
        );
        assert!(matches!(result, Err(DeclineError::DimensionMismatch { .. })));

        let result = curve_fit(
            |t, p| p[0] * t,
            &[1.0],
            &[1.0],
            &[1.0],
            &[],
            &CurveFitConfig::default(),
        );
        assert!(matches!(result, Err(DeclineError::DimensionMismatch { .. })));
    }

    #[test]
    fn too_few_points() {
        let result = curve_fit(
            |t, p| p[0] * t + p[1],
            &[1.0],
            &[2.0],
            &[1.0, 0.0],
            &[(0.0, 5.0), (0.0, 5.0)],
            &CurveFitConfig::default(),
        );
        assert!(matches!(
            result,
            Err(DeclineError::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn non_finite_model_diverges() {
        let result = curve_fit(
            |_, _| f64::NAN,
            &[1.0, 2.0, 3.0],
            &[1.0, 2.0, 3.0],
            &[1.0],
            &[(0.0, 5.0)],
            &CurveFitConfig::default(),
        );
        assert!(matches!(result, Err(DeclineError::FitDivergence(_))));
    }
}
