//! Goodness-of-fit metrics for decline fits.

use crate::error::{DeclineError, Result};

/// Goodness-of-fit summary for a fitted curve.
#[derive(Debug, Clone, PartialEq)]
pub struct FitMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r_squared: f64,
}

/// Compute MAE, RMSE and R² between observed and fitted values.
pub fn fit_metrics(actual: &[f64], fitted: &[f64]) -> Result<FitMetrics> {
    if actual.is_empty() || fitted.is_empty() {
        return Err(DeclineError::EmptyData);
    }
    if actual.len() != fitted.len() {
        return Err(DeclineError::DimensionMismatch {
            expected: actual.len(),
            got: fitted.len(),
        });
    }

    Ok(FitMetrics {
        mae: mae(actual, fitted),
        rmse: rmse(actual, fitted),
        r_squared: r_squared(actual, fitted),
    })
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// A constant `actual` scores 1.0 when matched exactly and 0.0 otherwise.
/// Returns NaN for empty or mismatched input.
pub fn r_squared(actual: &[f64], fitted: &[f64]) -> f64 {
    if actual.len() != fitted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(a, f)| (a - f).powi(2))
        .sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Mean absolute error.
pub fn mae(actual: &[f64], fitted: &[f64]) -> f64 {
    if actual.len() != fitted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(fitted)
        .map(|(a, f)| (a - f).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], fitted: &[f64]) -> f64 {
    if actual.len() != fitted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let mse = actual
        .iter()
        .zip(fitted)
        .map(|(a, f)| (a - f).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}
