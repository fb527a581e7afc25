//! Estimated Ultimate Recovery of an Arps hyperbolic decline.
//!
//! Integrating `q(t) = qi / (1 + b·di·t)^(1/b)` from `qi` down to the
//! economic limit `q_limit` gives
//!
//! `Np = qi^b / (di·(1 - b)) · (qi^(1-b) - q_limit^(1-b))`
//!
//! with the harmonic (`b = 1`) limit `qi/di · ln(qi/q_limit)`. Rates are per
//! day and `di` per month, so the volume is scaled by days per month.

/// Default economic limit rate.
pub const DEFAULT_Q_LIMIT: f64 = 50.0;

/// Average days per month used to convert the integral to a volume.
pub const DAYS_PER_MONTH: f64 = 30.4;

/// `|1 - b|` below which the harmonic limit is used.
const HARMONIC_EPS: f64 = 1e-9;

/// Cumulative volume of a hyperbolic decline down to `q_limit`.
///
/// Returns `None` for non-finite inputs, a non-positive `qi`, `di` or
/// `q_limit`, or a negative `b`. A well already at or below the limit
/// recovers nothing.
///
/// # Example
/// ```
/// use wellcurve::models::eur::{calculate_eur, DAYS_PER_MONTH};
///
/// // Exponential decline (b = 0): (qi - q_limit) / di
/// let eur = calculate_eur(1000.0, 0.1, 0.0, 50.0).unwrap();
/// assert!((eur - 9500.0 * DAYS_PER_MONTH).abs() < 1e-6);
/// ```
pub fn calculate_eur(qi: f64, di: f64, b: f64, q_limit: f64) -> Option<f64> {
    if ![qi, di, b, q_limit].iter().all(|v| v.is_finite()) {
        log::warn!("EUR skipped: non-finite parameters qi={qi} di={di} b={b} q_limit={q_limit}");
        return None;
    }
    if qi <= 0.0 || di <= 0.0 || b < 0.0 || q_limit <= 0.0 {
        log::warn!("EUR skipped: invalid parameters qi={qi} di={di} b={b} q_limit={q_limit}");
        return None;
    }
    if qi <= q_limit {
        return Some(0.0);
    }

    let volume = if (1.0 - b).abs() < HARMONIC_EPS {
        qi / di * (qi / q_limit).ln()
    } else {
        qi.powf(b) / (di * (1.0 - b)) * (qi.powf(1.0 - b) - q_limit.powf(1.0 - b))
    };

    Some(volume * DAYS_PER_MONTH)
}

/// [`calculate_eur`] with [`DEFAULT_Q_LIMIT`].
pub fn calculate_eur_default(qi: f64, di: f64, b: f64) -> Option<f64> {
    calculate_eur(qi, di, b, DEFAULT_Q_LIMIT)
}
