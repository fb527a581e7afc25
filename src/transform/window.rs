//! Rolling window and point-wise transforms.
//!
//! All functions return a vector aligned with the input; positions without a
//! defined value hold `f64::NAN`.

/// Half-open index range covered by the window at position `i`, or `None`
/// when the window does not fit inside a series of length `n`.
///
/// A centered window of width `w` covers `[i - w/2, i - w/2 + w)`, so even
/// widths lean one step into the past.
fn window_range(i: usize, n: usize, window: usize, center: bool) -> Option<(usize, usize)> {
    let start = if center {
        i.checked_sub(window / 2)?
    } else {
        (i + 1).checked_sub(window)?
    };
    let end = start + window;
    (end <= n).then_some((start, end))
}

/// Compute rolling mean (moving average) over full windows only.
///
/// A position is NaN when its window leaves the series or contains a missing
/// value.
///
/// # Arguments
/// * `series` - Input values
/// * `window` - Window size
/// * `center` - If true, center the window; otherwise use a trailing window
pub fn rolling_mean(series: &[f64], window: usize, center: bool) -> Vec<f64> {
    let n = series.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || window > n {
        return result;
    }

    for (i, slot) in result.iter_mut().enumerate() {
        if let Some((start, end)) = window_range(i, n, window, center) {
            let segment = &series[start..end];
            if segment.iter().all(|v| v.is_finite()) {
                *slot = segment.iter().sum::<f64>() / window as f64;
            }
        }
    }

    result
}

/// Centered moving average of width `window`.
pub fn centered_mean(series: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(series, window, true)
}

/// First difference `x[i] - x[i - 1]`, aligned with the input.
///
/// Position 0 is always NaN; any position whose pair contains a NaN is NaN.
pub fn diff(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }

    std::iter::once(f64::NAN)
        .chain(series.windows(2).map(|w| w[1] - w[0]))
        .collect()
}

/// Apply `ln(v + 1)` to every value.
pub fn log1p(series: &[f64]) -> Vec<f64> {
    series.iter().map(|v| v.ln_1p()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rolling_mean_trailing() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = rolling_mean(&series, 3, false);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_relative_eq!(result[2], 2.0, epsilon = 1e-10);
        assert_relative_eq!(result[3], 3.0, epsilon = 1e-10);
        assert_relative_eq!(result[4], 4.0, epsilon = 1e-10);
    }

    #[test]
    fn rolling_mean_centered_odd_window() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = centered_mean(&series, 3);

        assert!(result[0].is_nan());
        assert_relative_eq!(result[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(result[2], 3.0, epsilon = 1e-10);
        assert_relative_eq!(result[3], 4.0, epsilon = 1e-10);
        assert!(result[4].is_nan());
    }

    #[test]
    fn rolling_mean_centered_even_window() {
        // Width 4 at i covers [i - 2, i + 2)
        let series: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let result = centered_mean(&series, 4);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_relative_eq!(result[2], 1.5, epsilon = 1e-10);
        assert_relative_eq!(result[8], 7.5, epsilon = 1e-10);
        assert!(result[9].is_nan());
    }

    #[test]
    fn rolling_mean_window_1_is_identity() {
        let series = vec![1.0, 2.0, 3.0];
        assert_eq!(centered_mean(&series, 1), series);
    }

    #[test]
    fn rolling_mean_window_wider_than_series() {
        let result = centered_mean(&[1.0, 2.0, 3.0], 5);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_mean_missing_value_poisons_window() {
        let series = vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 7.0];
        let result = centered_mean(&series, 3);

        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert_relative_eq!(result[4], 5.0, epsilon = 1e-10);
        assert_relative_eq!(result[5], 6.0, epsilon = 1e-10);
    }

    #[test]
    fn rolling_mean_empty() {
        assert!(rolling_mean(&[], 3, true).is_empty());
        assert!(rolling_mean(&[1.0], 0, true)[0].is_nan());
    }

    #[test]
    fn diff_is_aligned() {
        let result = diff(&[1.0, 4.0, f64::NAN, 10.0, 15.0]);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_nan());
        assert_relative_eq!(result[1], 3.0, epsilon = 1e-10);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert_relative_eq!(result[4], 5.0, epsilon = 1e-10);
    }

    #[test]
    fn log1p_of_zero_is_zero() {
        let result = log1p(&[0.0, std::f64::consts::E - 1.0, f64::NAN]);
        assert_relative_eq!(result[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result[1], 1.0, epsilon = 1e-12);
        assert!(result[2].is_nan());
    }
}
