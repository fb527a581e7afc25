//! Sample statistics over finite values.

use statrs::statistics::Statistics;

/// Values that are neither NaN nor infinite.
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Mean of the finite values; NaN when there are none.
pub fn mean(values: &[f64]) -> f64 {
    finite_values(values).mean()
}

/// Sample standard deviation (n - 1) of the finite values; NaN for fewer
/// than two.
pub fn std_dev(values: &[f64]) -> f64 {
    let finite = finite_values(values);
    if finite.len() < 2 {
        return f64::NAN;
    }
    finite.std_dev()
}

/// Pair up `x` and `y`, dropping positions where either is not finite.
pub fn finite_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_skips_missing() {
        assert_relative_eq!(mean(&[1.0, f64::NAN, 3.0]), 2.0, epsilon = 1e-12);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn std_dev_is_sample() {
        assert_relative_eq!(
            std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
            (32.0_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );
        assert!(std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn finite_pairs_drops_either_side() {
        let (x, y) = finite_pairs(&[0.0, 1.0, f64::NAN, 3.0], &[10.0, f64::INFINITY, 12.0, 13.0]);
        assert_eq!(x, vec![0.0, 3.0]);
        assert_eq!(y, vec![10.0, 13.0]);
    }
}
