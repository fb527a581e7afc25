//! Log-gradient break detection for production series.
//!
//! The series is smoothed with a centered moving average, transformed with
//! `ln(v + 1)` and differenced. Points whose absolute gradient exceeds the
//! threshold become candidates, and a greedy forward scan keeps only
//! candidates at least `min_distance` days after the last accepted break.

use crate::core::ProductionSeries;
use crate::error::{DeclineError, Result};
use crate::transform::window::{centered_mean, diff, log1p};
use chrono::NaiveDate;

/// Configuration for break detection.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakConfig {
    /// Width of the centered smoothing window
    pub window: usize,
    /// Minimum absolute log-gradient for a candidate (strict)
    pub threshold: f64,
    /// Minimum day gap between reported breaks
    pub min_distance: u32,
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            window: 30,
            threshold: 0.15,
            min_distance: 180,
        }
    }
}

impl BreakConfig {
    /// Create a validated config.
    pub fn new(window: usize, threshold: f64, min_distance: u32) -> Result<Self> {
        if window == 0 {
            return Err(DeclineError::InvalidParameter(
                "window must be positive".to_string(),
            ));
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(DeclineError::InvalidParameter(format!(
                "threshold must be positive and finite, got {threshold}"
            )));
        }
        Ok(Self {
            window,
            threshold,
            min_distance,
        })
    }

    /// Set the smoothing window width.
    pub fn window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Set the gradient threshold; the sign is dropped. Zero and non-finite
    /// values leave the current threshold unchanged.
    pub fn threshold(mut self, threshold: f64) -> Self {
        if threshold.is_finite() && threshold != 0.0 {
            self.threshold = threshold.abs();
        }
        self
    }

    /// Set the minimum distance between breaks, in days.
    pub fn min_distance(mut self, days: u32) -> Self {
        self.min_distance = days;
        self
    }
}

/// A point whose log-gradient exceeded the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakCandidate {
    /// Position in the sorted series
    pub index: usize,
    pub date: NaiveDate,
    /// Signed log-gradient at this point
    pub gradient: f64,
}

/// Intermediate and final results of a break scan.
#[derive(Debug, Clone)]
pub struct BreakAnalysis {
    /// Dates of the sorted input
    pub dates: Vec<NaiveDate>,
    /// Centered moving average (NaN where undefined)
    pub smoothed: Vec<f64>,
    /// First difference of `ln(smoothed + 1)` (NaN where undefined)
    pub gradient: Vec<f64>,
    /// Points with `|gradient| > threshold`, in date order
    pub candidates: Vec<BreakCandidate>,
    /// Accepted break dates
    pub breaks: Vec<NaiveDate>,
}

impl BreakAnalysis {
    pub fn n_breaks(&self) -> usize {
        self.breaks.len()
    }

    /// Candidate dates, before the minimum-distance reduction.
    pub fn candidate_dates(&self) -> Vec<NaiveDate> {
        self.candidates.iter().map(|c| c.date).collect()
    }

    /// Candidates that survived the reduction.
    pub fn accepted_candidates(&self) -> impl Iterator<Item = &BreakCandidate> {
        // Breaks are a subsequence of candidates, so a single merge pass suffices.
        let mut remaining = self.breaks.iter().peekable();
        self.candidates.iter().filter(move |c| {
            if remaining.peek() == Some(&&c.date) {
                remaining.next();
                true
            } else {
                false
            }
        })
    }
}

/// Detect production trend breaks.
///
/// Returns the accepted break dates in chronological order. Empty, short or
/// flat input yields an empty vector.
///
/// # Example
/// ```
/// use wellcurve::changepoint::{detect_breaks, BreakConfig};
/// use wellcurve::core::ProductionSeries;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let values: Vec<f64> = (0..400).map(|i| if i < 200 { 100.0 } else { 10.0 }).collect();
/// let series = ProductionSeries::daily(start, values);
///
/// let config = BreakConfig::new(5, 0.1, 180).unwrap();
/// let breaks = detect_breaks(&series, &config);
/// assert_eq!(breaks.len(), 1);
/// ```
pub fn detect_breaks(series: &ProductionSeries, config: &BreakConfig) -> Vec<NaiveDate> {
    analyze_breaks(series, config).breaks
}

/// Run break detection and keep every intermediate series.
pub fn analyze_breaks(series: &ProductionSeries, config: &BreakConfig) -> BreakAnalysis {
    let dates = series.dates().to_vec();
    let smoothed = centered_mean(series.values(), config.window);
    let gradient = diff(&log1p(&smoothed));

    // Undefined or overflowed gradients never qualify
    let candidates: Vec<BreakCandidate> = gradient
        .iter()
        .enumerate()
        .filter(|&(_, g)| g.is_finite() && g.abs() > config.threshold)
        .map(|(index, &gradient)| BreakCandidate {
            index,
            date: dates[index],
            gradient,
        })
        .collect();

    let candidate_dates: Vec<NaiveDate> = candidates.iter().map(|c| c.date).collect();
    let breaks = reduce_candidates(&candidate_dates, config.min_distance);

    log::debug!(
        "break scan: {} points, window {}, {} candidates, {} breaks",
        dates.len(),
        config.window,
        candidates.len(),
        breaks.len()
    );

    BreakAnalysis {
        dates,
        smoothed,
        gradient,
        candidates,
        breaks,
    }
}

/// Greedy minimum-distance reduction.
///
/// The first candidate is always accepted. A later candidate is accepted only
/// if it falls at least `min_distance` days after the last *accepted* date,
/// not the last candidate.
pub fn reduce_candidates(candidates: &[NaiveDate], min_distance: u32) -> Vec<NaiveDate> {
    let min_distance = i64::from(min_distance);
    let mut accepted: Vec<NaiveDate> = Vec::new();

    for &date in candidates {
        match accepted.last() {
            Some(&last) if (date - last).num_days() < min_distance => {}
            _ => accepted.push(date),
        }
    }

    accepted
}
