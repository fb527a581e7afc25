//! Changepoint detection for production trends.
//!
//! # Algorithm
//!
//! 1. Centered moving average of width `window`
//! 2. `ln(v + 1)` of the smoothed values
//! 3. First difference (the log-gradient)
//! 4. Points with `|gradient| > threshold` become candidates
//! 5. Greedy scan keeps candidates at least `min_distance` days after the
//!    last accepted break
//!
//! # Example
//!
//! ```
//! use wellcurve::changepoint::{detect_breaks, BreakConfig};
//! use wellcurve::core::ProductionSeries;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
//! let series = ProductionSeries::daily(start, vec![120.0; 365]);
//!
//! // A flat series never breaks
//! assert!(detect_breaks(&series, &BreakConfig::default()).is_empty());
//! ```

pub mod breaks;

pub use breaks::{
    analyze_breaks, detect_breaks, reduce_candidates, BreakAnalysis, BreakCandidate, BreakConfig,
};
