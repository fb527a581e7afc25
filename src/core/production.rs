//! ProductionSeries data structure for dated well volumes.

use crate::error::{DeclineError, Result};
use chrono::NaiveDate;

/// A chronologically sorted series of daily or monthly production volumes.
///
/// Missing observations are stored as `f64::NAN`. Construction sorts the
/// observations by date with a stable sort; duplicate dates are kept in their
/// input order and are the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ProductionSeries {
    /// Create a series from parallel date and value vectors.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(DeclineError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        Ok(Self::from_pairs(dates.into_iter().zip(values)))
    }

    /// Create a series from `(date, value)` pairs in any order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut pairs: Vec<(NaiveDate, f64)> = pairs.into_iter().collect();
        // sort_by_key is stable
        pairs.sort_by_key(|&(date, _)| date);
        let (dates, values) = pairs.into_iter().unzip();
        Self { dates, values }
    }

    /// Create a daily series starting at `start`.
    ///
    /// Values that would fall after `NaiveDate::MAX` are dropped.
    pub fn daily(start: NaiveDate, values: Vec<f64>) -> Self {
        let (dates, values) = std::iter::successors(Some(start), |d| d.succ_opt())
            .zip(values)
            .unzip();
        Self { dates, values }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over `(date, value)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Days elapsed since the first observation, usable as the `t` axis of a
    /// decline fit.
    pub fn elapsed_days(&self) -> Vec<f64> {
        match self.first_date() {
            Some(start) => self
                .dates
                .iter()
                .map(|d| (*d - start).num_days() as f64)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of observations that are not NaN or infinite.
    pub fn n_valid(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Whether two observations share a date.
    pub fn has_duplicate_dates(&self) -> bool {
        self.dates.windows(2).any(|w| w[0] == w[1])
    }
}
