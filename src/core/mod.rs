//! Core data structures for production series.

mod production;

pub use production::ProductionSeries;
