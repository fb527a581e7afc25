//! Series transforms used ahead of detection.

pub mod window;

pub use window::{centered_mean, diff, log1p, rolling_mean};
