//! Break detection example.
//!
//! Run with: cargo run --example break_detection

use chrono::NaiveDate;
use wellcurve::changepoint::{analyze_breaks, BreakConfig};
use wellcurve::core::ProductionSeries;

fn main() {
    println!("=== Production Break Detection ===\n");

    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();

    // 1. Single step
    println!("--- Step from 100 to 50 at day 200 ---");
    let values: Vec<f64> = (0..400).map(|i| if i < 200 { 100.0 } else { 50.0 }).collect();
    let series = ProductionSeries::daily(start, values);

    let config = BreakConfig::new(5, 0.1, 180).unwrap();
    let analysis = analyze_breaks(&series, &config);
    println!("Candidates: {}", analysis.candidates.len());
    println!("Breaks:     {:?}\n", analysis.breaks);

    // 2. Effect of min_distance
    println!("--- Two steps 60 days apart ---");
    let values: Vec<f64> = (0..500)
        .map(|i| match i {
            0..=199 => 100.0,
            200..=259 => 50.0,
            _ => 20.0,
        })
        .collect();
    let series = ProductionSeries::daily(start, values);

    println!("{:<15} {:>30}", "min_distance", "Breaks");
    println!("{:-<46}", "");
    for min_distance in [0, 30, 90, 180] {
        let config = BreakConfig::new(5, 0.1, min_distance).unwrap();
        let analysis = analyze_breaks(&series, &config);
        println!("{:<15} {:>30?}", min_distance, analysis.breaks);
    }

    // 3. Smoothing window vs threshold
    println!("\n--- Window width spreads the gradient ---");
    for window in [1, 5, 15, 30] {
        let config = BreakConfig::new(window, 0.015, 180).unwrap();
        let analysis = analyze_breaks(&series, &config);
        let peak = analysis
            .gradient
            .iter()
            .filter(|g| g.is_finite())
            .fold(0.0_f64, |m, g| m.max(g.abs()));
        println!(
            "window {:>2}: peak |gradient| {:.4}, breaks {:?}",
            window, peak, analysis.breaks
        );
    }
}
