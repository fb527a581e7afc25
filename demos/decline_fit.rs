//! Decline-curve fitting, EUR and volatility example.
//!
//! Run with: cargo run --example decline_fit

use chrono::NaiveDate;
use wellcurve::core::ProductionSeries;
use wellcurve::models::{
    calculate_eur_default, fit_garch_volatility, fit_series, hyperbolic_decline, DeclineModel,
};

fn main() {
    println!("=== Decline Curve Fitting ===\n");

    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let values: Vec<f64> = (0..365)
        .map(|t| {
            let t = t as f64;
            hyperbolic_decline(t, 850.0, 0.012, 0.7) * (1.0 + 0.03 * (t * 1.3).sin())
        })
        .collect();
    let series = ProductionSeries::daily(start, values);

    println!("{:<12} {:>10} {:>40}", "Model", "R²", "Parameters");
    println!("{:-<64}", "");
    for model in [
        DeclineModel::Hyperbolic,
        DeclineModel::PowerLaw,
        DeclineModel::StretchedExponential,
    ] {
        let fit = fit_series(model, &series);
        let params = match &fit.params {
            Some(p) => model
                .param_names()
                .iter()
                .zip(p)
                .map(|(name, v)| format!("{name}={v:.4}"))
                .collect::<Vec<_>>()
                .join(" "),
            None => "no fit".to_string(),
        };
        println!("{:<12} {:>10.4} {:>40}", model.name(), fit.r_squared, params);

        if let Some(eur) = fit.eur_default() {
            println!("{:<12} EUR to 50/day: {:.0}", "", eur);
        }
    }

    println!("\n--- EUR sensitivity to b ---");
    for b in [0.0, 0.3, 0.6, 0.9, 1.0, 1.3] {
        match calculate_eur_default(850.0, 0.1, b) {
            Some(eur) => println!("b = {b:.1}: {eur:>12.0}"),
            None => println!("b = {b:.1}: invalid"),
        }
    }

    println!("\n--- Production volatility (GARCH(1,1)) ---");
    let changes: Vec<f64> = series.values().windows(2).map(|w| w[1] - w[0]).collect();
    match fit_garch_volatility(&changes) {
        Some(vol) => {
            let mean = vol.iter().sum::<f64>() / vol.len() as f64;
            println!("Mean conditional volatility: {mean:.3}");
        }
        None => println!("GARCH fit failed"),
    }
}
