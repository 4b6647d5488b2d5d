//! Synthetic price feed through the fused filter
//!
//! # Running
//!
//! ```bash
//! cargo run --example price_feed
//!
//! # With per-step estimator logs
//! RUST_LOG=oracle_filters=debug cargo run --example price_feed
//! ```

use oracle_filters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), FilterError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = StdRng::seed_from_u64(42);
    let mut fusion = PriceFusion::new();

    // True price drifts upward from 100.00; observations carry +-2.00 of noise
    let mut true_cents: i64 = 10_000;
    for step in 1..=20 {
        true_cents += rng.gen_range(-50..=80);
        let observed = true_cents + rng.gen_range(-200..=200);
        let observation = Fixed::from_ratio(observed, 100)?;

        // Alternate feeds the way two independent reporters would
        let filtered = if step % 2 == 0 {
            fusion.update_kalman_filter(observation)?
        } else {
            fusion.update_gaussian_filter(observation)?
        };

        println!(
            "step {:>2}: true={:>8.2} observed={:>8} filtered={:>10.4}",
            step,
            true_cents as f64 / 100.0,
            observation.to_string(),
            filtered.to_f64()
        );
    }

    println!(
        "\nkalman: estimate={} variance={}",
        fusion.kalman_filtered_price(),
        fusion.kalman_variance()
    );
    println!(
        "gaussian: mean={} variance={}",
        fusion.gaussian_mean(),
        fusion.gaussian_variance()
    );
    println!("notifications emitted: {}", fusion.sink().len());

    Ok(())
}
