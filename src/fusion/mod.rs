//! Fused filtered price
//!
//! [`PriceFusion`] owns one Kalman and one Gaussian estimator, routes raw
//! observations to them, and publishes the convex combination of their
//! outputs to a [`PriceSink`] after every successful update.

mod engine;
mod events;

pub use engine::{fuse, FusionSnapshot, PriceFusion};
pub use events::{EventLog, FilterKind, FilteredPriceUpdated, PriceSink};
