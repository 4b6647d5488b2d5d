//! # Oracle Filters
//!
//! Deterministic price smoothing for oracle feeds.
//!
//! ## Design Philosophy
//!
//! - **Fixed-point only**: every value is an `i128` scaled by 10^18, no floats
//!   in the recursions
//! - **Checked arithmetic**: overflow and division by zero surface as errors,
//!   never as wrapped values
//! - **All-or-nothing updates**: a failed call leaves the pipeline untouched
//!
//! ## Modules
//!
//! - `numeric`: `Fixed` scaled-integer type
//! - `filters`: scalar Kalman estimator
//! - `probability`: conjugate Gaussian estimator
//! - `fusion`: `PriceFusion` pipeline and `FilteredPriceUpdated` notifications
//! - `config`: noise parameters and fusion weight
//!
//! ## Example
//!
//! ```rust
//! use oracle_filters::prelude::*;
//!
//! let mut fusion = PriceFusion::new();
//! fusion.update_kalman_filter(Fixed::from_int(100))?;
//! fusion.update_gaussian_filter(Fixed::from_int(150))?;
//!
//! let price = fusion.calculate_filtered_price()?;
//! assert_eq!(price.to_string(), "104.4444444444444444");
//! assert_eq!(fusion.sink().len(), 2);
//! # Ok::<(), oracle_filters::error::FilterError>(())
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod fusion;
pub mod numeric;
pub mod probability;

/// Common imports
pub mod prelude {
    pub use crate::config::FilterConfig;
    pub use crate::error::FilterError;
    pub use crate::numeric::{Fixed, SCALE};

    // Estimators
    pub use crate::filters::{KalmanEstimator, KalmanState};
    pub use crate::probability::{GaussianEstimator, GaussianState};

    // Fusion
    pub use crate::fusion::{
        EventLog,
        FilterKind,
        FilteredPriceUpdated,
        FusionSnapshot,
        PriceFusion,
        PriceSink,
    };
}
