//! Filter configuration
//!
//! Noise parameters and the fusion weight are fixed when a pipeline is built.
//! Documents may omit any field; missing fields take the defaults
//! (`q = 1.0`, `r = 0.25`, `smoothing_factor = 0.5`).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::numeric::{Fixed, SCALE};

/// Default process noise (1.0)
pub const DEFAULT_PROCESS_NOISE: Fixed = Fixed::ONE;

/// Default measurement noise (0.25)
pub const DEFAULT_MEASUREMENT_NOISE: Fixed = Fixed::from_raw(SCALE / 4);

/// Default fusion weight on the Kalman branch (0.5)
pub const DEFAULT_SMOOTHING_FACTOR: Fixed = Fixed::from_raw(SCALE / 2);

/// Immutable parameters shared by both estimators and the fusion step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Process noise `Q` added to the Kalman variance on every step
    pub q: Fixed,

    /// Measurement noise `R` used by both the Kalman and Gaussian estimators
    pub r: Fixed,

    /// Weight on the Kalman estimate; `1 - smoothing_factor` goes to the Gaussian mean
    pub smoothing_factor: Fixed,
}

impl FilterConfig {
    /// Build and validate a configuration
    pub fn new(q: Fixed, r: Fixed, smoothing_factor: Fixed) -> Result<Self> {
        let config = Self {
            q,
            r,
            smoothing_factor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document and validate it
    ///
    /// Values are raw scaled integers, e.g. `{"r": 250000000000000000}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FilterError::config(format!("malformed document: {}", e)))?;
        config.validate()?;
        debug!(
            q = %config.q,
            r = %config.r,
            smoothing_factor = %config.smoothing_factor,
            "Loaded filter config"
        );
        Ok(config)
    }

    /// Reject non-positive noise and weights outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.q <= Fixed::ZERO {
            return Err(FilterError::config(format!(
                "process noise q must be positive, got {}",
                self.q
            )));
        }
        if self.r <= Fixed::ZERO {
            return Err(FilterError::config(format!(
                "measurement noise r must be positive, got {}",
                self.r
            )));
        }
        if self.smoothing_factor < Fixed::ZERO || self.smoothing_factor > Fixed::ONE {
            return Err(FilterError::config(format!(
                "smoothing factor must be within [0, 1], got {}",
                self.smoothing_factor
            )));
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            q: DEFAULT_PROCESS_NOISE,
            r: DEFAULT_MEASUREMENT_NOISE,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.q, SCALE);
        assert_eq!(config.r, SCALE / 4);
        assert_eq!(config.smoothing_factor, SCALE / 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let half = DEFAULT_SMOOTHING_FACTOR;

        assert!(matches!(
            FilterConfig::new(Fixed::ZERO, Fixed::ONE, half),
            Err(FilterError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FilterConfig::new(Fixed::ONE, Fixed::from_int(-1), half),
            Err(FilterError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FilterConfig::new(Fixed::ONE, Fixed::ONE, Fixed::from_int(2)),
            Err(FilterError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FilterConfig::new(Fixed::ONE, Fixed::ONE, Fixed::from_raw(-1)),
            Err(FilterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_weight_bounds_are_inclusive() {
        assert!(FilterConfig::new(Fixed::ONE, Fixed::ONE, Fixed::ZERO).is_ok());
        assert!(FilterConfig::new(Fixed::ONE, Fixed::ONE, Fixed::ONE).is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = FilterConfig::from_json(r#"{"q": 2000000000000000000}"#).unwrap();
        assert_eq!(config.q, Fixed::from_int(2));
        assert_eq!(config.r, DEFAULT_MEASUREMENT_NOISE);
        assert_eq!(config.smoothing_factor, DEFAULT_SMOOTHING_FACTOR);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(matches!(
            FilterConfig::from_json(r#"{"r": 0}"#),
            Err(FilterError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FilterConfig::from_json("not json"),
            Err(FilterError::InvalidConfiguration(_))
        ));
    }
}
