use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::numeric::Fixed;

/// Gaussian belief over the true price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaussianState {
    /// Posterior mean
    pub mean: Fixed,

    /// Posterior variance, never negative
    pub variance: Fixed,
}

impl Default for GaussianState {
    /// `mean = 0`, `variance = 1.0`
    fn default() -> Self {
        Self {
            mean: Fixed::ZERO,
            variance: Fixed::ONE,
        }
    }
}

/// Conjugate Gaussian filter
///
/// Maintains a normal posterior over the price and fuses each observation,
/// modelled as the price plus zero-mean noise of variance `r`, via Bayes rule:
///
/// ```text
/// σ²' = σ² r / (σ² + r)
/// μ'  = (μ r + z σ²) / (σ² + r)
/// ```
#[repr(align(64))]
#[derive(Debug, Clone, Copy)]
pub struct GaussianEstimator {
    posterior: GaussianState,

    /// Observation noise variance
    r: Fixed,
}

impl GaussianEstimator {
    /// Create with the standard prior N(0, 1)
    #[inline]
    pub fn new(measurement_noise: Fixed) -> Self {
        Self::with_prior(GaussianState::default(), measurement_noise)
    }

    /// Create with custom prior
    #[inline]
    pub fn with_prior(prior: GaussianState, measurement_noise: Fixed) -> Self {
        Self {
            posterior: prior,
            r: measurement_noise,
        }
    }

    /// Posterior after observing `measurement`, without committing it
    pub fn peek(&self, measurement: Fixed) -> Result<GaussianState> {
        let GaussianState { mean, variance } = self.posterior;
        let denominator = variance.checked_add(self.r)?;

        let new_variance = variance.checked_mul(self.r)?.checked_div(denominator)?;

        let weighted = mean
            .checked_mul(self.r)?
            .checked_add(measurement.checked_mul(variance)?)?;
        let new_mean = weighted.checked_div(denominator)?;

        Ok(GaussianState {
            mean: new_mean,
            variance: new_variance,
        })
    }

    /// Update with observation
    ///
    /// The posterior becomes the prior for the next call. Nothing is written
    /// if any step fails.
    pub fn update(&mut self, measurement: Fixed) -> Result<GaussianState> {
        let next = self.peek(measurement)?;
        debug!(
            measurement = %measurement,
            mean = %next.mean,
            variance = %next.variance,
            "Gaussian step"
        );
        self.posterior = next;
        Ok(next)
    }

    /// Get current posterior
    #[inline(always)]
    pub fn state(&self) -> GaussianState {
        self.posterior
    }

    #[inline(always)]
    pub fn mean(&self) -> Fixed {
        self.posterior.mean
    }

    #[inline(always)]
    pub fn variance(&self) -> Fixed {
        self.posterior.variance
    }

    #[inline(always)]
    pub fn measurement_noise(&self) -> Fixed {
        self.r
    }

    /// Inverse variance (confidence in the current mean)
    #[inline]
    pub fn precision(&self) -> Result<Fixed> {
        Fixed::ONE.checked_div(self.posterior.variance)
    }

    /// Reset to custom prior
    #[inline]
    pub fn reset(&mut self, prior: GaussianState) {
        self.posterior = prior;
    }
}
