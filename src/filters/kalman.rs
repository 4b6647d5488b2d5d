use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::numeric::Fixed;

/// Current Kalman estimate and its uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KalmanState {
    /// State estimate
    pub estimate: Fixed,

    /// Estimate uncertainty (variance), never negative
    pub variance: Fixed,
}

impl Default for KalmanState {
    /// `estimate = 0`, `variance = 1.0`
    fn default() -> Self {
        Self {
            estimate: Fixed::ZERO,
            variance: Fixed::ONE,
        }
    }
}

/// Scalar fixed-point Kalman filter (random-walk model)
///
/// The predict step only injects process noise, so it is folded into
/// [`update`](Self::update).
#[repr(align(64))]
#[derive(Debug, Clone, Copy)]
pub struct KalmanEstimator {
    state: KalmanState,

    /// Process noise variance
    q: Fixed,

    /// Measurement noise variance
    r: Fixed,
}

impl KalmanEstimator {
    /// Create from the initial state
    ///
    /// # Arguments
    /// * `process_noise` - Q, how much the true price drifts per step
    /// * `measurement_noise` - R, how noisy a single observation is
    #[inline]
    pub fn new(process_noise: Fixed, measurement_noise: Fixed) -> Self {
        Self::with_state(KalmanState::default(), process_noise, measurement_noise)
    }

    #[inline]
    pub fn with_state(state: KalmanState, process_noise: Fixed, measurement_noise: Fixed) -> Self {
        Self {
            state,
            q: process_noise,
            r: measurement_noise,
        }
    }

    /// Predicted variance: p_pred = p + q
    #[inline]
    pub fn predict(&self) -> Result<Fixed> {
        self.state.variance.checked_add(self.q)
    }

    /// State after observing `measurement`, without committing it
    pub fn peek(&self, measurement: Fixed) -> Result<KalmanState> {
        let predicted = self.predict()?;

        // Kalman gain: k = p_pred / (p_pred + r)
        let innovation_variance = predicted.checked_add(self.r)?;
        let gain = predicted.checked_div(innovation_variance)?;

        // x = x + k * (z - x)
        let innovation = measurement.checked_sub(self.state.estimate)?;
        let estimate = self.state.estimate.checked_add(gain.checked_mul(innovation)?)?;

        // p = (1 - k) * p_pred
        let variance = Fixed::ONE.checked_sub(gain)?.checked_mul(predicted)?;

        Ok(KalmanState { estimate, variance })
    }

    /// Predict + correct with one measurement
    ///
    /// State is only overwritten when every step succeeds.
    pub fn update(&mut self, measurement: Fixed) -> Result<KalmanState> {
        let next = self.peek(measurement)?;
        debug!(
            measurement = %measurement,
            estimate = %next.estimate,
            variance = %next.variance,
            "Kalman step"
        );
        self.state = next;
        Ok(next)
    }

    #[inline(always)]
    pub fn state(&self) -> KalmanState {
        self.state
    }

    #[inline(always)]
    pub fn estimate(&self) -> Fixed {
        self.state.estimate
    }

    #[inline(always)]
    pub fn variance(&self) -> Fixed {
        self.state.variance
    }

    #[inline(always)]
    pub fn process_noise(&self) -> Fixed {
        self.q
    }

    #[inline(always)]
    pub fn measurement_noise(&self) -> Fixed {
        self.r
    }

    /// Reset to a known state
    #[inline]
    pub fn reset(&mut self, state: KalmanState) {
        self.state = state;
    }
}
