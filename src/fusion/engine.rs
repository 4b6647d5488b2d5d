use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::filters::{KalmanEstimator, KalmanState};
use crate::numeric::Fixed;
use crate::probability::{GaussianEstimator, GaussianState};

use super::events::{EventLog, FilterKind, FilteredPriceUpdated, PriceSink};

/// Convex combination: w * kalman + (1 - w) * gaussian
#[inline]
pub fn fuse(smoothing_factor: Fixed, kalman_estimate: Fixed, gaussian_mean: Fixed) -> Result<Fixed> {
    let complement = Fixed::ONE.checked_sub(smoothing_factor)?;
    smoothing_factor
        .checked_mul(kalman_estimate)?
        .checked_add(complement.checked_mul(gaussian_mean)?)
}

/// Serialisable view of a pipeline's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionSnapshot {
    pub config: FilterConfig,
    pub kalman: KalmanState,
    pub gaussian: GaussianState,
    pub filtered_price: Fixed,
    pub sequence: u64,
}

/// Kalman + Gaussian price pipeline with a fused output
///
/// Every update is staged on copies of the estimators and committed only
/// when the estimator step and the fusion both succeed, so a failed call
/// leaves state, filtered price and sink untouched.
///
/// # Examples
///
/// ```
/// use oracle_filters::prelude::*;
///
/// let mut fusion = PriceFusion::new();
/// let price = fusion.update_kalman_filter(Fixed::from_int(100)).unwrap();
///
/// assert_eq!(fusion.calculate_filtered_price().unwrap(), price);
/// assert_eq!(fusion.sink().last().unwrap().new_filtered_price, price);
/// ```
#[derive(Debug)]
pub struct PriceFusion<S: PriceSink = EventLog> {
    config: FilterConfig,
    kalman: KalmanEstimator,
    gaussian: GaussianEstimator,

    /// Last value emitted
    filtered_price: Fixed,

    /// Notifications emitted so far
    sequence: u64,

    sink: S,
}

impl PriceFusion<EventLog> {
    /// Default parameters (`Q = 1.0`, `R = 0.25`, weight 0.5), recording to an [`EventLog`]
    pub fn new() -> Self {
        Self::build(FilterConfig::default(), EventLog::new())
    }

    pub fn with_config(config: FilterConfig) -> Result<Self> {
        Self::with_sink(config, EventLog::new())
    }
}

impl Default for PriceFusion<EventLog> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PriceSink> PriceFusion<S> {
    /// Validate `config` and build a pipeline publishing to `sink`
    pub fn with_sink(config: FilterConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, sink))
    }

    /// Rebuild a pipeline from a snapshot
    ///
    /// The filtered price is recomputed from the restored states rather than
    /// trusted from the snapshot.
    pub fn restore(snapshot: FusionSnapshot, sink: S) -> Result<Self> {
        snapshot.config.validate()?;
        for (name, variance) in [
            ("kalman", snapshot.kalman.variance),
            ("gaussian", snapshot.gaussian.variance),
        ] {
            if variance.is_negative() {
                return Err(FilterError::config(format!(
                    "{} variance must not be negative, got {}",
                    name, variance
                )));
            }
        }

        let filtered_price = fuse(
            snapshot.config.smoothing_factor,
            snapshot.kalman.estimate,
            snapshot.gaussian.mean,
        )?;

        Ok(Self {
            config: snapshot.config,
            kalman: KalmanEstimator::with_state(snapshot.kalman, snapshot.config.q, snapshot.config.r),
            gaussian: GaussianEstimator::with_prior(snapshot.gaussian, snapshot.config.r),
            filtered_price,
            sequence: snapshot.sequence,
            sink,
        })
    }

    fn build(config: FilterConfig, sink: S) -> Self {
        Self {
            config,
            kalman: KalmanEstimator::new(config.q, config.r),
            gaussian: GaussianEstimator::new(config.r),
            filtered_price: Fixed::ZERO,
            sequence: 0,
            sink,
        }
    }

    /// Feed one observation to the Kalman estimator and publish the new price
    pub fn update_kalman_filter(&mut self, measurement: Fixed) -> Result<Fixed> {
        self.apply(FilterKind::Kalman, measurement)
    }

    /// Feed one observation to the Gaussian estimator and publish the new price
    pub fn update_gaussian_filter(&mut self, measurement: Fixed) -> Result<Fixed> {
        self.apply(FilterKind::Gaussian, measurement)
    }

    /// Feed the same observation to both estimators; publishes once
    pub fn update_both(&mut self, measurement: Fixed) -> Result<Fixed> {
        self.apply(FilterKind::Both, measurement)
    }

    /// Fused price from the current estimator states, no mutation
    #[inline]
    pub fn calculate_filtered_price(&self) -> Result<Fixed> {
        fuse(
            self.config.smoothing_factor,
            self.kalman.estimate(),
            self.gaussian.mean(),
        )
    }

    fn apply(&mut self, source: FilterKind, measurement: Fixed) -> Result<Fixed> {
        let (kalman, gaussian, price) = self.stage(source, measurement).map_err(|e| {
            warn!(?source, measurement = %measurement, error = %e, "Filter update aborted");
            e
        })?;

        self.kalman = kalman;
        self.gaussian = gaussian;
        self.filtered_price = price;
        self.sequence += 1;

        let event = FilteredPriceUpdated {
            sequence: self.sequence,
            source,
            new_filtered_price: price,
        };
        info!(
            sequence = event.sequence,
            ?source,
            filtered_price = %price,
            "FilteredPriceUpdated"
        );
        self.sink.publish(&event);

        Ok(price)
    }

    fn stage(
        &self,
        source: FilterKind,
        measurement: Fixed,
    ) -> Result<(KalmanEstimator, GaussianEstimator, Fixed)> {
        let mut kalman = self.kalman;
        let mut gaussian = self.gaussian;

        if source.touches_kalman() {
            kalman.update(measurement)?;
        }
        if source.touches_gaussian() {
            gaussian.update(measurement)?;
        }

        let price = fuse(self.config.smoothing_factor, kalman.estimate(), gaussian.mean())?;
        Ok((kalman, gaussian, price))
    }

    // ------------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------------

    /// Kalman state estimate
    #[inline(always)]
    pub fn kalman_filtered_price(&self) -> Fixed {
        self.kalman.estimate()
    }

    #[inline(always)]
    pub fn kalman_variance(&self) -> Fixed {
        self.kalman.variance()
    }

    #[inline(always)]
    pub fn kalman_q(&self) -> Fixed {
        self.config.q
    }

    #[inline(always)]
    pub fn gaussian_mean(&self) -> Fixed {
        self.gaussian.mean()
    }

    #[inline(always)]
    pub fn gaussian_variance(&self) -> Fixed {
        self.gaussian.variance()
    }

    #[inline(always)]
    pub fn gaussian_r(&self) -> Fixed {
        self.config.r
    }

    #[inline(always)]
    pub fn smoothing_factor(&self) -> Fixed {
        self.config.smoothing_factor
    }

    /// Value carried by the most recent notification (zero before any update)
    #[inline(always)]
    pub fn filtered_price(&self) -> Fixed {
        self.filtered_price
    }

    #[inline(always)]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline(always)]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    #[inline(always)]
    pub fn kalman(&self) -> &KalmanEstimator {
        &self.kalman
    }

    #[inline(always)]
    pub fn gaussian(&self) -> &GaussianEstimator {
        &self.gaussian
    }

    pub fn snapshot(&self) -> FusionSnapshot {
        FusionSnapshot {
            config: self.config,
            kalman: self.kalman.state(),
            gaussian: self.gaussian.state(),
            filtered_price: self.filtered_price,
            sequence: self.sequence,
        }
    }

    #[inline(always)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::SCALE;

    #[test]
    fn test_initial_values() {
        let fusion = PriceFusion::new();
        assert_eq!(fusion.kalman_filtered_price(), Fixed::ZERO);
        assert_eq!(fusion.kalman_variance(), SCALE);
        assert_eq!(fusion.kalman_q(), SCALE);
        assert_eq!(fusion.gaussian_mean(), Fixed::ZERO);
        assert_eq!(fusion.gaussian_variance(), SCALE);
        assert_eq!(fusion.gaussian_r(), SCALE / 4);
        assert_eq!(fusion.smoothing_factor(), SCALE / 2);
        assert_eq!(fusion.calculate_filtered_price().unwrap(), Fixed::ZERO);
        assert!(fusion.sink().is_empty());
    }

    #[test]
    fn test_both_filters_exact() {
        let mut fusion = PriceFusion::new();
        fusion.update_kalman_filter(Fixed::from_int(100)).unwrap();
        let price = fusion.update_gaussian_filter(Fixed::from_int(150)).unwrap();

        // 0.5 * 88.8888888888888888 + 0.5 * 120
        assert_eq!(price.raw(), 104_444_444_444_444_444_400);
        assert_eq!(fusion.calculate_filtered_price().unwrap(), price);
        assert_eq!(fusion.sequence(), 2);
    }

    #[test]
    fn test_update_both_emits_once() {
        let mut fusion = PriceFusion::new();
        let price = fusion.update_both(Fixed::from_int(100)).unwrap();

        assert_ne!(fusion.kalman_variance(), SCALE);
        assert_ne!(fusion.gaussian_variance(), SCALE);
        assert_eq!(fusion.sink().len(), 1);

        let event = fusion.sink().events()[0];
        assert_eq!(event.source, FilterKind::Both);
        assert_eq!(event.new_filtered_price, price);
    }

    #[test]
    fn test_fuse_weights() {
        let k = Fixed::from_int(10);
        let g = Fixed::from_int(20);
        assert_eq!(fuse(Fixed::ONE, k, g).unwrap(), k);
        assert_eq!(fuse(Fixed::ZERO, k, g).unwrap(), g);
        assert_eq!(fuse(Fixed::from_ratio(1, 4).unwrap(), k, g).unwrap(), Fixed::from_ratio(35, 2).unwrap());
    }

    #[test]
    fn test_failed_update_is_atomic() {
        let mut snapshot = PriceFusion::new().snapshot();
        snapshot.gaussian.variance = Fixed::from_int(4);
        let mut fusion = PriceFusion::restore(snapshot, EventLog::new()).unwrap();
        let before = fusion.snapshot();

        // Kalman step succeeds on the staged copy, Gaussian z · σ² overflows
        let result = fusion.update_both(Fixed::from_raw(i128::MAX / 2));
        assert!(matches!(result, Err(FilterError::ArithmeticOverflow { .. })));
        assert_eq!(fusion.snapshot(), before);
        assert!(fusion.sink().is_empty());
    }

    #[test]
    fn test_restore_recomputes_price() {
        let mut fusion = PriceFusion::new();
        fusion.update_kalman_filter(Fixed::from_int(42)).unwrap();
        fusion.update_gaussian_filter(Fixed::from_int(40)).unwrap();

        let mut snapshot = fusion.snapshot();
        snapshot.filtered_price = Fixed::from_int(-1);

        let restored = PriceFusion::restore(snapshot, ()).unwrap();
        assert_eq!(restored.filtered_price(), fusion.filtered_price());
        assert_eq!(restored.sequence(), 2);
        assert_eq!(restored.kalman().state(), fusion.kalman().state());
    }

    #[test]
    fn test_restore_rejects_negative_variance() {
        let mut snapshot = PriceFusion::new().snapshot();
        snapshot.gaussian.variance = Fixed::from_int(-1);
        assert!(matches!(
            PriceFusion::restore(snapshot, ()),
            Err(FilterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_with_config_validates() {
        let config = FilterConfig {
            r: Fixed::ZERO,
            ..FilterConfig::default()
        };
        assert!(PriceFusion::with_config(config).is_err());
    }
}
