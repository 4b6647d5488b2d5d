use serde::{Deserialize, Serialize};

use crate::numeric::Fixed;

/// Which estimator an update was routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Kalman,
    Gaussian,
    /// Same observation applied to both estimators in one call
    Both,
}

impl FilterKind {
    #[inline(always)]
    pub fn touches_kalman(self) -> bool {
        matches!(self, FilterKind::Kalman | FilterKind::Both)
    }

    #[inline(always)]
    pub fn touches_gaussian(self) -> bool {
        matches!(self, FilterKind::Gaussian | FilterKind::Both)
    }
}

/// Notification emitted once per successful update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredPriceUpdated {
    /// 1-based position in the instance's notification stream
    pub sequence: u64,

    /// Estimator that produced the change
    pub source: FilterKind,

    /// Freshly recomputed fused price
    pub new_filtered_price: Fixed,
}

/// Receiver of filtered price notifications, in call order
pub trait PriceSink {
    fn publish(&mut self, event: &FilteredPriceUpdated);
}

/// Discards every notification
impl PriceSink for () {
    #[inline(always)]
    fn publish(&mut self, _event: &FilteredPriceUpdated) {}
}

impl<S: PriceSink + ?Sized> PriceSink for &mut S {
    #[inline]
    fn publish(&mut self, event: &FilteredPriceUpdated) {
        (**self).publish(event)
    }
}

impl<S: PriceSink + ?Sized> PriceSink for Box<S> {
    #[inline]
    fn publish(&mut self, event: &FilteredPriceUpdated) {
        (**self).publish(event)
    }
}

/// In-memory ordered record of every notification
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<FilteredPriceUpdated>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn events(&self) -> &[FilteredPriceUpdated] {
        &self.events
    }

    #[inline]
    pub fn last(&self) -> Option<&FilteredPriceUpdated> {
        self.events.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand the recorded events to the caller and start over
    pub fn drain(&mut self) -> Vec<FilteredPriceUpdated> {
        std::mem::take(&mut self.events)
    }
}

impl PriceSink for EventLog {
    #[inline]
    fn publish(&mut self, event: &FilteredPriceUpdated) {
        self.events.push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(sequence: u64) -> FilteredPriceUpdated {
        FilteredPriceUpdated {
            sequence,
            source: FilterKind::Kalman,
            new_filtered_price: Fixed::from_int(sequence as i64),
        }
    }

    #[test]
    fn test_event_log_keeps_order() {
        let mut log = EventLog::new();
        for i in 1..=3 {
            log.publish(&event(i));
        }

        let sequences: Vec<u64> = log.events().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(log.last().map(|e| e.sequence), Some(3));

        let drained = log.drain();
        assert_eq!(drained.len(), 3);
        assert!(log.is_empty());
    }

    fn publish_via<S: PriceSink>(mut sink: S, event: &FilteredPriceUpdated) {
        sink.publish(event);
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        let mut log = EventLog::new();
        publish_via(&mut log, &event(1));
        publish_via(Box::new(&mut log), &event(2));
        assert_eq!(log.len(), 2);

        // Unit sink swallows everything
        publish_via((), &event(3));
    }

    #[test]
    fn test_routing() {
        assert!(FilterKind::Kalman.touches_kalman());
        assert!(!FilterKind::Kalman.touches_gaussian());
        assert!(FilterKind::Both.touches_kalman() && FilterKind::Both.touches_gaussian());
    }
}
