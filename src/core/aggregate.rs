//! Summary statistics over a retained event set.

use crate::event::Event;
use serde::{Deserialize, Serialize};

/// Statistics derived from one retained set at one instant.
///
/// Values are unrounded; formatting belongs to [`crate::report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    /// Number of retained events
    pub total_events: usize,
    /// Mean latency in milliseconds
    pub avg_latency_ms: f64,
    /// Fraction of retained events that failed
    pub error_rate: f64,
    /// Mean confidence
    pub avg_confidence: f64,
}

impl AggregateSnapshot {
    /// The all-zero snapshot reported for an empty retained set.
    pub const ZERO: AggregateSnapshot = AggregateSnapshot {
        total_events: 0,
        avg_latency_ms: 0.0,
        error_rate: 0.0,
        avg_confidence: 0.0,
    };

    /// Check if this is the zero-state.
    pub fn is_zero_state(&self) -> bool {
        self.total_events == 0
    }
}

/// Reduce an event sequence into an [`AggregateSnapshot`].
pub fn aggregate(events: &[Event]) -> AggregateSnapshot {
    if events.is_empty() {
        return AggregateSnapshot::ZERO;
    }

    let total = events.len() as f64;
    let success_count = events.iter().filter(|e| e.success).count();

    AggregateSnapshot {
        total_events: events.len(),
        avg_latency_ms: mean(events.iter().map(|e| e.latency_ms), total),
        error_rate: 1.0 - success_count as f64 / total,
        avg_confidence: mean(events.iter().map(|e| e.confidence), total),
    }
}

/// Mean of `values` over `total` items.
///
/// Each term is scaled before summing, so the result stays finite whenever
/// every input is finite.
fn mean(values: impl Iterator<Item = f64>, total: f64) -> f64 {
    values.map(|v| v / total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(latency_ms: f64, success: bool, confidence: f64) -> Event {
        Event::new("session", "OrderFood", latency_ms, success, confidence)
    }

    #[test]
    fn test_zero_state() {
        let snapshot = aggregate(&[]);
        assert_eq!(snapshot, AggregateSnapshot::ZERO);
        assert!(snapshot.is_zero_state());
        assert!(!snapshot.avg_latency_ms.is_nan());
        assert!(!snapshot.error_rate.is_nan());
        assert!(!snapshot.avg_confidence.is_nan());
    }

    #[test]
    fn test_aggregate_three_events() {
        let events = vec![
            make_event(100.0, true, 0.9),
            make_event(200.0, false, 0.5),
            make_event(300.0, true, 0.7),
        ];

        let snapshot = aggregate(&events);
        assert_eq!(snapshot.total_events, 3);
        assert!((snapshot.avg_latency_ms - 200.0).abs() < 1e-9);
        assert!((snapshot.error_rate - 1.0 / 3.0).abs() < 1e-9);
        assert!((snapshot.avg_confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_all_failures() {
        let events = vec![make_event(50.0, false, 0.1), make_event(70.0, false, 0.3)];
        let snapshot = aggregate(&events);
        assert_eq!(snapshot.error_rate, 1.0);
        assert!((snapshot.avg_latency_ms - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let events = vec![make_event(1e308, true, 1e308), make_event(1e308, true, 1e308)];
        let snapshot = aggregate(&events);
        assert_eq!(snapshot.avg_latency_ms, 1e308);
        assert_eq!(snapshot.avg_confidence, 1e308);
    }

    #[test]
    fn test_mixed_sign_extremes_stay_finite() {
        let events = vec![
            make_event(0.0, true, f64::MAX),
            make_event(0.0, true, -f64::MAX),
        ];
        let snapshot = aggregate(&events);
        assert!(snapshot.avg_confidence.is_finite());
        assert_eq!(snapshot.avg_confidence, 0.0);
    }

    #[test]
    fn test_aggregate_is_pure() {
        let events = vec![make_event(10.0, true, 1.0), make_event(30.0, false, 0.0)];
        let before = events.clone();

        let first = aggregate(&events);
        let second = aggregate(&events);

        assert_eq!(first, second);
        assert_eq!(events, before);
    }
}
