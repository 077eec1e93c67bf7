//! Interaction event types for the voice metrics service.
//!
//! An [`Event`] is one voice agent interaction as reported by a producer.
//! Events are immutable once ingested.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single voice agent interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// When the interaction happened; the ordering key for windowing
    pub timestamp: DateTime<Utc>,
    /// Opaque session identifier
    pub session_id: String,
    /// Opaque intent label
    pub intent: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: f64,
    /// Whether the interaction succeeded
    pub success: bool,
    /// Recognition confidence, nominally in [0, 1]
    pub confidence: f64,
}

impl Event {
    /// Create an event stamped with the current time.
    pub fn new(
        session_id: impl Into<String>,
        intent: impl Into<String>,
        latency_ms: f64,
        success: bool,
        confidence: f64,
    ) -> Self {
        Self::at(Utc::now(), session_id, intent, latency_ms, success, confidence)
    }

    /// Create an event with an explicit timestamp.
    pub fn at(
        timestamp: DateTime<Utc>,
        session_id: impl Into<String>,
        intent: impl Into<String>,
        latency_ms: f64,
        success: bool,
        confidence: f64,
    ) -> Self {
        Self {
            timestamp,
            session_id: session_id.into(),
            intent: intent.into(),
            latency_ms,
            success,
            confidence,
        }
    }

    /// Age of the event relative to `now`. Negative for future-dated events.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_event_serializes_camel_case() {
        let event = Event::new("s-1", "PlayMusic", 120.0, true, 0.8);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["sessionId"], "s-1");
        assert_eq!(json["intent"], "PlayMusic");
        assert_eq!(json["latencyMs"], 120.0);
        assert_eq!(json["success"], true);
        assert!(json["timestamp"].as_str().is_some());
    }

    #[test]
    fn test_event_age() {
        let now = Utc::now();
        let event = Event::at(now - Duration::seconds(30), "s", "i", 1.0, true, 0.5);
        assert_eq!(event.age(now), Duration::seconds(30));

        let future = Event::at(now + Duration::seconds(5), "s", "i", 1.0, true, 0.5);
        assert!(future.age(now) < Duration::zero());
    }
}
