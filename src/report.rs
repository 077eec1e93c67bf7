//! Presentation of aggregate snapshots.
//!
//! Two views are rendered from the same [`AggregateSnapshot`]: a plaintext
//! `name value` metrics listing for scrapers and a JSON report. Both round
//! averages and rates to two decimal places.

use crate::core::AggregateSnapshot;
use serde::{Deserialize, Serialize};

pub const METRIC_EVENTS_TOTAL: &str = "voice_events_total";
pub const METRIC_LATENCY_AVG: &str = "voice_latency_ms_avg";
pub const METRIC_ERROR_RATE: &str = "voice_error_rate";
pub const METRIC_CONFIDENCE_AVG: &str = "voice_confidence_avg";

/// Content type of the metrics listing.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Render the plaintext metrics listing, one `name value` pair per line.
///
/// The zero-state prints a bare `0` on every line.
pub fn format_metrics(snapshot: &AggregateSnapshot) -> String {
    if snapshot.is_zero_state() {
        return [
            METRIC_EVENTS_TOTAL,
            METRIC_LATENCY_AVG,
            METRIC_ERROR_RATE,
            METRIC_CONFIDENCE_AVG,
        ]
        .iter()
        .map(|name| format!("{name} 0\n"))
        .collect();
    }

    format!(
        "{METRIC_EVENTS_TOTAL} {}\n\
         {METRIC_LATENCY_AVG} {:.2}\n\
         {METRIC_ERROR_RATE} {:.2}\n\
         {METRIC_CONFIDENCE_AVG} {:.2}\n",
        snapshot.total_events,
        snapshot.avg_latency_ms,
        snapshot.error_rate,
        snapshot.avg_confidence
    )
}

/// JSON report body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total_events: usize,
    pub avg_latency_ms: f64,
    pub error_rate: f64,
    pub avg_confidence: f64,
}

impl From<&AggregateSnapshot> for Report {
    fn from(snapshot: &AggregateSnapshot) -> Self {
        Self {
            total_events: snapshot.total_events,
            avg_latency_ms: round2(snapshot.avg_latency_ms),
            error_rate: round2(snapshot.error_rate),
            avg_confidence: round2(snapshot.avg_confidence),
        }
    }
}

/// Round to two decimal places, half away from zero.
///
/// Values too large to scale have no fractional part and pass through.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}
