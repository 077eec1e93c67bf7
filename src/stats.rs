//! Lifetime ingestion counters.
//!
//! Tracks how many events were accepted, rejected and evicted since the
//! process started. Counters are memory-resident and reset on restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free ingestion counters.
#[derive(Debug)]
pub struct IngestStats {
    /// Events that passed validation and entered the store
    accepted: AtomicU64,
    /// Payloads refused by validation
    rejected: AtomicU64,
    /// Events dropped by retention
    evicted: AtomicU64,
    /// Process start time
    started_at: DateTime<Utc>,
}

impl IngestStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Record an accepted event.
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected payload.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record evicted events.
    pub fn record_evicted(&self, count: u64) {
        if count > 0 {
            self.evicted.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Get the current counter values.
    pub fn snapshot(&self) -> IngestStatsSnapshot {
        IngestStatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Ingest Statistics:\n\
             - Events accepted: {}\n\
             - Payloads rejected: {}\n\
             - Events evicted: {}\n\
             - Uptime: {} seconds",
            stats.accepted, stats.rejected, stats.evicted, stats.uptime_secs
        )
    }
}

impl Default for IngestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStatsSnapshot {
    pub accepted: u64,
    pub rejected: u64,
    pub evicted: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = IngestStats::new();

        stats.record_accepted();
        stats.record_accepted();
        stats.record_rejected();
        stats.record_evicted(3);
        stats.record_evicted(0);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.accepted, 2);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.evicted, 3);
    }

    #[test]
    fn test_summary_format() {
        let summary = IngestStats::new().summary();
        assert!(summary.contains("Events accepted: 0"));
        assert!(summary.contains("Payloads rejected: 0"));
        assert!(summary.contains("Uptime"));
    }
}
