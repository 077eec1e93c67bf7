//! Thread-safe handle to the process-wide event store.
//!
//! Every read and write of the stored sequence runs inside one mutex, so an
//! append can never be observed before its eviction pass has completed.

use crate::core::aggregate::{aggregate, AggregateSnapshot};
use crate::core::store::{EventStore, RetentionPolicy};
use crate::event::Event;
use crate::stats::IngestStats;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable, shared owner of an [`EventStore`].
#[derive(Debug, Clone)]
pub struct SharedEventStore {
    inner: Arc<Mutex<EventStore>>,
    stats: Arc<IngestStats>,
}

impl SharedEventStore {
    /// Create an empty shared store.
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventStore::new(policy))),
            stats: Arc::new(IngestStats::new()),
        }
    }

    // No operation leaves the store half-updated across a panic, so a
    // poisoned lock still guards a consistent sequence.
    fn lock(&self) -> MutexGuard<'_, EventStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ingest an event, evicting against the current time.
    pub fn ingest(&self, event: Event) -> usize {
        self.ingest_at(event, Utc::now())
    }

    /// Ingest an event, evicting against `now`. Returns the evicted count.
    pub fn ingest_at(&self, event: Event, now: DateTime<Utc>) -> usize {
        let evicted = self.lock().ingest_at(event, now);
        self.stats.record_accepted();
        self.stats.record_evicted(evicted as u64);
        evicted
    }

    /// Prune against `now` and aggregate what remains.
    pub fn query(&self, now: DateTime<Utc>) -> AggregateSnapshot {
        let (snapshot, evicted) = {
            let mut store = self.lock();
            let evicted = store.prune(now);
            (aggregate(store.events()), evicted)
        };
        self.stats.record_evicted(evicted as u64);
        snapshot
    }

    /// Retained set at `now`, without pruning.
    pub fn retained(&self, now: DateTime<Utc>) -> Vec<Event> {
        self.lock().retained(now)
    }

    /// Number of stored events as of the last mutation.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The retention policy in force.
    pub fn policy(&self) -> RetentionPolicy {
        self.lock().policy()
    }

    /// Record a payload refused before reaching the store.
    pub fn record_rejected(&self) {
        self.stats.record_rejected();
    }

    /// Lifetime ingestion counters.
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }
}

impl Default for SharedEventStore {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::DEFAULT_MAX_EVENTS;
    use chrono::Duration;
    use std::thread;

    fn make_event(session: &str, latency_ms: f64, success: bool, confidence: f64) -> Event {
        Event::new(session, "CheckWeather", latency_ms, success, confidence)
    }

    #[test]
    fn test_query_empty_store() {
        let store = SharedEventStore::default();
        assert_eq!(store.query(Utc::now()), AggregateSnapshot::ZERO);
    }

    #[test]
    fn test_query_aggregates_retained_set() {
        let store = SharedEventStore::default();
        store.ingest(make_event("a", 100.0, true, 0.9));
        store.ingest(make_event("b", 200.0, false, 0.5));
        store.ingest(make_event("c", 300.0, true, 0.7));

        let snapshot = store.query(Utc::now());
        assert_eq!(snapshot.total_events, 3);
        assert!((snapshot.avg_latency_ms - 200.0).abs() < 1e-9);
        assert!((snapshot.error_rate - 0.33).abs() < 0.01);
        assert!((snapshot.avg_confidence - 0.70).abs() < 0.01);
    }

    #[test]
    fn test_query_is_idempotent() {
        let store = SharedEventStore::new(RetentionPolicy::new(60, 2));
        let now = Utc::now();
        for i in 0..4 {
            store.ingest_at(make_event(&format!("s{i}"), 10.0 * i as f64, true, 0.5), now);
        }

        let later = now + Duration::seconds(30);
        assert_eq!(store.query(later), store.query(later));
        assert_eq!(store.retained(later), store.retained(later));
    }

    #[test]
    fn test_count_bound_through_shared_store() {
        let store = SharedEventStore::default();
        let now = Utc::now();
        let k = 7;

        for i in 0..DEFAULT_MAX_EVENTS + k {
            store.ingest_at(make_event(&format!("s{i}"), 1.0, true, 0.5), now);
        }

        let retained = store.retained(now);
        assert_eq!(retained.len(), DEFAULT_MAX_EVENTS);
        assert_eq!(retained[0].session_id, format!("s{k}"));
        assert_eq!(
            retained[DEFAULT_MAX_EVENTS - 1].session_id,
            format!("s{}", DEFAULT_MAX_EVENTS + k - 1)
        );
        assert_eq!(store.stats().snapshot().evicted, k as u64);
    }

    #[test]
    fn test_time_bound_through_query() {
        let store = SharedEventStore::default();
        let now = Utc::now();
        store.ingest_at(make_event("a", 1.0, true, 0.5), now);

        let past_window = now + Duration::minutes(6);
        assert_eq!(store.query(past_window).total_events, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_ingest() {
        let store = SharedEventStore::default();
        let threads = 8;
        let per_thread = 10;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        store.ingest(make_event(&format!("t{t}-{i}"), 5.0, true, 0.5));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let total = threads * per_thread;
        let snapshot = store.query(Utc::now());
        assert_eq!(snapshot.total_events, total.min(DEFAULT_MAX_EVENTS));
        assert_eq!(store.stats().snapshot().accepted, total as u64);

        let retained = store.retained(Utc::now());
        let mut ids: Vec<_> = retained.iter().map(|e| e.session_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), retained.len());
    }

    #[test]
    fn test_concurrent_ingest_below_bound() {
        let store = SharedEventStore::default();
        let n = 12;

        let handles: Vec<_> = (0..n)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || store.ingest(make_event(&format!("s{i}"), 1.0, true, 1.0)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.query(Utc::now()).total_events, n);
    }
}
