//! Windowed event store.
//!
//! Events are kept in arrival order under a dual retention policy: an event
//! stays only while it is younger than the time window AND among the newest
//! `max_events` arrivals that pass the time bound. Eviction runs after every
//! ingest and may be re-run at any time; it is idempotent for a fixed `now`.

use crate::event::Event;
use chrono::{DateTime, Duration, Utc};

/// Default retention time window (5 minutes).
pub const DEFAULT_TIME_WINDOW_SECS: u64 = 300;

/// Default retention count bound.
pub const DEFAULT_MAX_EVENTS: usize = 30;

/// Dual time + count retention bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Events at least this old are dropped
    pub time_window: Duration,
    /// Upper bound on the retained set size
    pub max_events: usize,
}

impl RetentionPolicy {
    /// Create a policy from a window length in seconds and a count bound.
    ///
    /// Windows longer than `Duration` can represent saturate at `Duration::MAX`.
    pub fn new(time_window_secs: u64, max_events: usize) -> Self {
        let time_window = i64::try_from(time_window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            time_window,
            max_events,
        }
    }

    /// Time bound: `now - timestamp < time_window`.
    pub fn is_fresh(&self, event: &Event, now: DateTime<Utc>) -> bool {
        event.age(now) < self.time_window
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_WINDOW_SECS, DEFAULT_MAX_EVENTS)
    }
}

/// Arrival-ordered store of recent events.
///
/// Single-owner: concurrent access goes through
/// [`SharedEventStore`](crate::core::SharedEventStore).
#[derive(Debug, Default)]
pub struct EventStore {
    policy: RetentionPolicy,
    events: Vec<Event>,
}

impl EventStore {
    /// Create an empty store with the given retention policy.
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            events: Vec::with_capacity(policy.max_events.saturating_add(1)),
        }
    }

    /// The retention policy in force.
    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Append an event and evict against the current time.
    ///
    /// Returns the number of events evicted.
    pub fn ingest(&mut self, event: Event) -> usize {
        self.ingest_at(event, Utc::now())
    }

    /// Append an event and evict against `now`.
    ///
    /// An event already outside the window is accepted and evicted in the
    /// same call.
    pub fn ingest_at(&mut self, event: Event, now: DateTime<Utc>) -> usize {
        self.events.push(event);
        self.prune(now)
    }

    /// Run the eviction pass against `now`, returning how many events it dropped.
    ///
    /// Applies the time bound first, then keeps the last `max_events` of what
    /// remains. Arrival order is preserved.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.events.len();
        let policy = self.policy;

        self.events.retain(|e| policy.is_fresh(e, now));

        let excess = self.events.len().saturating_sub(policy.max_events);
        if excess > 0 {
            self.events.drain(..excess);
        }

        before - self.events.len()
    }

    /// The set that would remain after [`prune`](Self::prune) at `now`,
    /// computed without mutating the store.
    pub fn retained(&self, now: DateTime<Utc>) -> Vec<Event> {
        let fresh: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| self.policy.is_fresh(e, now))
            .collect();

        let skip = fresh.len().saturating_sub(self.policy.max_events);
        fresh.into_iter().skip(skip).cloned().collect()
    }

    /// Stored events in arrival order, as of the last mutation.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
