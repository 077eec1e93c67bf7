//! Core functionality for the voice metrics service.
//!
//! This module contains:
//! - The windowed event store and its retention policy
//! - Aggregation of a retained set into summary statistics
//! - The mutex-guarded handle shared by request handlers

pub mod aggregate;
pub mod shared;
pub mod store;

// Re-export commonly used types
pub use aggregate::{aggregate, AggregateSnapshot};
pub use shared::SharedEventStore;
pub use store::{EventStore, RetentionPolicy, DEFAULT_MAX_EVENTS, DEFAULT_TIME_WINDOW_SECS};
