//! Voice Metrics Service - windowed ingest and metrics for voice agent events.
//!
//! Producers post one interaction event at a time; the service keeps a
//! bounded, memory-resident window of recent events and serves summary
//! statistics over it as a scrapeable metrics listing and a JSON report.
//!
//! # Retention
//!
//! - **Time bound**: events older than the time window (default 5 minutes) are dropped
//! - **Count bound**: at most `max_events` (default 30) of the newest arrivals are kept
//! - **No persistence**: a restart starts from an empty window
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Voice Metrics Service                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐            │
//! │  │ Simulator  │──▶│  /ingest   │──▶│ Validation │            │
//! │  │ (producer) │   │   (axum)   │   │            │            │
//! │  └────────────┘   └────────────┘   └─────┬──────┘            │
//! │                                          ▼                   │
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐            │
//! │  │  /metrics  │◀──│ Aggregator │◀──│ EventStore │            │
//! │  │  /report   │   │            │   │  (mutex)   │            │
//! │  └────────────┘   └────────────┘   └────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use voice_metrics_service::{core::SharedEventStore, event::Event, report};
//! use chrono::Utc;
//!
//! let store = SharedEventStore::default();
//! store.ingest(Event::new("session-1", "PlayMusic", 180.0, true, 0.92));
//!
//! let snapshot = store.query(Utc::now());
//! assert_eq!(snapshot.total_events, 1);
//! println!("{}", report::format_metrics(&snapshot));
//! ```

pub mod config;
pub mod core;
pub mod event;
pub mod report;
pub mod stats;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "simulator")]
pub mod simulator;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, SimulatorSettings};
pub use core::{aggregate, AggregateSnapshot, EventStore, RetentionPolicy, SharedEventStore};
pub use event::{parse_event, Event, ValidationError};
pub use report::{format_metrics, Report};
pub use stats::{IngestStats, IngestStatsSnapshot};

#[cfg(feature = "server")]
pub use server::ServerConfig;

#[cfg(feature = "simulator")]
pub use simulator::{EventGenerator, MockGenerator, SimulationSummary, Simulator, SimulatorError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
