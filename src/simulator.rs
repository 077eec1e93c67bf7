//! Event simulator for exercising the ingest service.
//!
//! Generates plausible voice agent interactions and posts them to an ingest
//! endpoint at a fixed interval. Delivery failures are logged and skipped;
//! there is no retry.

use crate::event::Event;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Intents the mock generator draws from.
pub const INTENTS: [&str; 4] = ["BookFlight", "CheckWeather", "OrderFood", "PlayMusic"];

/// Source of simulated events.
pub trait EventGenerator: Send {
    /// Produce the next event, stamped with the current time.
    fn generate(&mut self) -> Event;
}

/// Random event generator.
///
/// Latency is uniform in [0, 1000) ms, success has probability 0.9 and
/// confidence is uniform in [0, 1).
#[derive(Debug)]
pub struct MockGenerator {
    rng: StdRng,
}

impl MockGenerator {
    /// Create a generator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventGenerator for MockGenerator {
    fn generate(&mut self) -> Event {
        let session_id = format!(
            "session-mock-{}",
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );
        let intent = INTENTS[self.rng.gen_range(0..INTENTS.len())];

        Event {
            timestamp: Utc::now(),
            session_id,
            intent: intent.to_string(),
            latency_ms: self.rng.gen_range(0..1000u32) as f64,
            success: self.rng.gen_bool(0.9),
            confidence: self.rng.gen::<f64>(),
        }
    }
}

/// Simulator error types.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Network/HTTP error
    #[error("Simulator network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Ingest endpoint returned an error response
    #[error("Ingest endpoint error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Outcome counts for a simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    pub sent: u64,
    pub failed: u64,
}

/// Periodic event poster.
pub struct Simulator<G> {
    client: reqwest::Client,
    target_url: String,
    interval: Duration,
    generator: G,
}

impl<G: EventGenerator> Simulator<G> {
    /// Create a new simulator posting to `target_url` every `interval`.
    pub fn new(
        target_url: impl Into<String>,
        interval: Duration,
        generator: G,
    ) -> Result<Self, SimulatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            target_url: target_url.into(),
            interval,
            generator,
        })
    }

    /// The ingest endpoint events are posted to.
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Post one event to the ingest endpoint.
    pub async fn post_event(&self, event: &Event) -> Result<(), SimulatorError> {
        let response = self
            .client
            .post(&self.target_url)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SimulatorError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Generate and post a single event.
    pub async fn tick(&mut self) -> Result<Event, SimulatorError> {
        let event = self.generator.generate();
        tracing::debug!(
            session_id = %event.session_id,
            intent = %event.intent,
            "Generated event"
        );
        self.post_event(&event).await?;
        Ok(event)
    }

    /// Post an event immediately, then one per interval, until `count` events
    /// have been attempted or `shutdown` resolves.
    pub async fn run<F>(mut self, count: Option<u64>, shutdown: F) -> SimulationSummary
    where
        F: Future<Output = ()>,
    {
        let mut summary = SimulationSummary::default();
        let mut ticker = tokio::time::interval(self.interval);
        tokio::pin!(shutdown);

        tracing::info!(
            "Starting event simulation against {} (interval: {}s)",
            self.target_url,
            self.interval.as_secs()
        );

        loop {
            if count.is_some_and(|limit| summary.sent + summary.failed >= limit) {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Simulation stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match self.tick().await {
                        Ok(event) => {
                            summary.sent += 1;
                            tracing::info!(
                                "Posted event {} ({}, {:.0}ms, success: {})",
                                event.session_id,
                                event.intent,
                                event.latency_ms,
                                event.success
                            );
                        }
                        Err(e) => {
                            summary.failed += 1;
                            tracing::error!("Error posting event: {}", e);
                        }
                    }
                }
            }
        }

        summary
    }
}
