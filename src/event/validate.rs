//! Payload validation for inbound events.
//!
//! The store only ever sees events that passed through [`parse_event`].

use crate::event::types::Event;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Reasons an inbound payload is rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Body is not a JSON object carrying every field with the right type
    #[error("Invalid event payload: {0}")]
    Malformed(String),
    /// `timestamp` is present but not an RFC 3339 instant
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
    /// A required text field is empty
    #[error("Invalid event payload: `{0}` must not be empty")]
    EmptyField(&'static str),
    /// `latencyMs` is negative or not finite
    #[error("Invalid event payload: `latencyMs` must be a non-negative number, got {0}")]
    NegativeLatency(f64),
}

impl ValidationError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Malformed(_) => "MALFORMED_EVENT",
            ValidationError::InvalidTimestamp(_) => "INVALID_TIMESTAMP",
            ValidationError::EmptyField(_) => "EMPTY_FIELD",
            ValidationError::NegativeLatency(_) => "NEGATIVE_LATENCY",
        }
    }
}

/// Wire shape before timestamp parsing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    timestamp: String,
    session_id: String,
    intent: String,
    latency_ms: f64,
    success: bool,
    confidence: f64,
}

/// Parse and validate a raw JSON body into an [`Event`].
pub fn parse_event(body: &[u8]) -> Result<Event, ValidationError> {
    let raw: RawEvent =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    validate(raw)
}

/// Validate an already-decoded JSON value.
pub fn event_from_value(value: serde_json::Value) -> Result<Event, ValidationError> {
    let raw: RawEvent =
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    validate(raw)
}

fn validate(raw: RawEvent) -> Result<Event, ValidationError> {
    let timestamp = parse_timestamp(&raw.timestamp)?;

    if raw.session_id.is_empty() {
        return Err(ValidationError::EmptyField("sessionId"));
    }
    if raw.intent.is_empty() {
        return Err(ValidationError::EmptyField("intent"));
    }
    if !raw.latency_ms.is_finite() || raw.latency_ms < 0.0 {
        return Err(ValidationError::NegativeLatency(raw.latency_ms));
    }

    Ok(Event {
        timestamp,
        session_id: raw.session_id,
        intent: raw.intent,
        latency_ms: raw.latency_ms,
        success: raw.success,
        confidence: raw.confidence,
    })
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidTimestamp(format!("'{text}': {e}")))
}
