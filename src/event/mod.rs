//! Event model and inbound validation.
//!
//! Producers deliver raw JSON; [`validate::parse_event`] turns it into a typed
//! [`Event`] or a [`ValidationError`] before anything reaches the store.

pub mod types;
pub mod validate;

// Re-export commonly used types
pub use types::Event;
pub use validate::{event_from_value, parse_event, ValidationError};
