//! Messages exchanged with observers.

use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::error::{BookcastError, BookcastResult};

/// Events pushed from the server to observers.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full list, newest first. Sent once to a newly connected observer.
    Snapshot(Vec<Booking>),
    /// A booking was admitted to the store.
    Created(Booking),
    /// A booking changed in place.
    Updated(Booking),
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
        }
    }
}

/// Intents sent by observers.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientIntent {
    /// Mark a booking confirmed.
    Confirm { id: String },
}

impl ClientIntent {
    /// Parse and validate a raw text frame.
    pub fn parse(text: &str) -> BookcastResult<Self> {
        let intent: Self = serde_json::from_str(text)
            .map_err(|e| BookcastError::MalformedMessage(e.to_string()))?;

        let Self::Confirm { id } = &intent;
        if id.trim().is_empty() {
            return Err(BookcastError::MalformedMessage(
                "confirm requires a non-empty id".to_string(),
            ));
        }
        Ok(intent)
    }
}
