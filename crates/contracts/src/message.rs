//! Message - the event envelope
//!
//! Wire format is a JSON object with `id`, `type`, `source`, `timestamp` and
//! `payload`. The payload is opaque to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ContractError;

/// Canonical event envelope
///
/// Ownership moves into the processor queue on submit; handlers only ever
/// see `&Message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Producer-assigned identifier (uniqueness is not checked)
    pub id: String,

    /// Routing key
    #[serde(rename = "type")]
    pub event_type: String,

    /// Free-form origin label
    ///
    /// Older producers emit this under the misspelled key `soruce`.
    #[serde(default, alias = "soruce")]
    pub source: String,

    /// Creation time
    #[serde(default)]
    pub timestamp: DateTime<Utc>,

    /// Arbitrary structured value, handed to handlers uninterpreted
    #[serde(default)]
    pub payload: Value,
}

impl Message {
    /// Create a message with a fresh UUID and the current time
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            source: source.into(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Decode an envelope from raw JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, ContractError> {
        serde_json::from_slice(bytes).map_err(ContractError::Decode)
    }

    /// Encode the envelope as JSON bytes
    pub fn to_json(&self) -> Result<Vec<u8>, ContractError> {
        serde_json::to_vec(self).map_err(ContractError::Encode)
    }
}
