//! Layered error definitions
//!
//! Categorized by source: config / codec / handler / feed

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Codec Errors =====
    /// Envelope could not be decoded
    #[error("message decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Envelope could not be encoded
    #[error("message encode error: {0}")]
    Encode(#[source] serde_json::Error),

    // ===== Handler Errors =====
    /// Handler reported a failure
    #[error("handler '{handler}' failed: {message}")]
    HandlerFailed { handler: String, message: String },

    // ===== Feed Errors =====
    /// Feed connection error
    #[error("feed connection error at '{addr}': {message}")]
    FeedConnection { addr: String, message: String },

    /// Publish error
    #[error("publish to '{channel}' failed: {message}")]
    Publish { channel: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create handler failure error
    pub fn handler_failed(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerFailed {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create feed connection error
    pub fn feed_connection(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FeedConnection {
            addr: addr.into(),
            message: message.into(),
        }
    }

    /// Create publish error
    pub fn publish(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            channel: channel.into(),
            message: message.into(),
        }
    }
}
