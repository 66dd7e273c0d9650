//! Processor error types

use thiserror::Error;

/// Admission errors returned by [`crate::Processor::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// Queue at capacity while running; the message was dropped
    #[error("processor queue is full")]
    QueueFull,

    /// Processor is stopping or stopped
    #[error("processor is not accepting messages")]
    NotAccepting,
}
