//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the event relay.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Contents
//! - [`Message`]: the event envelope carried from the feed to the handlers
//! - [`EventHandler`]: the capability a handler implements
//! - [`PipelineBlueprint`]: the configuration model produced by `config_loader`
//! - [`ContractError`]: the shared error taxonomy

mod blueprint;
mod error;
mod handler;
mod message;

pub use blueprint::*;
pub use error::*;
pub use handler::EventHandler;
pub use message::Message;

/// Cancellation signal passed to handlers and every blocking wait.
pub use tokio_util::sync::CancellationToken;
