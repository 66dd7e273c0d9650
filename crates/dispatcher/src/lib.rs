//! # Dispatcher
//!
//! Type-keyed event routing.
//!
//! Responsibilities:
//! - Map event type strings to registered `EventHandler`s
//! - Invoke exactly one handler per message
//! - Absorb routing misses and handler failures as logged outcomes

pub mod dispatcher;
pub mod handlers;

pub use contracts::{EventHandler, Message};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use handlers::{handler_for, LogHandler, NoopHandler};
