//! Built-in handler implementations
//!
//! Contains LogHandler and NoopHandler.

mod log;
mod noop;

use std::sync::Arc;

use contracts::{EventHandler, HandlerKind};

pub use self::log::LogHandler;
pub use self::noop::NoopHandler;

/// Instantiate the built-in handler for a configured kind
pub fn handler_for(kind: HandlerKind) -> Arc<dyn EventHandler> {
    match kind {
        HandlerKind::Log => Arc::new(LogHandler::new()),
        HandlerKind::Noop => Arc::new(NoopHandler),
    }
}
