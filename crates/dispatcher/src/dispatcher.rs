//! Dispatcher - routing table from event type to handler

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use contracts::{CancellationToken, EventHandler, HandlerConfig, Message};
use observability::{record_dispatch, record_dispatch_latency_ms, DispatchOutcomeLabel};
use parking_lot::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::handlers::handler_for;

/// Result of a single dispatch
///
/// Informational only. `dispatch` never fails; callers may ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler ran and reported success
    Delivered,
    /// No handler registered for the event type
    NoHandler,
    /// Handler ran and reported failure (logged, swallowed)
    HandlerFailed,
}

impl From<DispatchOutcome> for DispatchOutcomeLabel {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Delivered => Self::Delivered,
            DispatchOutcome::NoHandler => Self::NoHandler,
            DispatchOutcome::HandlerFailed => Self::HandlerFailed,
        }
    }
}

/// Routing table
///
/// Lookups take a shared lock and release it before the handler runs, so
/// concurrent dispatches never serialize on the table.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<String, Arc<dyn EventHandler>>>,
}

impl Dispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dispatcher from configured routing entries
    pub fn from_config(configs: &[HandlerConfig]) -> Self {
        let dispatcher = Self::new();
        for config in configs {
            dispatcher.register(config.event_type.clone(), handler_for(config.kind));
        }
        dispatcher
    }

    /// Register a handler for an event type
    ///
    /// Last registration for a given type wins.
    pub fn register(&self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event_type = event_type.into();
        let handler_name = handler.name().to_string();

        let previous = self.handlers.write().insert(event_type.clone(), handler);
        if let Some(previous) = previous {
            debug!(
                event_type = %event_type,
                replaced = previous.name(),
                "replacing existing handler"
            );
        }

        observability::record_handler_registered(&event_type);
        info!(event_type = %event_type, handler = %handler_name, "handler registered");
    }

    /// Number of registered event types
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Registered event types, sorted
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Route a message to its handler
    ///
    /// Misses and handler failures are logged and swallowed.
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, cancel, message),
        fields(event_id = %message.id, event_type = %message.event_type)
    )]
    pub async fn dispatch(&self, cancel: &CancellationToken, message: &Message) -> DispatchOutcome {
        let handler = self.handlers.read().get(&message.event_type).cloned();

        let outcome = match handler {
            None => {
                warn!(event_type = %message.event_type, "no handler found");
                DispatchOutcome::NoHandler
            }
            Some(handler) => {
                let started = Instant::now();
                let result = handler.handle(cancel, message).await;
                record_dispatch_latency_ms(
                    &message.event_type,
                    started.elapsed().as_secs_f64() * 1000.0,
                );

                match result {
                    Ok(()) => DispatchOutcome::Delivered,
                    Err(e) => {
                        error!(
                            event_type = %message.event_type,
                            event_id = %message.id,
                            handler = handler.name(),
                            error = %e,
                            "handler failed"
                        );
                        DispatchOutcome::HandlerFailed
                    }
                }
            }
        };

        record_dispatch(&message.event_type, outcome.into());
        outcome
    }
}
