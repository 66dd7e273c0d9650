//! Configuration validation
//!
//! Rules:
//! - field ranges and non-empty strings (derived `Validate`)
//! - handler event types unique
//! - non-zero backoff when retries are enabled

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint};
use validator::Validate;

/// Validate a PipelineBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_handler_types(blueprint)?;
    validate_retry_policy(blueprint)?;
    Ok(())
}

/// Derived field rules
fn validate_fields(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

/// Event types must be unique across handlers
fn validate_handler_types(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for handler in &blueprint.handlers {
        if !seen.insert(&handler.event_type) {
            return Err(ContractError::config_validation(
                format!("handlers[event_type={}]", handler.event_type),
                "duplicate event_type",
            ));
        }
    }
    Ok(())
}

fn validate_retry_policy(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let processor = &blueprint.processor;
    if processor.max_retries > 0 && processor.retry_delay_ms == 0 {
        return Err(ContractError::config_validation(
            "processor.retry_delay_ms",
            "retry_delay_ms must be > 0 when max_retries > 0",
        ));
    }
    Ok(())
}
