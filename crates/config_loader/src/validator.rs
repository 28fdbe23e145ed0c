//! Configuration validation
//!
//! Rules:
//! - drain_batch_size > 0
//! - seed pool kinds unique and non-empty
//! - target ids unique and non-empty
//! - file targets carry a `path` parameter

use std::collections::HashSet;

use contracts::{ContractError, RouterConfig, TargetKind};

/// Validate a RouterConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RouterConfig) -> Result<(), ContractError> {
    validate_drain(config)?;
    validate_seed_pools(config)?;
    validate_targets(config)?;
    Ok(())
}

fn validate_drain(config: &RouterConfig) -> Result<(), ContractError> {
    if config.drain_batch_size == 0 {
        return Err(ContractError::config_validation(
            "drain_batch_size",
            "drain_batch_size must be > 0",
        ));
    }
    Ok(())
}

fn validate_seed_pools(config: &RouterConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, seed) in config.seed_pools.iter().enumerate() {
        if seed.kind.is_empty() {
            return Err(ContractError::config_validation(
                format!("seed_pools[{idx}].kind"),
                "kind cannot be empty",
            ));
        }
        if !seen.insert(seed.kind.as_str()) {
            return Err(ContractError::config_validation(
                format!("seed_pools[kind={}]", seed.kind),
                "duplicate seed pool kind",
            ));
        }
    }
    Ok(())
}

fn validate_targets(config: &RouterConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, target) in config.targets.iter().enumerate() {
        if target.id.is_empty() {
            return Err(ContractError::config_validation(
                format!("targets[{idx}].id"),
                "target id cannot be empty",
            ));
        }
        if !seen.insert(target.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("targets[id={}]", target.id),
                "duplicate target id",
            ));
        }
        if target.kind == TargetKind::File && !target.params.contains_key("path") {
            return Err(ContractError::config_validation(
                format!("targets[id={}].params.path", target.id),
                "file target requires a 'path' parameter",
            ));
        }
    }
    Ok(())
}
