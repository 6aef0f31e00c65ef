//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject duplicate networks and unparseable endpoints
//! - Validate value ranges (timeouts > 0, concurrency > 0)
//! - Check the destination address before a sweep
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Endpoints containing `${VAR}` are checked at connect time instead

use alloy::primitives::Address;
use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::{AccountSource, SweeperConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination address is not configured")]
    MissingDestination,

    #[error("destination '{0}' is not a valid address")]
    InvalidDestination(String),

    #[error("no networks configured")]
    NoNetworks,

    #[error("network '{0}' is configured more than once")]
    DuplicateNetwork(String),

    #[error("chain id {0} is configured more than once")]
    DuplicateChainId(u64),

    #[error("network '{network}' has an invalid RPC URL '{url}'")]
    InvalidRpcUrl { network: String, url: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("accounts.env_keys is empty")]
    NoEnvKeys,
}

/// Validate everything a read-only command needs.
pub fn validate_config(config: &SweeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.networks.is_empty() {
        errors.push(ValidationError::NoNetworks);
    }

    let mut names = HashSet::new();
    let mut chain_ids = HashSet::new();
    for network in &config.networks {
        if !names.insert(network.name.as_str()) {
            errors.push(ValidationError::DuplicateNetwork(network.name.clone()));
        }
        if !chain_ids.insert(network.chain_id) {
            errors.push(ValidationError::DuplicateChainId(network.chain_id));
        }
        if !network.rpc_url.contains("${") && url::Url::parse(&network.rpc_url).is_err() {
            errors.push(ValidationError::InvalidRpcUrl {
                network: network.name.clone(),
                url: network.rpc_url.clone(),
            });
        }
    }

    let sweep = &config.sweep;
    let positive = [
        ("sweep.max_concurrent_networks", sweep.max_concurrent_networks as u64),
        ("sweep.max_concurrent_accounts", sweep.max_concurrent_accounts as u64),
        ("sweep.rpc_timeout_secs", sweep.rpc_timeout_secs),
        ("sweep.confirmation_timeout_secs", sweep.confirmation_timeout_secs),
        ("sweep.receipt_poll_interval_ms", sweep.receipt_poll_interval_ms),
        ("sweep.fallback_gas_price_gwei", sweep.fallback_gas_price_gwei),
        ("sweep.transfer_gas_limit", sweep.transfer_gas_limit),
        ("sweep.connect_attempts", sweep.connect_attempts as u64),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    if config.accounts.source == AccountSource::Env && config.accounts.env_keys.is_empty() {
        errors.push(ValidationError::NoEnvKeys);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a configuration for a sweep run and return the destination.
pub fn validate_for_sweep(config: &SweeperConfig) -> Result<Address, Vec<ValidationError>> {
    let mut errors = validate_config(config).err().unwrap_or_default();

    let destination = match config.destination.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(ValidationError::MissingDestination);
            None
        }
        Some(raw) => match raw.parse::<Address>() {
            Ok(address) if address != Address::ZERO => Some(address),
            _ => {
                errors.push(ValidationError::InvalidDestination(raw.to_string()));
                None
            }
        },
    };

    match destination {
        Some(address) if errors.is_empty() => Ok(address),
        _ => Err(errors),
    }
}
