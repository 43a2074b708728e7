//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check instance names are unique and endpoints are usable base URLs
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FederationConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::FederationConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no instances configured")]
    NoInstances,

    #[error("instance #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate instance name '{name}'")]
    DuplicateName { name: String },

    #[error("instance '{name}' has invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        name: String,
        endpoint: String,
        reason: String,
    },

    #[error("instance '{name}' has invalid header '{header}'")]
    InvalidHeader { name: String, header: String },

    #[error("instance '{name}' has invalid tenant id")]
    InvalidTenant { name: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: String },

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &FederationConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.query.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "query.timeout_secs".to_string(),
        });
    }

    if config.instances.is_empty() {
        errors.push(ValidationError::NoInstances);
    }

    let mut seen = HashSet::new();
    for (index, instance) in config.instances.iter().enumerate() {
        if instance.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(instance.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: instance.name.clone(),
            });
        }

        if let Err(reason) = check_endpoint(&instance.endpoint) {
            errors.push(ValidationError::InvalidEndpoint {
                name: instance.name.clone(),
                endpoint: instance.endpoint.clone(),
                reason,
            });
        }

        if instance.timeout_secs == 0 {
            errors.push(ValidationError::ZeroValue {
                field: format!("instances.{}.timeout_secs", instance.name),
            });
        }

        for (key, value) in &instance.headers {
            if HeaderName::from_bytes(key.as_bytes()).is_err()
                || HeaderValue::from_str(value).is_err()
            {
                errors.push(ValidationError::InvalidHeader {
                    name: instance.name.clone(),
                    header: key.clone(),
                });
            }
        }

        if let Some(tenant) = &instance.tenant_id {
            if HeaderValue::from_str(tenant).is_err() {
                errors.push(ValidationError::InvalidTenant {
                    name: instance.name.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(endpoint: &str) -> Result<(), String> {
    let url = Url::parse(endpoint).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() {
        return Err("endpoint must not carry a query string".to_string());
    }
    Ok(())
}
