//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the federator.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the federation layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FederationConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend instances every query is fanned out to.
    pub instances: Vec<InstanceConfig>,

    /// Fan-out and combination settings.
    pub query: QueryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3200").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3200".to_string(),
        }
    }
}

/// One federated backend instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceConfig {
    /// Unique instance name, used as the result key and in logs.
    pub name: String,

    /// Base URL of the instance API. May carry a path prefix.
    pub endpoint: String,

    /// Tenant sent as `X-Scope-OrgID` on every request.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Extra headers added to every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Per-request timeout in seconds. Tighter than `query.timeout_secs` to be useful.
    #[serde(default = "default_instance_timeout")]
    pub timeout_secs: u64,
}

fn default_instance_timeout() -> u64 {
    30
}

impl InstanceConfig {
    /// Minimal instance definition with default headers and timeout.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            tenant_id: None,
            headers: BTreeMap::new(),
            timeout_secs: default_instance_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Deadline for a whole federated request in seconds.
    pub timeout_secs: u64,

    /// Fail the request when any instance fails instead of answering with
    /// the instances that did respond.
    pub fail_on_partial: bool,

    /// Result limit applied to combined searches without a `limit` parameter.
    pub search_default_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            fail_on_partial: false,
            search_default_limit: 20,
        }
    }
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
