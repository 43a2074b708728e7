//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FederationConfig (validated, immutable)
//!     → instance clients built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the instance set is fixed for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::FederationConfig;
pub use schema::InstanceConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::QueryConfig;
