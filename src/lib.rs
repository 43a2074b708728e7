//! Federated query layer for tracing backends.
//!
//! One request in, one request per instance out, one merged answer back.

pub mod client;
pub mod combiner;
pub mod config;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod querier;

pub use config::FederationConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use querier::FederatedQuerier;
