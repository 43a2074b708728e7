//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers, querier:
//!     → logging.rs (structured log events, request IDs)
//!     → metrics.rs (request and per-instance counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (when enabled)
//! ```
//!
//! # Design Decisions
//! - The request ID is set once at the HTTP edge and forwarded to every instance
//! - Metric calls go through the `metrics` facade and are no-ops until an
//!   exporter is installed, so tests need no setup

pub mod logging;
pub mod metrics;
