//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → handlers.rs (validate, fan out, combine)
//!     → response.rs (protobuf or JSON per Accept)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use response::{Encoding, APPLICATION_PROTOBUF};
pub use server::{AppState, HttpServer};
