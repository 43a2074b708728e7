//! Instance client subsystem.
//!
//! # Data Flow
//! ```text
//! Federated querier task
//!     → query.rs (path, forwarded query string, body decoder)
//!     → instance.rs (headers, timeout, one HTTP GET, buffered body)
//!     → decoded response or error.rs classification
//! ```

pub mod error;
pub mod instance;
pub mod query;

pub use error::InstanceError;
pub use instance::{InstanceClient, REQUEST_ID_HEADER, TENANT_HEADER};
pub use query::{
    ApiQuery, InstanceQuery, QueryKind, SearchQuery, TagValuesQuery, TagValuesV2Query, TagsQuery,
    TagsV2Query, TraceByIdQuery, TraceByIdV2Query,
};
