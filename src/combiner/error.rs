//! Combination errors.

use thiserror::Error;

/// Why per-instance results could not be turned into a response.
#[derive(Debug, Error)]
pub enum CombineError {
    #[error("no instances to combine")]
    NoInstances,

    #[error("all {failed} instances failed, first error: {cause}")]
    AllInstancesFailed { failed: u32, cause: String },

    #[error("{failed} of {queried} instances failed")]
    PartialFailure { failed: u32, queried: u32 },
}
