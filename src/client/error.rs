//! Instance call errors.

use thiserror::Error;

/// Why a single instance call produced no usable answer.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The instance answered 404. Only trace lookups treat this as an answer.
    #[error("not found")]
    NotFound,

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("query deadline exceeded")]
    DeadlineExceeded,

    #[error("query canceled")]
    Canceled,

    #[error("instance task failed: {0}")]
    Task(String),
}

impl InstanceError {
    /// Failure reason label on the instance query metric.
    pub fn label(&self) -> &'static str {
        match self {
            InstanceError::InvalidEndpoint(_)
            | InstanceError::InvalidHeader(_)
            | InstanceError::Client(_) => "config",
            InstanceError::Transport(_) => "transport",
            InstanceError::NotFound => "not_found",
            InstanceError::Status { .. } => "status",
            InstanceError::Decode(_) => "decode",
            InstanceError::DeadlineExceeded => "deadline",
            InstanceError::Canceled => "canceled",
            InstanceError::Task(_) => "task",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::querier::Outcome;

    #[test]
    fn test_failure_reason_labels() {
        assert_eq!(InstanceError::DeadlineExceeded.label(), "deadline");
        assert_eq!(
            InstanceError::Status {
                status: 500,
                body: String::new()
            }
            .label(),
            "status"
        );
        let decode = serde_json::from_str::<u32>("x").unwrap_err();
        assert_eq!(InstanceError::Decode(decode).label(), "decode");
    }

    #[test]
    fn test_reason_of_successful_outcome_is_none() {
        let found: Outcome<u32> = Outcome::Found(1);
        assert_eq!(found.error().map_or("none", InstanceError::label), "none");
        let failed: Outcome<u32> = Outcome::Failed(InstanceError::Canceled);
        assert_eq!(failed.error().map_or("none", InstanceError::label), "canceled");
    }
}
