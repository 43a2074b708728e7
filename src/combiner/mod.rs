//! Merging of per-instance results.
//!
//! # Responsibilities
//! - Turn the positional result slice from the querier into one response
//! - Count how every instance answered
//! - Decide when failures escalate to an error
//!
//! # Design Decisions
//! - Pure functions, one per response shape; no I/O, no logging besides
//!   span collision warnings
//! - Iteration is in instance order, so every tie is won by the lowest index
//! - Failed instances are dropped from the value and only show up in metadata,
//!   unless every instance failed or the policy is strict

mod error;
mod search;
mod tags;
mod trace;

pub use error::CombineError;
pub use search::combine_search;
pub use tags::{combine_tag_values, combine_tag_values_v2, combine_tags, combine_tags_v2};
pub use trace::{combine_trace_responses, combine_traces};

use crate::model::{FederationMetadata, MetadataMetrics};
use crate::querier::{InstanceResult, Outcome};

/// What to do when some, but not all, instances failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Answer with whatever the healthy instances returned.
    #[default]
    Tolerant,
    /// Any failed instance fails the request.
    Strict,
}

impl FailurePolicy {
    pub fn from_fail_on_partial(fail_on_partial: bool) -> Self {
        if fail_on_partial {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Tolerant
        }
    }
}

/// A combined value and the summary of how it was assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Combined<T> {
    pub value: T,
    pub metadata: FederationMetadata,
}

/// Count outcomes. `answered` decides whether a `Found` value counts as a
/// response or as not-found.
fn tally<T>(results: &[InstanceResult<T>], answered: impl Fn(&T) -> bool) -> FederationMetadata {
    let mut metadata = FederationMetadata {
        instances_queried: results.len() as u32,
        ..Default::default()
    };
    for result in results {
        match &result.outcome {
            Outcome::Found(value) if answered(value) => metadata.instances_responded += 1,
            Outcome::Found(_) | Outcome::NotFound => metadata.instances_not_found += 1,
            Outcome::Failed(_) => metadata.instances_failed += 1,
        }
    }
    metadata
}

/// Apply the error policy to a tally.
fn check<T>(
    results: &[InstanceResult<T>],
    metadata: &FederationMetadata,
    policy: FailurePolicy,
) -> Result<(), CombineError> {
    if results.is_empty() {
        return Err(CombineError::NoInstances);
    }
    if metadata.all_failed() {
        let cause = results
            .iter()
            .find_map(|r| r.outcome.error())
            .map(|e| format!("{}: {}", first_failed_instance(results), e))
            .unwrap_or_default();
        return Err(CombineError::AllInstancesFailed {
            failed: metadata.instances_failed,
            cause,
        });
    }
    if policy == FailurePolicy::Strict && metadata.has_failures() {
        return Err(CombineError::PartialFailure {
            failed: metadata.instances_failed,
            queried: metadata.instances_queried,
        });
    }
    Ok(())
}

fn first_failed_instance<T>(results: &[InstanceResult<T>]) -> &str {
    results
        .iter()
        .find(|r| r.outcome.is_failed())
        .map(|r| r.instance.as_str())
        .unwrap_or_default()
}

/// Tally and check in one step for shapes without a not-found state.
fn summarize<T>(
    results: &[InstanceResult<T>],
    policy: FailurePolicy,
) -> Result<FederationMetadata, CombineError> {
    let metadata = tally(results, |_| true);
    check(results, &metadata, policy)?;
    Ok(metadata)
}

/// Sum `inspected_bytes`; `None` when no instance reported metrics.
fn sum_metadata_metrics<'a>(
    metrics: impl Iterator<Item = Option<&'a MetadataMetrics>>,
) -> Option<MetadataMetrics> {
    metrics.flatten().fold(None, |acc, m| {
        let mut total = acc.unwrap_or_default();
        total.inspected_bytes = total.inspected_bytes.saturating_add(m.inspected_bytes);
        Some(total)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InstanceError;

    fn failed<T>(name: &str) -> InstanceResult<T> {
        InstanceResult::failed(
            name,
            InstanceError::Status {
                status: 503,
                body: "unavailable".into(),
            },
        )
    }

    #[test]
    fn test_tally_partitions_queried() {
        let results = vec![
            InstanceResult::found("a", 1),
            InstanceResult::found("b", 0),
            InstanceResult::not_found("c"),
            failed("d"),
        ];
        let metadata = tally(&results, |v| *v > 0);
        assert_eq!(metadata.instances_queried, 4);
        assert_eq!(metadata.instances_responded, 1);
        assert_eq!(metadata.instances_not_found, 2);
        assert_eq!(metadata.instances_failed, 1);
        assert_eq!(
            metadata.instances_responded + metadata.instances_not_found + metadata.instances_failed,
            metadata.instances_queried
        );
    }

    #[test]
    fn test_all_failed_names_first_cause() {
        let results: Vec<InstanceResult<()>> = vec![failed("east"), failed("west")];
        let err = summarize(&results, FailurePolicy::Tolerant).unwrap_err();
        match err {
            CombineError::AllInstancesFailed { failed, cause } => {
                assert_eq!(failed, 2);
                assert!(cause.starts_with("east: unexpected status 503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_strict_policy_escalates_partial_failure() {
        let results = vec![InstanceResult::found("a", ()), failed("b")];
        assert!(summarize(&results, FailurePolicy::Tolerant).is_ok());
        assert!(matches!(
            summarize(&results, FailurePolicy::Strict),
            Err(CombineError::PartialFailure {
                failed: 1,
                queried: 2
            })
        ));
    }

    #[test]
    fn test_no_instances_is_an_error() {
        let results: Vec<InstanceResult<()>> = Vec::new();
        assert!(matches!(
            summarize(&results, FailurePolicy::Tolerant),
            Err(CombineError::NoInstances)
        ));
    }

    #[test]
    fn test_metadata_metrics_sum() {
        let a = MetadataMetrics { inspected_bytes: 10 };
        let b = MetadataMetrics { inspected_bytes: 5 };
        let total = sum_metadata_metrics([Some(&a), None, Some(&b)].into_iter());
        assert_eq!(total.map(|m| m.inspected_bytes), Some(15));
        assert_eq!(sum_metadata_metrics([None, None].into_iter()), None);
    }
}
