//! Search result union.

use std::collections::HashMap;

use crate::combiner::{summarize, Combined, CombineError, FailurePolicy};
use crate::model::{SearchMetrics, SearchResponse, TraceSearchMetadata};
use crate::querier::{InstanceResult, Outcome};

/// Union trace summaries from every responding instance.
///
/// Each trace ID appears once. Copies reported by several instances (or twice
/// by one) are merged into the first one seen, see `merge_summary`. Results
/// are ordered newest first and cut to `limit` when one is given; the HTTP
/// layer always passes one, falling back to the configured default. Search
/// metrics are summed.
pub fn combine_search(
    results: Vec<InstanceResult<SearchResponse>>,
    limit: Option<usize>,
    policy: FailurePolicy,
) -> Result<Combined<SearchResponse>, CombineError> {
    let mut metadata = summarize(&results, policy)?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut traces: Vec<TraceSearchMetadata> = Vec::new();
    let mut metrics: Option<SearchMetrics> = None;

    for result in results {
        let Outcome::Found(response) = result.outcome else {
            continue;
        };
        if let Some(instance_metrics) = &response.metrics {
            metrics
                .get_or_insert_with(SearchMetrics::default)
                .accumulate(instance_metrics);
        }
        for trace in response.traces {
            match index.get(&trace.trace_id) {
                Some(&kept) => merge_summary(&mut traces[kept], trace),
                None => {
                    index.insert(trace.trace_id.clone(), traces.len());
                    traces.push(trace);
                }
            }
        }
    }

    // stable, so equal start times keep instance order
    traces.sort_by(|a, b| b.start_time_unix_nano.cmp(&a.start_time_unix_nano));
    if let Some(limit) = limit.filter(|l| *l > 0) {
        traces.truncate(limit);
    }

    metadata.total_items = traces.len() as u32;
    Ok(Combined {
        value: SearchResponse {
            traces,
            metrics,
            federation: Some(metadata),
        },
        metadata,
    })
}

/// Fold a duplicate summary into the kept one: earliest start, longest
/// duration, root names filled when missing, span sets appended.
fn merge_summary(kept: &mut TraceSearchMetadata, other: TraceSearchMetadata) {
    if kept.start_time_unix_nano == 0
        || (other.start_time_unix_nano != 0
            && other.start_time_unix_nano < kept.start_time_unix_nano)
    {
        kept.start_time_unix_nano = other.start_time_unix_nano;
    }
    kept.duration_ms = kept.duration_ms.max(other.duration_ms);
    if kept.root_service_name.is_empty() {
        kept.root_service_name = other.root_service_name;
    }
    if kept.root_trace_name.is_empty() {
        kept.root_trace_name = other.root_trace_name;
    }
    kept.span_sets.extend(other.span_sets);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InstanceError;
    use crate::model::SpanSet;

    fn summary(id: &str, start: u64) -> TraceSearchMetadata {
        TraceSearchMetadata {
            trace_id: id.into(),
            root_service_name: "api".into(),
            start_time_unix_nano: start,
            ..Default::default()
        }
    }

    fn response(traces: Vec<TraceSearchMetadata>, inspected: u32) -> SearchResponse {
        SearchResponse {
            traces,
            metrics: Some(SearchMetrics {
                inspected_traces: inspected,
                inspected_bytes: 100,
                ..Default::default()
            }),
            federation: None,
        }
    }

    #[test]
    fn test_union_sorted_newest_first() {
        let results = vec![
            InstanceResult::found("a", response(vec![summary("t1", 10), summary("t2", 30)], 5)),
            InstanceResult::found("b", response(vec![summary("t3", 20)], 7)),
        ];
        let combined = combine_search(results, None, FailurePolicy::Tolerant).unwrap();

        let ids: Vec<_> = combined.value.traces.iter().map(|t| t.trace_id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t3", "t1"]);
        let metrics = combined.value.metrics.unwrap();
        assert_eq!(metrics.inspected_traces, 12);
        assert_eq!(metrics.inspected_bytes, 200);
        assert_eq!(combined.metadata.total_items, 3);
        assert_eq!(combined.value.federation, Some(combined.metadata));
    }

    #[test]
    fn test_duplicate_trace_ids_keep_first_names() {
        let mut first = summary("t1", 10);
        first.root_trace_name = "from-a".into();
        let mut second = summary("t1", 10);
        second.root_trace_name = "from-b".into();

        let results = vec![
            InstanceResult::found("a", response(vec![first], 1)),
            InstanceResult::found("b", response(vec![second], 1)),
        ];
        let combined = combine_search(results, None, FailurePolicy::Tolerant).unwrap();
        assert_eq!(combined.value.traces.len(), 1);
        assert_eq!(combined.value.traces[0].root_trace_name, "from-a");
        assert_eq!(combined.metadata.total_items, 1);
    }

    #[test]
    fn test_duplicates_merge_earliest_start_and_longest_duration() {
        let second: u64 = 1_000_000_000;
        let hour_ms: u32 = 3_600_000;
        let base: u64 = 1_700_000_000 * second;

        let mut later = summary("t1", base + second);
        later.duration_ms = 1_000;
        later.root_service_name = String::new();
        let mut earliest = summary("t1", base);
        earliest.duration_ms = hour_ms;
        earliest.root_service_name = "checkout".into();
        earliest.span_sets = vec![SpanSet {
            matched: 2,
            ..Default::default()
        }];
        let mut last = summary("t1", base + 3_600 * second);
        last.duration_ms = 1;
        last.root_trace_name = "GET /cart".into();
        last.span_sets = vec![SpanSet {
            matched: 1,
            ..Default::default()
        }];

        let results = vec![
            InstanceResult::found("a", response(vec![later, earliest], 1)),
            InstanceResult::found("b", response(vec![last], 1)),
        ];
        let combined = combine_search(results, None, FailurePolicy::Tolerant).unwrap();

        assert_eq!(combined.value.traces.len(), 1);
        let trace = &combined.value.traces[0];
        assert_eq!(trace.start_time_unix_nano, base);
        assert_eq!(trace.duration_ms, hour_ms);
        assert_eq!(trace.root_service_name, "checkout");
        assert_eq!(trace.root_trace_name, "GET /cart");
        assert_eq!(trace.span_sets.len(), 2);
    }

    #[test]
    fn test_limit_truncates() {
        let results = vec![InstanceResult::found(
            "a",
            response(vec![summary("t1", 1), summary("t2", 2), summary("t3", 3)], 3),
        )];
        let combined = combine_search(results, Some(2), FailurePolicy::Tolerant).unwrap();
        assert_eq!(combined.value.traces.len(), 2);
        assert_eq!(combined.value.traces[0].trace_id, "t3");
    }

    #[test]
    fn test_partial_failure_is_tolerated() {
        let results = vec![
            InstanceResult::found("a", response(vec![summary("t1", 1)], 1)),
            InstanceResult::failed("b", InstanceError::DeadlineExceeded),
        ];
        let combined = combine_search(results, None, FailurePolicy::Tolerant).unwrap();
        assert_eq!(combined.value.traces.len(), 1);
        assert_eq!(combined.metadata.instances_failed, 1);
        assert_eq!(combined.metadata.instances_responded, 1);
    }

    #[test]
    fn test_empty_results_are_normal() {
        let results = vec![InstanceResult::found("a", SearchResponse::default())];
        let combined = combine_search(results, None, FailurePolicy::Tolerant).unwrap();
        assert!(combined.value.traces.is_empty());
        assert!(combined.value.metrics.is_none());
    }
}
