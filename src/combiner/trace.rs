//! Trace assembly across instances.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use prost::Message;

use crate::combiner::{check, tally, Combined, CombineError, FailurePolicy};
use crate::model::{
    ResourceSpans, ScopeSpans, Span, Trace, TraceByIdMetrics, TraceByIdResponse, STATUS_COMPLETE,
    STATUS_PARTIAL,
};
use crate::querier::{InstanceResult, Outcome};

/// Union the spans of every instance's copy of a trace.
///
/// Spans are keyed by `(trace_id, span_id)` and the first copy seen wins.
/// Resource and scope grouping is kept as each instance returned it; groups
/// left without spans are dropped. An empty result means no instance had the
/// trace, which callers report as not found.
pub fn combine_traces(
    results: Vec<InstanceResult<Trace>>,
    policy: FailurePolicy,
) -> Result<Combined<Trace>, CombineError> {
    let mut metadata = tally(&results, |trace| !trace.is_empty());
    check(&results, &metadata, policy)?;

    let mut seen: HashMap<(String, String), u64> = HashMap::new();
    let mut combined = Trace::default();

    for result in results {
        let Outcome::Found(trace) = result.outcome else {
            continue;
        };
        for resource_spans in trace.resource_spans {
            let mut kept_scopes = Vec::with_capacity(resource_spans.scope_spans.len());
            for scope_spans in resource_spans.scope_spans {
                let mut kept = Vec::with_capacity(scope_spans.spans.len());
                for span in scope_spans.spans {
                    if admit(&mut seen, &span, &result.instance) {
                        kept.push(span);
                    }
                }
                if !kept.is_empty() {
                    kept_scopes.push(ScopeSpans {
                        scope: scope_spans.scope,
                        spans: kept,
                    });
                }
            }
            if !kept_scopes.is_empty() {
                combined.resource_spans.push(ResourceSpans {
                    resource: resource_spans.resource,
                    scope_spans: kept_scopes,
                });
            }
        }
    }

    metadata.total_items = seen.len() as u32;
    Ok(Combined {
        value: combined,
        metadata,
    })
}

/// Combine v2 trace bodies.
///
/// Spans merge as in [`combine_traces`]. Instance `inspected_bytes` are
/// summed. The status is `PARTIAL` when an instance failed or reported its
/// own copy as partial, with a message naming why.
pub fn combine_trace_responses(
    results: Vec<InstanceResult<TraceByIdResponse>>,
    policy: FailurePolicy,
) -> Result<Combined<TraceByIdResponse>, CombineError> {
    let mut metrics: Option<TraceByIdMetrics> = None;
    let mut partial_instances = Vec::new();

    let traces = results
        .into_iter()
        .map(|result| {
            let InstanceResult { instance, outcome } = result;
            let outcome = outcome.map(|response| {
                if let Some(instance_metrics) = &response.metrics {
                    let total = metrics.get_or_insert_with(TraceByIdMetrics::default);
                    total.inspected_bytes = total
                        .inspected_bytes
                        .saturating_add(instance_metrics.inspected_bytes);
                }
                if response.status == STATUS_PARTIAL {
                    partial_instances.push(instance.clone());
                }
                response.trace.unwrap_or_default()
            });
            InstanceResult::new(instance, outcome)
        })
        .collect();

    let combined = combine_traces(traces, policy)?;
    let metadata = combined.metadata;

    let mut reasons = Vec::new();
    if metadata.has_failures() {
        reasons.push(format!(
            "{} of {} instances failed, trace may be incomplete",
            metadata.instances_failed, metadata.instances_queried
        ));
    }
    if !partial_instances.is_empty() {
        reasons.push(format!(
            "partial trace reported by {}",
            partial_instances.join(", ")
        ));
    }
    let status = if reasons.is_empty() {
        STATUS_COMPLETE
    } else {
        STATUS_PARTIAL
    };

    Ok(Combined {
        value: TraceByIdResponse {
            trace: Some(combined.value),
            metrics,
            status: status.to_string(),
            message: reasons.join("; "),
            federation: Some(metadata.into()),
        },
        metadata,
    })
}

/// Record `span` and report whether it is the first copy of its key.
fn admit(seen: &mut HashMap<(String, String), u64>, span: &Span, instance: &str) -> bool {
    let fingerprint = fingerprint(span);
    match seen.entry((span.trace_id.clone(), span.span_id.clone())) {
        Entry::Vacant(slot) => {
            slot.insert(fingerprint);
            true
        }
        Entry::Occupied(existing) => {
            if *existing.get() != fingerprint {
                tracing::warn!(
                    instance = %instance,
                    trace_id = %span.trace_id,
                    span_id = %span.span_id,
                    "Span returned with different content by several instances, keeping first copy"
                );
            }
            false
        }
    }
}

fn fingerprint(span: &Span) -> u64 {
    let mut hasher = DefaultHasher::new();
    span.encode_to_vec().hash(&mut hasher);
    hasher.finish()
}
