//! Tag name and tag value union.

use std::collections::{BTreeMap, BTreeSet};

use crate::combiner::{summarize, sum_metadata_metrics, Combined, CombineError, FailurePolicy};
use crate::model::{
    SearchTagValuesResponse, SearchTagValuesV2Response, SearchTagsResponse, SearchTagsV2Response,
    SearchTagsV2Scope, TagValue,
};
use crate::querier::InstanceResult;

fn responses<T>(results: &[InstanceResult<T>]) -> impl Iterator<Item = &T> {
    results.iter().filter_map(|r| r.outcome.found())
}

/// Sorted, de-duplicated union of tag names. Comparison is case-sensitive.
pub fn combine_tags(
    results: Vec<InstanceResult<SearchTagsResponse>>,
    policy: FailurePolicy,
) -> Result<Combined<SearchTagsResponse>, CombineError> {
    let mut metadata = summarize(&results, policy)?;

    let names: BTreeSet<&str> = responses(&results)
        .flat_map(|r| r.tag_names.iter().map(String::as_str))
        .collect();
    let metrics = sum_metadata_metrics(responses(&results).map(|r| r.metrics.as_ref()));

    metadata.total_items = names.len() as u32;
    Ok(Combined {
        value: SearchTagsResponse {
            tag_names: names.into_iter().map(str::to_string).collect(),
            metrics,
            federation: Some(metadata),
        },
        metadata,
    })
}

/// Per-scope union of tag names. Every scope any instance reported appears.
pub fn combine_tags_v2(
    results: Vec<InstanceResult<SearchTagsV2Response>>,
    policy: FailurePolicy,
) -> Result<Combined<SearchTagsV2Response>, CombineError> {
    let mut metadata = summarize(&results, policy)?;

    let mut scopes: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for scope in responses(&results).flat_map(|r| r.scopes.iter()) {
        scopes
            .entry(scope.name.as_str())
            .or_default()
            .extend(scope.tags.iter().map(String::as_str));
    }
    let metrics = sum_metadata_metrics(responses(&results).map(|r| r.metrics.as_ref()));

    metadata.total_items = scopes.values().map(|tags| tags.len() as u32).sum();
    Ok(Combined {
        value: SearchTagsV2Response {
            scopes: scopes
                .into_iter()
                .map(|(name, tags)| SearchTagsV2Scope {
                    name: name.to_string(),
                    tags: tags.into_iter().map(str::to_string).collect(),
                })
                .collect(),
            metrics,
            federation: Some(metadata),
        },
        metadata,
    })
}

/// Sorted union of tag values, compared by exact string equality.
pub fn combine_tag_values(
    results: Vec<InstanceResult<SearchTagValuesResponse>>,
    policy: FailurePolicy,
) -> Result<Combined<SearchTagValuesResponse>, CombineError> {
    let mut metadata = summarize(&results, policy)?;

    let values: BTreeSet<&str> = responses(&results)
        .flat_map(|r| r.tag_values.iter().map(String::as_str))
        .collect();
    let metrics = sum_metadata_metrics(responses(&results).map(|r| r.metrics.as_ref()));

    metadata.total_items = values.len() as u32;
    Ok(Combined {
        value: SearchTagValuesResponse {
            tag_values: values.into_iter().map(str::to_string).collect(),
            metrics,
            federation: Some(metadata),
        },
        metadata,
    })
}

/// Union of typed tag values, keyed by value. The first type seen for a
/// value is kept; types are never coerced.
pub fn combine_tag_values_v2(
    results: Vec<InstanceResult<SearchTagValuesV2Response>>,
    policy: FailurePolicy,
) -> Result<Combined<SearchTagValuesV2Response>, CombineError> {
    let mut metadata = summarize(&results, policy)?;

    let mut values: BTreeMap<&str, &TagValue> = BTreeMap::new();
    for value in responses(&results).flat_map(|r| r.tag_values.iter()) {
        values.entry(value.value.as_str()).or_insert(value);
    }
    let metrics = sum_metadata_metrics(responses(&results).map(|r| r.metrics.as_ref()));

    metadata.total_items = values.len() as u32;
    Ok(Combined {
        value: SearchTagValuesV2Response {
            tag_values: values.into_values().cloned().collect(),
            metrics,
            federation: Some(metadata),
        },
        metadata,
    })
}
