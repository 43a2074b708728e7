//! Query API handlers.
//!
//! Every handler follows the same path: validate, derive a bounded context,
//! fan out, combine, encode. The raw query string is forwarded to instances
//! untouched.

use std::future::Future;
use std::time::Instant;

use axum::extract::{Path, RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::client::{
    SearchQuery, TagValuesQuery, TagValuesV2Query, TagsQuery, TagsV2Query, TraceByIdQuery,
    TraceByIdV2Query, REQUEST_ID_HEADER,
};
use crate::combiner::{
    combine_search, combine_tag_values, combine_tag_values_v2, combine_tags, combine_tags_v2,
    combine_trace_responses, combine_traces,
};
use crate::context::QueryContext;
use crate::http::error::ApiError;
use crate::http::response::{encode, Encoding};
use crate::http::server::AppState;
use crate::model::TraceResponse;
use crate::observability::metrics;

const MAX_TRACE_ID_LEN: usize = 32;

/// Run a handler body and record its status and latency.
async fn observe<F>(endpoint: &'static str, handler: F) -> Response
where
    F: Future<Output = Result<Response, ApiError>>,
{
    let started = Instant::now();
    let response = handler.await.into_response();
    metrics::record_request(endpoint, response.status().as_u16(), started);
    response
}

fn context(state: &AppState, headers: &HeaderMap) -> QueryContext {
    let ctx = QueryContext::with_timeout(state.query.timeout());
    match headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
        Some(request_id) => ctx.with_request_id(request_id),
        None => ctx,
    }
}

/// Trace IDs are 1 to 32 hex characters.
pub fn validate_trace_id(trace_id: &str) -> Result<(), ApiError> {
    let valid = !trace_id.is_empty()
        && trace_id.len() <= MAX_TRACE_ID_LEN
        && trace_id.bytes().all(|b| b.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ApiError::InvalidTraceId(trace_id.to_string()))
    }
}

/// `limit` from the query string, falling back to `default` when absent or zero.
pub fn search_limit(raw_query: Option<&str>, default: usize) -> Result<usize, ApiError> {
    let Some(raw) = raw_query else {
        return Ok(default);
    };
    match url::form_urlencoded::parse(raw.as_bytes()).find(|(key, _)| key == "limit") {
        Some((_, value)) => {
            let limit: usize = value
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("invalid limit '{value}'")))?;
            Ok(if limit == 0 { default } else { limit })
        }
        None => Ok(default),
    }
}

pub async fn trace_by_id(
    State(state): State<AppState>,
    Path(trace_id): Path<String>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    observe("trace_by_id", async {
        validate_trace_id(&trace_id)?;
        let ctx = context(&state, &headers);

        let results = state
            .querier
            .trace_by_id(&ctx, TraceByIdQuery::new(trace_id.as_str(), raw_query))
            .await;
        let combined =
            combine_traces(results, state.policy).map_err(|e| ApiError::combine("trace", e))?;
        if combined.value.is_empty() {
            return Err(ApiError::TraceNotFound);
        }

        tracing::debug!(
            trace_id = %trace_id,
            spans = combined.metadata.total_items,
            failed = combined.metadata.instances_failed,
            "Trace combined"
        );

        let body = TraceResponse {
            resource_spans: combined.value.resource_spans,
            federation: Some(combined.metadata.into()),
        };
        Ok::<_, ApiError>(encode(Encoding::from_headers(&headers), &body))
    })
    .await
}

pub async fn trace_by_id_v2(
    State(state): State<AppState>,
    Path(trace_id): Path<String>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    observe("trace_by_id_v2", async {
        validate_trace_id(&trace_id)?;
        let ctx = context(&state, &headers);

        let results = state
            .querier
            .trace_by_id_v2(&ctx, TraceByIdV2Query::new(trace_id.as_str(), raw_query))
            .await;
        let combined = combine_trace_responses(results, state.policy)
            .map_err(|e| ApiError::combine("trace", e))?;
        if combined.metadata.total_items == 0 {
            return Err(ApiError::TraceNotFound);
        }
        Ok::<_, ApiError>(encode(Encoding::from_headers(&headers), &combined.value))
    })
    .await
}

/// Union of instance search results. Without a `limit` parameter the union
/// is cut to `query.search_default_limit`.
pub async fn search(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    observe("search", async {
        let limit = search_limit(raw_query.as_deref(), state.query.search_default_limit)?;
        let ctx = context(&state, &headers);

        let results = state.querier.search(&ctx, SearchQuery::search(raw_query)).await;
        let combined = combine_search(results, Some(limit), state.policy)
            .map_err(|e| ApiError::combine("search", e))?;
        Ok::<_, ApiError>(encode(Encoding::from_headers(&headers), &combined.value))
    })
    .await
}

pub async fn search_tags(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    observe("search_tags", async {
        let ctx = context(&state, &headers);
        let results = state.querier.search_tags(&ctx, TagsQuery::tags(raw_query)).await;
        let combined =
            combine_tags(results, state.policy).map_err(|e| ApiError::combine("tags", e))?;
        Ok::<_, ApiError>(encode(Encoding::from_headers(&headers), &combined.value))
    })
    .await
}

pub async fn search_tags_v2(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    observe("search_tags_v2", async {
        let ctx = context(&state, &headers);
        let results = state
            .querier
            .search_tags_v2(&ctx, TagsV2Query::tags_v2(raw_query))
            .await;
        let combined =
            combine_tags_v2(results, state.policy).map_err(|e| ApiError::combine("tags", e))?;
        Ok::<_, ApiError>(encode(Encoding::from_headers(&headers), &combined.value))
    })
    .await
}

pub async fn search_tag_values(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    observe("search_tag_values", async {
        let ctx = context(&state, &headers);
        let results = state
            .querier
            .search_tag_values(&ctx, TagValuesQuery::tag_values(&tag_name, raw_query))
            .await;
        let combined = combine_tag_values(results, state.policy)
            .map_err(|e| ApiError::combine("tag values", e))?;
        Ok::<_, ApiError>(encode(Encoding::from_headers(&headers), &combined.value))
    })
    .await
}

pub async fn search_tag_values_v2(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    observe("search_tag_values_v2", async {
        let ctx = context(&state, &headers);
        let results = state
            .querier
            .search_tag_values_v2(&ctx, TagValuesV2Query::tag_values_v2(&tag_name, raw_query))
            .await;
        let combined = combine_tag_values_v2(results, state.policy)
            .map_err(|e| ApiError::combine("tag values", e))?;
        Ok::<_, ApiError>(encode(Encoding::from_headers(&headers), &combined.value))
    })
    .await
}

pub async fn echo() -> &'static str {
    "echo"
}

pub async fn ready() -> &'static str {
    "ready"
}
