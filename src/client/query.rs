//! Query shapes sent to instances.
//!
//! A query knows its URL path, the query string to forward and how to decode
//! the body. The instance client stays shape-agnostic.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::model::{
    SearchResponse, SearchTagValuesResponse, SearchTagValuesV2Response, SearchTagsResponse,
    SearchTagsV2Response, Trace, TraceByIdResponse,
};

/// Which API surface a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    TraceById,
    TraceByIdV2,
    Search,
    SearchTags,
    SearchTagsV2,
    SearchTagValues,
    SearchTagValuesV2,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::TraceById => "trace_by_id",
            QueryKind::TraceByIdV2 => "trace_by_id_v2",
            QueryKind::Search => "search",
            QueryKind::SearchTags => "search_tags",
            QueryKind::SearchTagsV2 => "search_tags_v2",
            QueryKind::SearchTagValues => "search_tag_values",
            QueryKind::SearchTagValuesV2 => "search_tag_values_v2",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request an [`InstanceClient`](crate::client::InstanceClient) can issue.
pub trait InstanceQuery: Send + Sync + 'static {
    type Response: Send + 'static;

    fn kind(&self) -> QueryKind;

    /// Path segments appended to the instance endpoint, unencoded.
    fn path_segments(&self) -> Vec<&str>;

    /// Query string forwarded verbatim.
    fn raw_query(&self) -> Option<&str>;

    fn decode(&self, body: &[u8]) -> Result<Self::Response, serde_json::Error>;

    /// Whether a 404 from the instance is a valid "nothing here" answer.
    fn not_found_is_answer(&self) -> bool {
        false
    }
}

/// Trace lookup on the v1 path. The body is the bare trace.
#[derive(Debug, Clone)]
pub struct TraceByIdQuery {
    trace_id: String,
    raw_query: Option<String>,
}

impl TraceByIdQuery {
    pub fn new(trace_id: impl Into<String>, raw_query: Option<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            raw_query,
        }
    }
}

impl InstanceQuery for TraceByIdQuery {
    type Response = Trace;

    fn kind(&self) -> QueryKind {
        QueryKind::TraceById
    }

    fn path_segments(&self) -> Vec<&str> {
        vec!["api", "traces", self.trace_id.as_str()]
    }

    fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    fn decode(&self, body: &[u8]) -> Result<Trace, serde_json::Error> {
        serde_json::from_slice(body)
    }

    fn not_found_is_answer(&self) -> bool {
        true
    }
}

/// Trace lookup on the v2 path. The body wraps the trace with the instance's
/// own status, message and metrics, which the combiner needs.
#[derive(Debug, Clone)]
pub struct TraceByIdV2Query {
    trace_id: String,
    raw_query: Option<String>,
}

impl TraceByIdV2Query {
    pub fn new(trace_id: impl Into<String>, raw_query: Option<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            raw_query,
        }
    }
}

impl InstanceQuery for TraceByIdV2Query {
    type Response = TraceByIdResponse;

    fn kind(&self) -> QueryKind {
        QueryKind::TraceByIdV2
    }

    fn path_segments(&self) -> Vec<&str> {
        vec!["api", "v2", "traces", self.trace_id.as_str()]
    }

    fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    fn decode(&self, body: &[u8]) -> Result<TraceByIdResponse, serde_json::Error> {
        serde_json::from_slice(body)
    }

    fn not_found_is_answer(&self) -> bool {
        true
    }
}

/// Search and tag queries: fixed path, body decoded as `R`.
pub struct ApiQuery<R> {
    kind: QueryKind,
    segments: Vec<String>,
    raw_query: Option<String>,
    _response: PhantomData<fn() -> R>,
}

pub type SearchQuery = ApiQuery<SearchResponse>;
pub type TagsQuery = ApiQuery<SearchTagsResponse>;
pub type TagsV2Query = ApiQuery<SearchTagsV2Response>;
pub type TagValuesQuery = ApiQuery<SearchTagValuesResponse>;
pub type TagValuesV2Query = ApiQuery<SearchTagValuesV2Response>;

impl<R> ApiQuery<R> {
    fn new(kind: QueryKind, segments: &[&str], raw_query: Option<String>) -> Self {
        Self {
            kind,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            raw_query,
            _response: PhantomData,
        }
    }
}

impl<R> Clone for ApiQuery<R> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            segments: self.segments.clone(),
            raw_query: self.raw_query.clone(),
            _response: PhantomData,
        }
    }
}

impl<R> fmt::Debug for ApiQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiQuery")
            .field("kind", &self.kind)
            .field("segments", &self.segments)
            .field("raw_query", &self.raw_query)
            .finish()
    }
}

impl ApiQuery<SearchResponse> {
    pub fn search(raw_query: Option<String>) -> Self {
        Self::new(QueryKind::Search, &["api", "search"], raw_query)
    }
}

impl ApiQuery<SearchTagsResponse> {
    pub fn tags(raw_query: Option<String>) -> Self {
        Self::new(QueryKind::SearchTags, &["api", "search", "tags"], raw_query)
    }
}

impl ApiQuery<SearchTagsV2Response> {
    pub fn tags_v2(raw_query: Option<String>) -> Self {
        Self::new(QueryKind::SearchTagsV2, &["api", "v2", "search", "tags"], raw_query)
    }
}

impl ApiQuery<SearchTagValuesResponse> {
    pub fn tag_values(tag: &str, raw_query: Option<String>) -> Self {
        Self::new(
            QueryKind::SearchTagValues,
            &["api", "search", "tag", tag, "values"],
            raw_query,
        )
    }
}

impl ApiQuery<SearchTagValuesV2Response> {
    pub fn tag_values_v2(tag: &str, raw_query: Option<String>) -> Self {
        Self::new(
            QueryKind::SearchTagValuesV2,
            &["api", "v2", "search", "tag", tag, "values"],
            raw_query,
        )
    }
}

impl<R> InstanceQuery for ApiQuery<R>
where
    R: DeserializeOwned + Send + 'static,
{
    type Response = R;

    fn kind(&self) -> QueryKind {
        self.kind
    }

    fn path_segments(&self) -> Vec<&str> {
        self.segments.iter().map(String::as_str).collect()
    }

    fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    fn decode(&self, body: &[u8]) -> Result<R, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v2_trace_body_keeps_wrapper() {
        let query = TraceByIdV2Query::new("abc", None);
        let response = query
            .decode(br#"{"trace":{"batches":[{"scopeSpans":[{"spans":[{"spanId":"1"}]}]}]},"status":"PARTIAL","message":"block unreadable","metrics":{"inspectedBytes":"4096"}}"#)
            .unwrap();

        assert_eq!(response.trace.unwrap().span_count(), 1);
        assert_eq!(response.metrics.unwrap().inspected_bytes, 4096);
        assert_eq!(response.status, "PARTIAL");
        assert_eq!(response.message, "block unreadable");
        assert_eq!(query.kind(), QueryKind::TraceByIdV2);
        assert_eq!(query.path_segments(), vec!["api", "v2", "traces", "abc"]);
        assert!(query.not_found_is_answer());
    }

    #[test]
    fn test_v2_trace_body_without_trace() {
        let response = TraceByIdV2Query::new("abc", None).decode(b"{}").unwrap();
        assert!(response.trace.is_none());
        assert!(response.metrics.is_none());
    }

    #[test]
    fn test_tag_queries_do_not_accept_not_found() {
        let query = TagValuesQuery::tag_values("service.name", Some("q={}".into()));
        assert!(!query.not_found_is_answer());
        assert_eq!(
            query.path_segments(),
            vec!["api", "search", "tag", "service.name", "values"]
        );
        assert_eq!(query.raw_query(), Some("q={}"));
    }
}
