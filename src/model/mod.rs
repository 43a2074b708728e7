//! Query API data model.
//!
//! Every type derives both `prost::Message` and serde so a response can be
//! written as protobuf or JSON with the same field set. Instances are always
//! read as JSON, which is why the JSON side accepts the backend's protobuf
//! JSON mapping (string-encoded 64-bit integers, enum names, legacy field names).

pub mod json;
pub mod metadata;
pub mod search;
pub mod tags;
pub mod trace;

pub use metadata::{FederationMetadata, TraceMetadata};
pub use search::{SearchMetrics, SearchResponse, SpanSet, SpanSetSpan, TraceSearchMetadata};
pub use tags::{
    MetadataMetrics, SearchTagValuesResponse, SearchTagValuesV2Response, SearchTagsResponse,
    SearchTagsV2Response, SearchTagsV2Scope, TagValue,
};
pub use trace::{
    AnyValue, InstrumentationScope, KeyValue, Resource, ResourceSpans, ScopeSpans, Span, Status,
    Trace, TraceByIdMetrics, TraceByIdResponse, TraceResponse, STATUS_COMPLETE, STATUS_PARTIAL,
};
