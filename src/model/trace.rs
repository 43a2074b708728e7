//! Trace tree: resource → scope → span.

use serde::{Deserialize, Serialize};

use crate::model::metadata::TraceMetadata;

/// A complete trace as returned by a trace-by-ID lookup.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    #[prost(message, repeated, tag = "1")]
    #[serde(rename = "batches", alias = "resourceSpans")]
    pub resource_spans: Vec<ResourceSpans>,
}

impl Trace {
    pub fn span_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| rs.scope_spans.iter())
            .map(|ss| ss.spans.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.span_count() == 0
    }

    /// Iterate every span in tree order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.resource_spans
            .iter()
            .flat_map(|rs| rs.scope_spans.iter())
            .flat_map(|ss| ss.spans.iter())
    }
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSpans {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,

    #[prost(message, repeated, tag = "2")]
    #[serde(alias = "instrumentationLibrarySpans")]
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    #[prost(message, repeated, tag = "1")]
    pub attributes: Vec<KeyValue>,

    #[prost(uint32, tag = "2")]
    #[serde(skip_serializing_if = "is_zero")]
    pub dropped_attributes_count: u32,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeSpans {
    #[prost(message, optional, tag = "1")]
    #[serde(alias = "instrumentationLibrary", skip_serializing_if = "Option::is_none")]
    pub scope: Option<InstrumentationScope>,

    #[prost(message, repeated, tag = "2")]
    pub spans: Vec<Span>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentationScope {
    #[prost(string, tag = "1")]
    pub name: String,

    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// One span. Identifiers are kept in the encoding the instance used.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
    #[prost(string, tag = "1")]
    pub trace_id: String,

    #[prost(string, tag = "2")]
    pub span_id: String,

    #[prost(string, tag = "3")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_state: String,

    #[prost(string, tag = "4")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_span_id: String,

    #[prost(string, tag = "5")]
    pub name: String,

    #[prost(int32, tag = "6")]
    #[serde(with = "crate::model::json::span_kind")]
    pub kind: i32,

    #[prost(uint64, tag = "7")]
    #[serde(with = "crate::model::json::u64_string")]
    pub start_time_unix_nano: u64,

    #[prost(uint64, tag = "8")]
    #[serde(with = "crate::model::json::u64_string")]
    pub end_time_unix_nano: u64,

    #[prost(message, repeated, tag = "9")]
    pub attributes: Vec<KeyValue>,

    #[prost(message, repeated, tag = "11")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,

    #[prost(message, repeated, tag = "13")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,

    #[prost(message, optional, tag = "15")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    #[prost(uint64, tag = "1")]
    #[serde(with = "crate::model::json::u64_string")]
    pub time_unix_nano: u64,

    #[prost(string, tag = "2")]
    pub name: String,

    #[prost(message, repeated, tag = "3")]
    pub attributes: Vec<KeyValue>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Link {
    #[prost(string, tag = "1")]
    pub trace_id: String,

    #[prost(string, tag = "2")]
    pub span_id: String,

    #[prost(message, repeated, tag = "4")]
    pub attributes: Vec<KeyValue>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[prost(int32, tag = "3")]
    #[serde(with = "crate::model::json::status_code")]
    pub code: i32,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValue {
    #[prost(string, tag = "1")]
    pub key: String,

    #[prost(message, optional, tag = "2")]
    pub value: Option<AnyValue>,
}

impl KeyValue {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(AnyValue {
                string_value: Some(value.into()),
                ..Default::default()
            }),
        }
    }
}

/// Attribute value. Exactly one field is expected to be set.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnyValue {
    #[prost(string, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[prost(bool, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,

    #[prost(int64, optional, tag = "3")]
    #[serde(
        with = "crate::model::json::i64_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub int_value: Option<i64>,

    #[prost(double, optional, tag = "4")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,

    #[prost(message, optional, tag = "5")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_value: Option<ArrayValue>,

    #[prost(string, optional, tag = "7")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_value: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayValue {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<AnyValue>,
}

/// Body of `/api/traces/{id}`: the trace plus the federation summary.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceResponse {
    #[prost(message, repeated, tag = "1")]
    #[serde(rename = "batches", alias = "resourceSpans")]
    pub resource_spans: Vec<ResourceSpans>,

    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation: Option<TraceMetadata>,
}

pub const STATUS_COMPLETE: &str = "COMPLETE";
pub const STATUS_PARTIAL: &str = "PARTIAL";

/// Body of `/api/v2/traces/{id}`, both as sent by instances and as returned
/// by the federator.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceByIdResponse {
    #[prost(message, optional, tag = "1")]
    pub trace: Option<Trace>,

    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TraceByIdMetrics>,

    #[prost(string, tag = "3")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,

    #[prost(string, tag = "4")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[prost(message, optional, tag = "5")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation: Option<TraceMetadata>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceByIdMetrics {
    #[prost(uint64, tag = "1")]
    #[serde(with = "crate::model::json::u64_string")]
    pub inspected_bytes: u64,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}
