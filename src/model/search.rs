//! Search results: trace summaries plus inspection metrics.

use serde::{Deserialize, Serialize};

use crate::model::metadata::FederationMetadata;
use crate::model::trace::KeyValue;

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    #[prost(message, repeated, tag = "1")]
    pub traces: Vec<TraceSearchMetadata>,

    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SearchMetrics>,

    #[prost(message, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation: Option<FederationMetadata>,
}

/// Summary of one matching trace.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceSearchMetadata {
    #[prost(string, tag = "1")]
    #[serde(rename = "traceID")]
    pub trace_id: String,

    #[prost(string, tag = "2")]
    pub root_service_name: String,

    #[prost(string, tag = "3")]
    pub root_trace_name: String,

    #[prost(uint64, tag = "4")]
    #[serde(with = "crate::model::json::u64_string")]
    pub start_time_unix_nano: u64,

    #[prost(uint32, tag = "5")]
    pub duration_ms: u32,

    #[prost(message, repeated, tag = "7")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub span_sets: Vec<SpanSet>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanSet {
    #[prost(message, repeated, tag = "1")]
    pub spans: Vec<SpanSetSpan>,

    #[prost(uint32, tag = "2")]
    pub matched: u32,

    #[prost(message, repeated, tag = "3")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpanSetSpan {
    #[prost(string, tag = "1")]
    #[serde(rename = "spanID")]
    pub span_id: String,

    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[prost(uint64, tag = "3")]
    #[serde(with = "crate::model::json::u64_string")]
    pub start_time_unix_nano: u64,

    #[prost(uint64, tag = "4")]
    #[serde(with = "crate::model::json::u64_string")]
    pub duration_nanos: u64,

    #[prost(message, repeated, tag = "5")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
}

/// Work performed by an instance to answer a search. Summed across instances.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchMetrics {
    #[prost(uint32, tag = "1")]
    pub inspected_traces: u32,

    #[prost(uint64, tag = "2")]
    #[serde(with = "crate::model::json::u64_string")]
    pub inspected_bytes: u64,

    #[prost(uint32, tag = "3")]
    pub total_blocks: u32,

    #[prost(uint32, tag = "4")]
    pub completed_jobs: u32,

    #[prost(uint32, tag = "5")]
    pub total_jobs: u32,

    #[prost(uint64, tag = "6")]
    #[serde(with = "crate::model::json::u64_string")]
    pub total_block_bytes: u64,
}

impl SearchMetrics {
    pub fn accumulate(&mut self, other: &SearchMetrics) {
        self.inspected_traces = self.inspected_traces.saturating_add(other.inspected_traces);
        self.inspected_bytes = self.inspected_bytes.saturating_add(other.inspected_bytes);
        self.total_blocks = self.total_blocks.saturating_add(other.total_blocks);
        self.completed_jobs = self.completed_jobs.saturating_add(other.completed_jobs);
        self.total_jobs = self.total_jobs.saturating_add(other.total_jobs);
        self.total_block_bytes = self.total_block_bytes.saturating_add(other.total_block_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_backend_search_json() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "traces": [{
                    "traceID": "2f3e0cee77ae5dc9c17ade3689eb2e54",
                    "rootServiceName": "shop-backend",
                    "rootTraceName": "update-billing",
                    "startTimeUnixNano": "1684778327699392724",
                    "durationMs": 557,
                    "spanSets": [{"spans": [{"spanID": "563d623c76514f8e", "startTimeUnixNano": "1684778327735077898", "durationNanos": "446979497"}], "matched": 1}]
                }],
                "metrics": {"inspectedTraces": 3, "inspectedBytes": "1024", "totalBlocks": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(response.traces.len(), 1);
        assert_eq!(response.traces[0].duration_ms, 557);
        assert_eq!(response.traces[0].span_sets[0].spans[0].duration_nanos, 446_979_497);
        let metrics = response.metrics.unwrap();
        assert_eq!(metrics.inspected_bytes, 1024);
        assert_eq!(metrics.total_blocks, 2);
    }

    #[test]
    fn test_accumulate_metrics() {
        let mut total = SearchMetrics::default();
        total.accumulate(&SearchMetrics {
            inspected_traces: 1,
            inspected_bytes: 3,
            ..Default::default()
        });
        total.accumulate(&SearchMetrics {
            inspected_traces: 5,
            inspected_bytes: 7,
            total_jobs: 2,
            ..Default::default()
        });
        assert_eq!(total.inspected_traces, 6);
        assert_eq!(total.inspected_bytes, 10);
        assert_eq!(total.total_jobs, 2);
    }
}
