//! Federation summary attached to every combined response.

use serde::{Deserialize, Serialize};

/// How many instances were asked and how each one answered.
///
/// `instances_responded + instances_failed + instances_not_found` always
/// equals `instances_queried`.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FederationMetadata {
    #[prost(uint32, tag = "1")]
    pub instances_queried: u32,

    #[prost(uint32, tag = "2")]
    pub instances_responded: u32,

    #[prost(uint32, tag = "3")]
    pub instances_failed: u32,

    #[prost(uint32, tag = "4")]
    pub instances_not_found: u32,

    /// Items in the combined result (traces, tags, values).
    #[prost(uint32, tag = "5")]
    pub total_items: u32,
}

impl FederationMetadata {
    pub fn has_failures(&self) -> bool {
        self.instances_failed > 0
    }

    /// True when no instance produced a usable answer.
    pub fn all_failed(&self) -> bool {
        self.instances_failed == self.instances_queried
    }
}

/// Trace-lookup view of [`FederationMetadata`].
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceMetadata {
    #[prost(uint32, tag = "1")]
    pub instances_queried: u32,

    #[prost(uint32, tag = "2")]
    pub instances_with_trace: u32,

    #[prost(uint32, tag = "3")]
    pub instances_not_found: u32,

    #[prost(uint32, tag = "4")]
    pub instances_failed: u32,

    #[prost(uint32, tag = "5")]
    pub total_spans: u32,
}

impl From<FederationMetadata> for TraceMetadata {
    fn from(meta: FederationMetadata) -> Self {
        Self {
            instances_queried: meta.instances_queried,
            instances_with_trace: meta.instances_responded,
            instances_not_found: meta.instances_not_found,
            instances_failed: meta.instances_failed,
            total_spans: meta.total_items,
        }
    }
}
