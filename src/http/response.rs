//! Response encoding.
//!
//! # Responsibilities
//! - Pick protobuf or JSON from the client's `Accept` header
//! - Write a combined response in that encoding
//!
//! # Design Decisions
//! - JSON unless the client explicitly asks for `application/protobuf`
//! - Both encodings carry the same fields, federation metadata included

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const APPLICATION_PROTOBUF: &str = "application/protobuf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Json,
    Protobuf,
}

impl Encoding {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_protobuf = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|media| {
                media
                    .split(';')
                    .next()
                    .is_some_and(|m| m.trim().eq_ignore_ascii_case(APPLICATION_PROTOBUF))
            });
        if wants_protobuf {
            Encoding::Protobuf
        } else {
            Encoding::Json
        }
    }
}

/// Encode `body` for the client.
pub fn encode<T>(encoding: Encoding, body: &T) -> Response
where
    T: prost::Message + Serialize,
{
    match encoding {
        Encoding::Json => Json(body).into_response(),
        Encoding::Protobuf => (
            [(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_PROTOBUF))],
            body.encode_to_vec(),
        )
            .into_response(),
    }
}
