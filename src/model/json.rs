//! JSON field codecs matching the protobuf JSON mapping used by tracing backends.
//!
//! 64-bit integers travel as strings and enums as their symbolic names, but
//! both are accepted in numeric form as well.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr<N> {
    Number(N),
    Text(String),
}

pub mod u64_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match NumberRepr::<u64>::deserialize(deserializer)? {
            NumberRepr::Number(n) => Ok(n),
            NumberRepr::Text(s) if s.is_empty() => Ok(0),
            NumberRepr::Text(s) => s.parse().map_err(D::Error::custom),
        }
    }
}

pub mod i64_string_opt {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<NumberRepr<i64>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberRepr::Number(n)) => Ok(Some(n)),
            Some(NumberRepr::Text(s)) => s.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

const SPAN_KINDS: &[&str] = &[
    "SPAN_KIND_UNSPECIFIED",
    "SPAN_KIND_INTERNAL",
    "SPAN_KIND_SERVER",
    "SPAN_KIND_CLIENT",
    "SPAN_KIND_PRODUCER",
    "SPAN_KIND_CONSUMER",
];

const STATUS_CODES: &[&str] = &["STATUS_CODE_UNSET", "STATUS_CODE_OK", "STATUS_CODE_ERROR"];

fn serialize_enum<S: Serializer>(
    names: &[&str],
    value: i32,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match usize::try_from(value).ok().and_then(|i| names.get(i)) {
        Some(name) => serializer.serialize_str(name),
        None => serializer.serialize_i32(value),
    }
}

fn deserialize_enum<'de, D: Deserializer<'de>>(
    names: &[&str],
    deserializer: D,
) -> Result<i32, D::Error> {
    match NumberRepr::<i32>::deserialize(deserializer)? {
        NumberRepr::Number(n) => Ok(n),
        NumberRepr::Text(s) => names
            .iter()
            .position(|name| *name == s)
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| D::Error::custom(format!("unknown enum value '{}'", s))),
    }
}

pub mod span_kind {
    use super::*;

    pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_enum(SPAN_KINDS, *value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        deserialize_enum(SPAN_KINDS, deserializer)
    }
}

pub mod status_code {
    use super::*;

    pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_enum(STATUS_CODES, *value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        deserialize_enum(STATUS_CODES, deserializer)
    }
}
