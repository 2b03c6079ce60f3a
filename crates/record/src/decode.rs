//! One-line JSON decoder
//!
//! Decoding is two-phase: peek at the `type` tag, then deserialize the
//! shape that tag demands. A line whose shape disagrees with its tag is
//! invalid JSON as far as callers are concerned; a well-formed line with a
//! tag outside the supported set keeps its raw tag for the error stream.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{Reason, Record};

/// A line that could not be decoded into a [`Record`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed JSON, a missing/non-string `type` tag, or a `value` whose
    /// shape does not match the tag.
    #[error("invalid_json")]
    InvalidJson,

    /// Well-formed JSON with a `type` tag outside the supported set.
    #[error("data_type_not_supported: {tag}")]
    UnsupportedType { tag: String },
}

impl ParseError {
    /// The reason tag recorded for this error.
    pub fn reason(&self) -> Reason {
        match self {
            ParseError::InvalidJson => Reason::InvalidJson,
            ParseError::UnsupportedType { .. } => Reason::DataTypeNotSupported,
        }
    }
}

/// Line decoder for dump records.
///
/// Pure and stateless apart from capability flags; safe to share across
/// workers without synchronization.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    sorted_sets: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Decoder with the full variant set enabled.
    pub fn new() -> Self {
        Self { sorted_sets: true }
    }

    /// Enable or disable the `sortedset` tag.
    ///
    /// When disabled, `sortedset` lines classify as unsupported instead of
    /// decoding, for destinations without sorted-set operations.
    pub fn sorted_sets(mut self, enabled: bool) -> Self {
        self.sorted_sets = enabled;
        self
    }

    /// Decode one line into a [`Record`].
    pub fn decode(&self, line: &str) -> Result<Record, ParseError> {
        let raw: serde_json::Value =
            serde_json::from_str(line).map_err(|_| ParseError::InvalidJson)?;

        let tag = raw
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(ParseError::InvalidJson)?
            .to_owned();

        match tag.as_str() {
            "string" => {
                let wire: StringWire = typed(raw)?;
                Ok(Record::String {
                    key: wire.key,
                    expiry: wire.expiry,
                    value: wire.value,
                })
            }
            "hash" => {
                let wire: HashWire = typed(raw)?;
                Ok(Record::Hash {
                    key: wire.key,
                    expiry: wire.expiry,
                    fields: wire.value,
                })
            }
            "list" => {
                let wire: ListWire = typed(raw)?;
                Ok(Record::List {
                    key: wire.key,
                    expiry: wire.expiry,
                    elements: wire.value,
                })
            }
            "set" => {
                let wire: SetWire = typed(raw)?;
                Ok(Record::Set {
                    key: wire.key,
                    expiry: wire.expiry,
                    members: wire.value,
                })
            }
            "sortedset" if self.sorted_sets => {
                let wire: SortedSetWire = typed(raw)?;
                Ok(Record::SortedSet {
                    key: wire.key,
                    expiry: wire.expiry,
                    members: wire.value,
                })
            }
            _ => Err(ParseError::UnsupportedType { tag }),
        }
    }
}

/// Deserialize the typed shape for a tag; any mismatch is invalid JSON.
fn typed<T: DeserializeOwned>(raw: serde_json::Value) -> Result<T, ParseError> {
    serde_json::from_value(raw).map_err(|_| ParseError::InvalidJson)
}

// Wire shapes, one per tag. Unknown fields are ignored, matching the dump
// producer's freedom to add metadata.

#[derive(Debug, Deserialize)]
struct StringWire {
    key: String,
    value: String,
    #[serde(default)]
    expiry: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct HashWire {
    key: String,
    value: HashMap<String, String>,
    #[serde(default)]
    expiry: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ListWire {
    key: String,
    value: Vec<String>,
    #[serde(default)]
    expiry: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SetWire {
    key: String,
    value: HashSet<String>,
    #[serde(default)]
    expiry: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SortedSetWire {
    key: String,
    value: HashMap<String, f64>,
    #[serde(default)]
    expiry: Option<i64>,
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod tests;
