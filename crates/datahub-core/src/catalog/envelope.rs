//! List response decoding.
//!
//! The API answers list endpoints either with a paged envelope
//! (`{count, next, previous, results, ...}`) or with a bare JSON array. The
//! shape is discriminated once here so reducers match on a tagged union.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

const ENVELOPE_KEYS: [&str; 4] = ["results", "count", "next", "previous"];

/// A paged list envelope. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct PagedEnvelope<T> {
    #[serde(default)]
    pub results: Option<Vec<T>>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl<T> PagedEnvelope<T> {
    /// Length of the returned page, if `results` was present.
    pub fn returned_len(&self) -> Option<usize> {
        self.results.as_ref().map(Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse<T> {
    Paged(PagedEnvelope<T>),
    Plain(Vec<T>),
    /// Neither an envelope nor an array; reduced as an empty result.
    Unrecognized,
}

impl<T: DeserializeOwned> ListResponse<T> {
    /// Classifies and decodes a list body.
    ///
    /// An object counts as an envelope when any of `results`, `count`, `next`
    /// or `previous` is present, even with a `null` value. Item decoding
    /// errors are returned as serialization errors.
    pub fn from_value(value: Value) -> Result<Self> {
        let is_envelope = value
            .as_object()
            .is_some_and(|map| ENVELOPE_KEYS.iter().any(|key| map.contains_key(*key)));

        if is_envelope {
            Ok(Self::Paged(serde_json::from_value(value)?))
        } else if value.is_array() {
            Ok(Self::Plain(serde_json::from_value(value)?))
        } else {
            Ok(Self::Unrecognized)
        }
    }
}

impl<T> ListResponse<T> {
    /// The items to store: `results` (or empty), the array, or empty.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paged(envelope) => envelope.results.unwrap_or_default(),
            Self::Plain(items) => items,
            Self::Unrecognized => Vec::new(),
        }
    }
}
