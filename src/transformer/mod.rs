//! Header map construction and double JSON encoding.

mod header;
mod list;

pub use header::{DirectionReport, HeaderTransformer, TransformReport};
pub use list::split_header_names;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which side of the exchange a header belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    /// Both directions, in the order they are processed.
    pub const ALL: [Direction; 2] = [Direction::Request, Direction::Response];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a listed header without a value is written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingValue {
    /// Keep the key with a JSON `null`
    #[default]
    Null,
    /// Drop the key from the encoded object
    Omit,
}

/// Ordered header name to value mapping.
///
/// Names are unique and keep the position of their first insertion.
/// Equality compares entries regardless of order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap {
    entries: IndexMap<String, Option<String>>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing the value of an existing name in place.
    ///
    /// Returns the previous value if the name was already present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: Option<String>,
    ) -> Option<Option<String>> {
        self.entries.insert(name.into(), value)
    }

    /// Look up a header. `Some(None)` means listed without a value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.entries.get(name).map(|v| v.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Number of headers listed without a value.
    pub fn missing_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_none()).count()
    }

    /// JSON object text for this map.
    ///
    /// Serializing string names and values does not fail, so `Encode` is
    /// unreachable in practice.
    pub fn to_json(&self, missing: MissingValue) -> Result<String, TransformError> {
        let result = match missing {
            MissingValue::Null => serde_json::to_string(&self.entries),
            MissingValue::Omit => {
                let present: IndexMap<&str, &str> = self
                    .entries
                    .iter()
                    .filter_map(|(n, v)| Some((n.as_str(), v.as_deref()?)))
                    .collect();
                serde_json::to_string(&present)
            }
        };
        result.map_err(TransformError::Encode)
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Encode a header map as JSON text wrapped in a JSON string literal.
pub fn encode_header_map(
    map: &HeaderMap,
    missing: MissingValue,
) -> Result<String, TransformError> {
    let inner = map.to_json(missing)?;
    serde_json::to_string(&inner).map_err(TransformError::Encode)
}

/// Decode a doubly encoded header map.
pub fn decode_header_map(text: &str) -> Result<HeaderMap, TransformError> {
    let inner: String = serde_json::from_str(text).map_err(TransformError::NotAString)?;
    serde_json::from_str(&inner).map_err(TransformError::Decode)
}

/// Errors from encoding or decoding header maps.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to encode header map: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("outer value is not a JSON string: {0}")]
    NotAString(#[source] serde_json::Error),

    #[error("inner value is not a header object: {0}")]
    Decode(#[source] serde_json::Error),
}
