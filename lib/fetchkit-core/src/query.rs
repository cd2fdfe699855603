//! Query string encoding and decoding.
//!
//! [`encode`] turns a [`ParamObject`] into a `?key=value&...` suffix using
//! `application/x-www-form-urlencoded` rules. Sequences repeat their key, and
//! keys are always literal: `a[]` is encoded as `a%5B%5D`, never as an array
//! marker.
//!
//! [`decode`] is allow-listed: only keys present in the [`Descriptors`] are
//! read, each coerced to the declared [`ValueKind`].
//!
//! # Example
//!
//! ```
//! use fetchkit_core::query::{self, Descriptors, QueryDescriptor};
//! use fetchkit_core::{ParamObject, ParamValue};
//!
//! let params = ParamObject::new().with("a", vec!["x", "18"]);
//! let qs = query::encode(&ParamValue::from(params)).expect("object");
//! assert_eq!(qs, "?a=x&a=18");
//!
//! let descriptors = Descriptors::new().with("a", QueryDescriptor::number().array());
//! let decoded = query::decode(&qs, &descriptors);
//! assert_eq!(decoded.get("a").and_then(ParamValue::as_list).map(<[_]>::len), Some(2));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::{Error, ParamObject, ParamValue, Result, Scalar};

// ============================================================================
// Encoding
// ============================================================================

/// Encode parameters into a query string suffix.
///
/// Returns `""` when nothing is emitted, `"?..."` otherwise. `Undefined`
/// input encodes as `""`, as does any scalar other than a string.
///
/// # Errors
///
/// Returns [`Error::InvalidInputKind`] when `input` is a sequence or a string.
pub fn encode(input: &ParamValue) -> Result<String> {
    match input {
        ParamValue::Object(params) => Ok(encode_object(params)),
        ParamValue::List(_) | ParamValue::Scalar(Scalar::String(_)) => {
            Err(Error::invalid_input_kind(input.kind()))
        }
        ParamValue::Undefined | ParamValue::Scalar(_) => Ok(String::new()),
    }
}

/// Encode a mapping into a query string suffix. Never fails.
#[must_use]
pub fn encode_object(params: &ParamObject) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for (key, value) in params.iter() {
        match value {
            ParamValue::Scalar(scalar) => {
                serializer.append_pair(key, &scalar.to_string());
            }
            ParamValue::List(items) if items.is_empty() => {
                serializer.append_pair(key, "");
            }
            ParamValue::List(items) => {
                for item in items {
                    serializer.append_pair(key, &item.to_string());
                }
            }
            // not serializable
            ParamValue::Undefined | ParamValue::Object(_) => {}
        }
    }

    let query = serializer.finish();
    if query.is_empty() {
        query
    } else {
        format!("?{query}")
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Target type of a decoded query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Parse as a float; non-numeric input becomes `NaN`.
    Number,
    /// Parse as a date; unparseable input stays a string.
    Date,
    /// Keep the raw string. Unknown type names fall back to this.
    #[default]
    #[serde(other)]
    String,
}

impl ValueKind {
    /// Coerce a raw (already percent-decoded) value.
    #[must_use]
    pub fn coerce(self, raw: &str) -> Scalar {
        match self {
            Self::String => Scalar::String(raw.to_string()),
            Self::Number => Scalar::Number(parse_number(raw)),
            Self::Date => {
                parse_date(raw).map_or_else(|| Scalar::String(raw.to_string()), Scalar::Date)
            }
        }
    }
}

/// How a single query key is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Value type, `"type"` in serialized form.
    #[serde(rename = "type", default)]
    pub kind: ValueKind,
    /// Collect every occurrence into a sequence instead of keeping the first.
    #[serde(default)]
    pub array: bool,
}

impl QueryDescriptor {
    /// String-typed descriptor.
    #[must_use]
    pub const fn string() -> Self {
        Self {
            kind: ValueKind::String,
            array: false,
        }
    }

    /// Number-typed descriptor.
    #[must_use]
    pub const fn number() -> Self {
        Self {
            kind: ValueKind::Number,
            array: false,
        }
    }

    /// Date-typed descriptor.
    #[must_use]
    pub const fn date() -> Self {
        Self {
            kind: ValueKind::Date,
            array: false,
        }
    }

    /// Marks the key as repeatable.
    #[must_use]
    pub const fn array(mut self) -> Self {
        self.array = true;
        self
    }
}

/// Set of recognized query keys for [`decode`].
///
/// Deserializes from a map such as `{"id": {"type": "number"}, "tag": {"array": true}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptors(BTreeMap<String, QueryDescriptor>);

impl Descriptors {
    /// Empty set: decoding with it always yields an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a key, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, descriptor: QueryDescriptor) -> Self {
        self.0.insert(key.into(), descriptor);
        self
    }

    /// Adds or replaces a key.
    pub fn insert(&mut self, key: impl Into<String>, descriptor: QueryDescriptor) {
        self.0.insert(key.into(), descriptor);
    }

    /// Descriptor for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryDescriptor> {
        self.0.get(key)
    }

    /// Iterates keys and descriptors.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryDescriptor)> {
        self.0.iter().map(|(k, d)| (k.as_str(), d))
    }
}

impl<K: Into<String>> FromIterator<(K, QueryDescriptor)> for Descriptors {
    fn from_iter<I: IntoIterator<Item = (K, QueryDescriptor)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, d)| (k.into(), d)).collect())
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a query string into the described keys.
///
/// A leading `?` is optional. Described keys missing from the string are
/// omitted, undescribed keys are ignored. Never fails: the worst case is a
/// `NaN` number or a date left as a string.
#[must_use]
pub fn decode(query: &str, descriptors: &Descriptors) -> ParamObject {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<_> = form_urlencoded::parse(query.as_bytes()).collect();

    let mut decoded = ParamObject::new();
    for (key, descriptor) in descriptors.iter() {
        let mut values = pairs
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, raw)| descriptor.kind.coerce(raw));

        if descriptor.array {
            let items: Vec<Scalar> = values.collect();
            if !items.is_empty() {
                decoded.insert(key, ParamValue::List(items));
            }
        } else if let Some(first) = values.next() {
            decoded.insert(key, ParamValue::Scalar(first));
        }
    }
    decoded
}

/// Only the `Infinity` spelling is accepted for infinities; Rust's `inf`,
/// `infinity` and `nan` forms in any case decode as `NaN`.
fn parse_number(raw: &str) -> f64 {
    let raw = raw.trim();
    match raw {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if raw
            .bytes()
            .any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) =>
        {
            f64::NAN
        }
        _ => raw.parse().unwrap_or(f64::NAN),
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
