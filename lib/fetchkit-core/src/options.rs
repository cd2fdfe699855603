//! Transport option bags and their layered merge.
//!
//! An [`OptionBag`] describes how a request should be sent: method, headers,
//! body and any extra transport option. Every field is tri-state (see
//! [`Field`]) so a later bag can leave a value alone, override it, or delete
//! it with an explicit [`Field::Undefined`].
//!
//! # Example
//!
//! ```
//! use fetchkit_core::{Method, OptionBag, merge};
//!
//! let base = OptionBag::new().with_header("A", "1").with_method(Method::Post);
//! let call = OptionBag::new().with_header("B", "2").unset_method();
//!
//! let merged = merge([&base, &call]);
//! assert_eq!(merged.method(), None);
//! assert_eq!(merged.header("A"), Some("1"));
//! assert_eq!(merged.header("B"), Some("2"));
//! ```

use std::collections::BTreeMap;

use crate::{Body, Method};

// ============================================================================
// Field
// ============================================================================

/// Tri-state option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Not mentioned: earlier layers show through.
    Absent,
    /// Explicitly undefined: removes the key from the merged result.
    Undefined,
    /// Explicit value.
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    /// Returns `true` for [`Field::Absent`].
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` for [`Field::Set`].
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// The value, if set.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Absent | Self::Undefined => None,
        }
    }

    /// Consume into the value, if set.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Absent | Self::Undefined => None,
        }
    }

    /// Drop an explicit `Undefined`, leaving only absent or set.
    #[must_use]
    fn resolved(self) -> Self {
        match self {
            Self::Undefined => Self::Absent,
            other => other,
        }
    }
}

impl<T: Clone> Field<T> {
    /// Apply a later layer on top of this one.
    fn overlay(&mut self, later: &Self) {
        if !later.is_absent() {
            *self = later.clone();
        }
    }
}

// ============================================================================
// Headers
// ============================================================================

/// Header sub-mapping of an [`OptionBag`].
///
/// Names are compared exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Headers {
    entries: BTreeMap<String, Field<String>>,
}

impl Headers {
    /// Empty header set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Sets a header, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), Field::Set(value.into()));
    }

    /// Marks a header as explicitly undefined, removing it when merged.
    pub fn unset(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), Field::Undefined);
    }

    /// Value of a header, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(Field::value)
            .map(String::as_str)
    }

    /// Iterates the headers that carry a value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(name, value)| value.value().map(|v| (name.as_str(), v.as_str())))
    }

    /// Number of entries, undefined ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn overlay(&mut self, later: &Self) {
        for (name, value) in &later.entries {
            self.entries
                .entry(name.clone())
                .or_default()
                .overlay(value);
        }
    }

    fn resolved(mut self) -> Self {
        self.entries.retain(|_, value| value.is_set());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

// ============================================================================
// OptionBag
// ============================================================================

/// Transport options for one request layer.
///
/// Built with the `with_*` / `unset_*` methods, read with the accessors.
/// `stringify_body` and `raw_body` are instructions for the request builder
/// and never reach the transport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionBag {
    method: Field<Method>,
    headers: Option<Headers>,
    body: Field<Body>,
    stringify_body: Field<bool>,
    raw_body: Field<bool>,
    extra: BTreeMap<String, Field<serde_json::Value>>,
}

impl OptionBag {
    /// Empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Field::Set(method);
        self
    }

    /// Explicitly clears the HTTP method.
    #[must_use]
    pub fn unset_method(mut self) -> Self {
        self.method = Field::Undefined;
        self
    }

    /// Sets one header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name, value);
        self
    }

    /// Explicitly clears one header.
    #[must_use]
    pub fn unset_header(mut self, name: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(Headers::new).unset(name);
        self
    }

    /// Replaces the header sub-mapping of this bag.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Field::Set(body.into());
        self
    }

    /// Explicitly clears the body.
    #[must_use]
    pub fn unset_body(mut self) -> Self {
        self.body = Field::Undefined;
        self
    }

    /// Asks the request builder to JSON-serialize a structured body.
    #[must_use]
    pub fn with_stringify_body(mut self, stringify: bool) -> Self {
        self.stringify_body = Field::Set(stringify);
        self
    }

    /// Asks the JSON request variants to send the body untouched.
    #[must_use]
    pub fn with_raw_body(mut self, raw: bool) -> Self {
        self.raw_body = Field::Set(raw);
        self
    }

    /// Sets an extra transport option (e.g. `"credentials"`).
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), Field::Set(value));
        self
    }

    /// Explicitly clears an extra transport option.
    #[must_use]
    pub fn unset_option(mut self, key: impl Into<String>) -> Self {
        self.extra.insert(key.into(), Field::Undefined);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// HTTP method, if set.
    #[must_use]
    pub fn method(&self) -> Option<Method> {
        self.method.value().copied()
    }

    /// Header sub-mapping; `None` when no layer defined headers.
    #[must_use]
    pub const fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// Single header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| headers.get(name))
    }

    /// Body, if set.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.value()
    }

    /// Whether a structured body should be JSON-serialized.
    #[must_use]
    pub fn stringify_body(&self) -> bool {
        self.stringify_body.value().copied().unwrap_or(false)
    }

    /// Whether the JSON variants should leave the body untouched.
    #[must_use]
    pub fn raw_body(&self) -> bool {
        self.raw_body.value().copied().unwrap_or(false)
    }

    /// Extra transport option, if set.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key).and_then(Field::value)
    }

    /// Iterates extra transport options that carry a value.
    pub fn extra_options(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.extra
            .iter()
            .filter_map(|(key, value)| value.value().map(|v| (key.as_str(), v)))
    }

    /// Returns `true` when the bag carries nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.method.is_absent()
            && self.headers.is_none()
            && self.body.is_absent()
            && self.stringify_body.is_absent()
            && self.raw_body.is_absent()
            && self.extra.is_empty()
    }

    /// Merge `later` on top of `self`. Shorthand for `merge([self, later])`.
    #[must_use]
    pub fn merged_with(&self, later: &Self) -> Self {
        merge([self, later])
    }

    // ------------------------------------------------------------------------
    // Request builder support
    // ------------------------------------------------------------------------

    /// Apply the body instructions and strip them from the bag.
    ///
    /// # Errors
    ///
    /// Returns an error if the body must be serialized and serialization fails.
    pub(crate) fn into_transport(mut self, stringify: bool) -> crate::Result<Self> {
        if stringify {
            self.body = match self.body {
                Field::Set(body) => Field::Set(body.stringify()?),
                other => other,
            };
        }
        self.stringify_body = Field::Absent;
        self.raw_body = Field::Absent;
        Ok(self)
    }

    fn overlay(&mut self, later: &Self, headers: &mut Option<Headers>) {
        self.method.overlay(&later.method);
        self.body.overlay(&later.body);
        self.stringify_body.overlay(&later.stringify_body);
        self.raw_body.overlay(&later.raw_body);
        for (key, value) in &later.extra {
            self.extra.entry(key.clone()).or_default().overlay(value);
        }
        if let Some(later_headers) = &later.headers {
            headers
                .get_or_insert_with(Headers::new)
                .overlay(later_headers);
        }
    }

    fn resolved(mut self) -> Self {
        self.method = self.method.resolved();
        self.body = self.body.resolved();
        self.stringify_body = self.stringify_body.resolved();
        self.raw_body = self.raw_body.resolved();
        self.extra.retain(|_, value| value.is_set());
        self.headers = self.headers.map(Headers::resolved);
        self
    }
}

// ============================================================================
// Merge
// ============================================================================

/// Merge option bags left to right; later bags win.
///
/// 1. Every field is overridden by the last bag that mentions it.
/// 2. Headers are merged per name across all bags. The result has no headers
///    at all when no bag defined any.
/// 3. Fields and headers whose final value is [`Field::Undefined`] are removed.
///
/// Inputs are only borrowed; the result is a new bag.
pub fn merge<'a, I>(bags: I) -> OptionBag
where
    I: IntoIterator<Item = &'a OptionBag>,
{
    let mut merged = OptionBag::default();
    let mut headers = None;
    for bag in bags {
        merged.overlay(bag, &mut headers);
    }
    merged.headers = headers;
    merged.resolved()
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn headers_are_unioned() {
        let merged = merge([
            &OptionBag::new().with_header("A", "1"),
            &OptionBag::new().with_header("B", "2"),
        ]);
        check!(merged == OptionBag::new().with_header("A", "1").with_header("B", "2"));
    }

    #[test]
    fn later_header_wins() {
        let merged = merge([
            &OptionBag::new().with_header("A", "1"),
            &OptionBag::new().with_header("A", "2"),
        ]);
        check!(merged.header("A") == Some("2"));
        check!(merged.headers().map(Headers::len) == Some(1));
    }

    #[test]
    fn undefined_removes_key() {
        let merged = merge([
            &OptionBag::new().with_option("x", serde_json::json!(1)),
            &OptionBag::new().unset_option("x"),
        ]);
        check!(merged == OptionBag::new());
        check!(merged.is_empty());
    }

    #[test]
    fn undefined_removes_method_and_body() {
        let base = OptionBag::new()
            .with_method(Method::Post)
            .with_body("payload");
        let call = OptionBag::new().unset_method().unset_body();

        let merged = merge([&base, &call]);
        check!(merged.method().is_none());
        check!(merged.body().is_none());
        check!(merged.is_empty());
    }

    #[test]
    fn undefined_header_is_removed() {
        let merged = merge([
            &OptionBag::new().with_header("A", "1").with_header("B", "2"),
            &OptionBag::new().unset_header("A"),
        ]);
        check!(merged == OptionBag::new().with_header("B", "2"));
    }

    #[test]
    fn no_headers_anywhere_means_absent() {
        let merged = merge([
            &OptionBag::new().with_method(Method::Get),
            &OptionBag::new(),
        ]);
        check!(merged.headers().is_none());
    }

    #[test]
    fn empty_headers_stay_distinguishable() {
        let merged = merge([&OptionBag::new().with_headers(Headers::new())]);
        check!(merged.headers() == Some(&Headers::new()));
    }

    #[test]
    fn absent_does_not_override() {
        let merged = merge([
            &OptionBag::new().with_method(Method::Put).with_header("A", "1"),
            &OptionBag::new().with_header("B", "2"),
        ]);
        check!(merged.method() == Some(Method::Put));
    }

    #[test]
    fn undefined_can_be_reset_by_later_layer() {
        let merged = merge([
            &OptionBag::new().with_method(Method::Get),
            &OptionBag::new().unset_method(),
            &OptionBag::new().with_method(Method::Delete),
        ]);
        check!(merged.method() == Some(Method::Delete));
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let base = OptionBag::new().with_header("A", "1");
        let call = OptionBag::new().unset_header("A");
        let (base_before, call_before) = (base.clone(), call.clone());

        let _ = merge([&base, &call]);
        check!(base == base_before);
        check!(call == call_before);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        check!(merge(Vec::<&OptionBag>::new()).is_empty());
    }

    #[test]
    fn extra_options_merge_per_key() {
        let merged = OptionBag::new()
            .with_option("credentials", serde_json::json!("include"))
            .with_option("mode", serde_json::json!("cors"))
            .merged_with(&OptionBag::new().with_option("mode", serde_json::json!("same-origin")));

        let options: Vec<_> = merged.extra_options().collect();
        check!(
            options
                == vec![
                    ("credentials", &serde_json::json!("include")),
                    ("mode", &serde_json::json!("same-origin")),
                ]
        );
    }

    #[test]
    fn into_transport_strips_flags() {
        let bag = OptionBag::new()
            .with_body(serde_json::json!({"param": "val"}))
            .with_stringify_body(true)
            .with_raw_body(false);

        let sent = bag.into_transport(true).expect("stringify");
        check!(sent == OptionBag::new().with_body(r#"{"param":"val"}"#));
    }
}
