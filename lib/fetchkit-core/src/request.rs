//! Request building.
//!
//! A [`RequestBuilder`] holds the base URL and base [`OptionBag`] and turns a
//! per-call endpoint, options and parameters into an [`EffectiveRequest`]:
//!
//! - url: `base_url + endpoint + query::encode(params)`
//! - options: `merge(base, per_call)`, with body instructions applied
//!
//! # Example
//!
//! ```
//! use fetchkit_core::{OptionBag, ParamObject, ParamValue, RequestBuilder};
//!
//! let builder = RequestBuilder::new("https://h", OptionBag::new());
//! let params = ParamValue::from(ParamObject::new().with("param", "val"));
//!
//! let request = builder.build_request("/path", None, &params).expect("object params");
//! assert_eq!(request.url(), "https://h/path?param=val");
//! assert!(request.options().is_empty());
//! ```

use std::iter;

use crate::options::merge;
use crate::state::{Binding, StateCell};
use crate::{ContentType, Method, OptionBag, ParamValue, Result, query};

/// Final `{url, options}` pair handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveRequest {
    url: String,
    options: OptionBag,
}

impl EffectiveRequest {
    /// Creates a request from its parts.
    #[must_use]
    pub fn new(url: impl Into<String>, options: OptionBag) -> Self {
        Self {
            url: url.into(),
            options,
        }
    }

    /// Full URL, query string included.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Merged options.
    #[must_use]
    pub const fn options(&self) -> &OptionBag {
        &self.options
    }

    /// Method, if any layer set one.
    #[must_use]
    pub fn method(&self) -> Option<Method> {
        self.options.method()
    }

    /// Consume into (url, options).
    #[must_use]
    pub fn into_parts(self) -> (String, OptionBag) {
        (self.url, self.options)
    }
}

/// Builds [`EffectiveRequest`]s from base state and per-call input.
///
/// The base URL and base options are each either fixed at construction or
/// backed by a [`StateCell`]. Only the latter accept `set_*`/`update_*`.
/// Clones share state.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: Binding<String>,
    config: Binding<OptionBag>,
}

impl RequestBuilder {
    /// Builder with a fixed base URL and base options.
    #[must_use]
    pub fn new(url: impl Into<String>, config: OptionBag) -> Self {
        Self::from_bindings(Binding::fixed(url.into()), Binding::fixed(config))
    }

    /// Builder whose base URL and base options live in shared cells.
    #[must_use]
    pub fn with_state(url: StateCell<String>, config: StateCell<OptionBag>) -> Self {
        Self::from_bindings(url.into(), config.into())
    }

    /// Builder from explicit bindings, fixed and shared may be mixed.
    #[must_use]
    pub const fn from_bindings(url: Binding<String>, config: Binding<OptionBag>) -> Self {
        Self { url, config }
    }

    // ------------------------------------------------------------------------
    // Base state
    // ------------------------------------------------------------------------

    /// Current base URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.url.get()
    }

    /// Current base options.
    #[must_use]
    pub fn config(&self) -> OptionBag {
        self.config.get()
    }

    /// Replaces the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisconfiguredBuilder`](crate::Error::MisconfiguredBuilder)
    /// if the base URL is fixed.
    pub fn set_url(&self, url: impl Into<String>) -> Result<()> {
        self.url.set(url.into(), "set_url")
    }

    /// Replaces the base URL with a function of the previous one.
    ///
    /// `f` runs under the state lock (see [`StateCell::update`]): it must not
    /// read or set this state, or the call deadlocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisconfiguredBuilder`](crate::Error::MisconfiguredBuilder)
    /// if the base URL is fixed.
    pub fn update_url(&self, f: impl FnOnce(&String) -> String) -> Result<()> {
        self.url.update(f, "set_url")
    }

    /// Replaces the base options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisconfiguredBuilder`](crate::Error::MisconfiguredBuilder)
    /// if the base options are fixed.
    pub fn set_config(&self, config: OptionBag) -> Result<()> {
        self.config.set(config, "set_config")
    }

    /// Replaces the base options with a function of the previous ones.
    ///
    /// `f` runs under the state lock (see [`StateCell::update`]): it must not
    /// read or set this state, or the call deadlocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisconfiguredBuilder`](crate::Error::MisconfiguredBuilder)
    /// if the base options are fixed.
    pub fn update_config(&self, f: impl FnOnce(&OptionBag) -> OptionBag) -> Result<()> {
        self.config.update(f, "set_config")
    }

    // ------------------------------------------------------------------------
    // Building
    // ------------------------------------------------------------------------

    /// Builds a request from `base <- per_call`.
    ///
    /// No method is injected: if neither layer sets one, the request has none.
    /// When `stringify_body` is set, a structured body is JSON-serialized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInputKind`](crate::Error::InvalidInputKind) when
    /// `params` is a sequence or a string, or a serialization error when the
    /// body cannot be serialized.
    pub fn build_request(
        &self,
        endpoint: &str,
        per_call: Option<&OptionBag>,
        params: &ParamValue,
    ) -> Result<EffectiveRequest> {
        let layers: Vec<&OptionBag> = per_call.into_iter().collect();
        self.assemble(endpoint, &layers, params, BodyMode::Flagged)
    }

    /// Builds a request from `base <- {method} <- per_call`.
    ///
    /// A method in `per_call` wins over `method`.
    ///
    /// # Errors
    ///
    /// Same as [`RequestBuilder::build_request`].
    pub fn build_with_method(
        &self,
        method: Method,
        endpoint: &str,
        per_call: Option<&OptionBag>,
        params: &ParamValue,
    ) -> Result<EffectiveRequest> {
        let verb = OptionBag::new().with_method(method);
        let layers: Vec<&OptionBag> = iter::once(&verb).chain(per_call).collect();
        self.assemble(endpoint, &layers, params, BodyMode::Flagged)
    }

    /// Builds a JSON request from
    /// `base <- {method} <- per_call <- {Content-Type: application/json}`.
    ///
    /// The body is JSON-serialized unless `raw_body` is set.
    ///
    /// # Errors
    ///
    /// Same as [`RequestBuilder::build_request`].
    pub fn build_json(
        &self,
        method: Method,
        endpoint: &str,
        per_call: Option<&OptionBag>,
        params: &ParamValue,
    ) -> Result<EffectiveRequest> {
        let verb = OptionBag::new().with_method(method);
        let json = OptionBag::new().with_header("Content-Type", ContentType::Json.as_str());
        let layers: Vec<&OptionBag> = iter::once(&verb)
            .chain(per_call)
            .chain(iter::once(&json))
            .collect();
        self.assemble(endpoint, &layers, params, BodyMode::Json)
    }

    /// `GET` request; see [`RequestBuilder::build_with_method`].
    ///
    /// # Errors
    ///
    /// Same as [`RequestBuilder::build_request`].
    pub fn get(
        &self,
        endpoint: &str,
        per_call: Option<&OptionBag>,
        params: &ParamValue,
    ) -> Result<EffectiveRequest> {
        self.build_with_method(Method::Get, endpoint, per_call, params)
    }

    /// `POST` request; see [`RequestBuilder::build_with_method`].
    ///
    /// # Errors
    ///
    /// Same as [`RequestBuilder::build_request`].
    pub fn post(
        &self,
        endpoint: &str,
        per_call: Option<&OptionBag>,
        params: &ParamValue,
    ) -> Result<EffectiveRequest> {
        self.build_with_method(Method::Post, endpoint, per_call, params)
    }

    /// `PUT` request; see [`RequestBuilder::build_with_method`].
    ///
    /// # Errors
    ///
    /// Same as [`RequestBuilder::build_request`].
    pub fn put(
        &self,
        endpoint: &str,
        per_call: Option<&OptionBag>,
        params: &ParamValue,
    ) -> Result<EffectiveRequest> {
        self.build_with_method(Method::Put, endpoint, per_call, params)
    }

    /// `DELETE` request; see [`RequestBuilder::build_with_method`].
    ///
    /// # Errors
    ///
    /// Same as [`RequestBuilder::build_request`].
    pub fn delete(
        &self,
        endpoint: &str,
        per_call: Option<&OptionBag>,
        params: &ParamValue,
    ) -> Result<EffectiveRequest> {
        self.build_with_method(Method::Delete, endpoint, per_call, params)
    }

    fn assemble(
        &self,
        endpoint: &str,
        layers: &[&OptionBag],
        params: &ParamValue,
        mode: BodyMode,
    ) -> Result<EffectiveRequest> {
        let query = query::encode(params)?;
        let url = self.url.with(|base| format!("{base}{endpoint}{query}"));
        let options = self
            .config
            .with(|base| merge(iter::once(base).chain(layers.iter().copied())));

        let stringify = match mode {
            BodyMode::Flagged => options.stringify_body(),
            BodyMode::Json => !options.raw_body(),
        };
        let options = options.into_transport(stringify)?;

        Ok(EffectiveRequest { url, options })
    }
}

#[derive(Debug, Clone, Copy)]
enum BodyMode {
    /// Serialize only when `stringify_body` is set.
    Flagged,
    /// Serialize unless `raw_body` is set.
    Json,
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::{Body, Error, ParamObject};

    fn params(object: ParamObject) -> ParamValue {
        ParamValue::from(object)
    }

    #[test]
    fn build_request_appends_query() {
        let builder = RequestBuilder::new("https://h", OptionBag::new());
        let request = builder
            .build_request("/path", None, &params(ParamObject::new().with("param", "val")))
            .expect("build");

        check!(request.url() == "https://h/path?param=val");
        check!(request.options() == &OptionBag::new());
    }

    #[test]
    fn build_request_never_injects_method() {
        let builder = RequestBuilder::new("https://h", OptionBag::new().with_header("B", "2"));
        let request = builder
            .build_request("/p", None, &ParamValue::Undefined)
            .expect("build");

        check!(request.url() == "https://h/p");
        check!(request.method().is_none());
    }

    #[test]
    fn get_merges_headers_and_sets_method() {
        let builder = RequestBuilder::new("https://h", OptionBag::new().with_header("B", "2"));
        let per_call = OptionBag::new().with_header("A", "1");
        let request = builder
            .get("/p", Some(&per_call), &ParamValue::Undefined)
            .expect("build");

        let expected = OptionBag::new()
            .with_method(Method::Get)
            .with_header("A", "1")
            .with_header("B", "2");
        check!(request.options() == &expected);
    }

    #[test]
    fn per_call_method_beats_verb() {
        let builder = RequestBuilder::new("https://h", OptionBag::new());
        let per_call = OptionBag::new().with_method(Method::Patch);
        let request = builder
            .post("/p", Some(&per_call), &ParamValue::Undefined)
            .expect("build");
        check!(request.method() == Some(Method::Patch));
    }

    #[test]
    fn verb_beats_base_method() {
        let builder = RequestBuilder::new("https://h", OptionBag::new().with_method(Method::Post));
        let request = builder
            .delete("/p", None, &ParamValue::Undefined)
            .expect("build");
        check!(request.method() == Some(Method::Delete));
    }

    #[test]
    fn stringify_body_serializes_and_is_stripped() {
        let builder = RequestBuilder::new("https://h", OptionBag::new().with_stringify_body(true));
        let per_call = OptionBag::new().with_body(json!({"param": "val"}));
        let request = builder
            .put("/p", Some(&per_call), &ParamValue::Undefined)
            .expect("build");

        check!(request.options().body() == Some(&Body::from(r#"{"param":"val"}"#)));
        check!(!request.options().stringify_body());
        check!(
            request.options()
                == &OptionBag::new()
                    .with_method(Method::Put)
                    .with_body(r#"{"param":"val"}"#)
        );
    }

    #[test]
    fn structured_body_is_kept_without_flag() {
        let builder = RequestBuilder::new("https://h", OptionBag::new());
        let per_call = OptionBag::new().with_body(json!({"a": 1}));
        let request = builder
            .build_request("/p", Some(&per_call), &ParamValue::Undefined)
            .expect("build");
        check!(request.options().body() == Some(&Body::Json(json!({"a": 1}))));
    }

    #[test]
    fn json_variant_forces_content_type() {
        let builder = RequestBuilder::new("https://h", OptionBag::new());
        let per_call = OptionBag::new()
            .with_header("Content-Type", "text/plain")
            .with_body(json!([1, 2]));
        let request = builder
            .build_json(Method::Post, "/p", Some(&per_call), &ParamValue::Undefined)
            .expect("build");

        check!(request.options().header("Content-Type") == Some("application/json"));
        check!(request.options().body() == Some(&Body::from("[1,2]")));
        check!(request.method() == Some(Method::Post));
    }

    #[test]
    fn json_variant_respects_raw_body() {
        let builder = RequestBuilder::new("https://h", OptionBag::new());
        let per_call = OptionBag::new()
            .with_raw_body(true)
            .with_body(json!({"a": 1}));
        let request = builder
            .build_json(Method::Put, "/p", Some(&per_call), &ParamValue::Undefined)
            .expect("build");

        check!(request.options().body() == Some(&Body::Json(json!({"a": 1}))));
        check!(!request.options().raw_body());
    }

    #[test]
    fn invalid_params_fail_fast() {
        let builder = RequestBuilder::new("https://h", OptionBag::new());
        let list = ParamValue::from(vec!["str"]);
        let_assert!(Err(Error::InvalidInputKind { kind }) = builder.get("/p", None, &list));
        check!(kind == "array");
    }

    #[test]
    fn fixed_builder_refuses_setters() {
        let builder = RequestBuilder::new("https://h", OptionBag::new());
        let_assert!(Err(Error::MisconfiguredBuilder { setter }) = builder.set_url("https://x"));
        check!(setter == "set_url");
        let_assert!(
            Err(Error::MisconfiguredBuilder { setter }) = builder.set_config(OptionBag::new())
        );
        check!(setter == "set_config");
    }

    #[test]
    fn shared_state_is_read_at_call_time() {
        let url = StateCell::new(String::from("https://a"));
        let config = StateCell::new(OptionBag::new());
        let builder = RequestBuilder::with_state(url.clone(), config);

        builder.set_url("https://b").expect("shared");
        builder
            .update_config(|base| base.clone().with_header("X", "1"))
            .expect("shared");

        let request = builder
            .build_request("/p", None, &ParamValue::Undefined)
            .expect("build");
        check!(url.get() == "https://b");
        check!(request.url() == "https://b/p");
        check!(request.options().header("X") == Some("1"));
    }
}
