//! The request facade.
//!
//! An [`Api`] bundles a [`RequestBuilder`] (base URL and base options), a
//! [`Transport`] and a pair of [`Hooks`]. It is cheap to clone and clones
//! share base state, so it can be handed to every consumer explicitly.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::hooks::Hooks;
use crate::{
    Binding, Descriptors, EffectiveRequest, HyperTransport, Method, OptionBag, ParamObject,
    ParamValue, RequestBuilder, Response, Result, StateCell, Transport, query,
};

/// Request facade: `fetch/get/post/put/del`, base state access and the query codec.
///
/// `T` is what a call yields after the resolve hook; [`Response`] by default.
///
/// # Example
///
/// ```ignore
/// use fetchkit::{Api, OptionBag, ParamObject};
///
/// let api = Api::builder()
///     .shared_url("https://api.example.com")
///     .config(OptionBag::new().with_header("Accept", "application/json"))
///     .build();
///
/// let params = ParamObject::new().with("q", "rust").with("page", 2);
/// let response = api.get("/search", None, params).await?;
///
/// api.set_url("https://staging.example.com")?;
/// ```
pub struct Api<C = HyperTransport, T = Response> {
    builder: RequestBuilder,
    transport: Arc<C>,
    hooks: Hooks<T>,
}

impl<C, T> Clone for Api<C, T> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            transport: Arc::clone(&self.transport),
            hooks: self.hooks.clone(),
        }
    }
}

impl<C, T> fmt::Debug for Api<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Builder using [`HyperTransport`] and identity hooks.
    #[must_use]
    pub fn builder() -> ApiBuilder {
        ApiBuilder::new(HyperTransport::new())
    }
}

impl<C, T> Api<C, T>
where
    C: Transport,
{
    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    /// Request `endpoint` with `base <- options`; no method is injected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInputKind`](crate::Error::InvalidInputKind)
    /// without calling the transport when `params` is not a mapping. Otherwise
    /// returns whatever the hooks produce.
    pub async fn fetch(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        let request = self
            .builder
            .build_request(endpoint, options, &params.into());
        self.dispatch(request).await
    }

    /// Request `endpoint` without query parameters.
    ///
    /// # Errors
    ///
    /// Returns whatever the hooks produce.
    pub async fn raw(&self, endpoint: &str, options: Option<&OptionBag>) -> Result<T> {
        self.fetch(endpoint, options, ParamValue::Undefined).await
    }

    /// `GET` request; a method in `options` wins.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn get(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.verb(Method::Get, endpoint, options, params.into()).await
    }

    /// `POST` request; a method in `options` wins.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn post(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.verb(Method::Post, endpoint, options, params.into()).await
    }

    /// `PUT` request; a method in `options` wins.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn put(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.verb(Method::Put, endpoint, options, params.into()).await
    }

    /// `DELETE` request; a method in `options` wins.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn del(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.verb(Method::Delete, endpoint, options, params.into()).await
    }

    /// JSON `GET`: sends `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn get_json(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.json(Method::Get, endpoint, options, params.into()).await
    }

    /// JSON `POST`: serializes the body unless `raw_body` is set.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn post_json(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.json(Method::Post, endpoint, options, params.into()).await
    }

    /// JSON `PUT`: serializes the body unless `raw_body` is set.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn put_json(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.json(Method::Put, endpoint, options, params.into()).await
    }

    /// JSON `DELETE`: sends `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Same as [`Api::fetch`].
    pub async fn del_json(
        &self,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: impl Into<ParamValue>,
    ) -> Result<T> {
        self.json(Method::Delete, endpoint, options, params.into()).await
    }

    async fn verb(
        &self,
        method: Method,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: ParamValue,
    ) -> Result<T> {
        let request = self
            .builder
            .build_with_method(method, endpoint, options, &params);
        self.dispatch(request).await
    }

    async fn json(
        &self,
        method: Method,
        endpoint: &str,
        options: Option<&OptionBag>,
        params: ParamValue,
    ) -> Result<T> {
        let request = self.builder.build_json(method, endpoint, options, &params);
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Result<EffectiveRequest>) -> Result<T> {
        // contract errors surface before the transport and skip the hooks
        let request = request?;
        debug!(method = ?request.method(), url = request.url(), "sending request");

        let outcome = self.transport.send(request).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "transport failed");
        }
        self.hooks.settle(outcome)
    }
}

impl<C, T> Api<C, T> {
    // ------------------------------------------------------------------------
    // Base state
    // ------------------------------------------------------------------------

    /// Current base URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.builder.url()
    }

    /// Current base options.
    #[must_use]
    pub fn config(&self) -> OptionBag {
        self.builder.config()
    }

    /// Replaces the base URL for all clones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisconfiguredBuilder`](crate::Error::MisconfiguredBuilder)
    /// if the base URL was given as a fixed value.
    pub fn set_url(&self, url: impl Into<String>) -> Result<()> {
        self.builder.set_url(url)
    }

    /// Replaces the base URL with a function of the previous one.
    ///
    /// `f` runs under the state lock (see [`StateCell::update`]): it must not
    /// read or set this state, or the call deadlocks.
    ///
    /// # Errors
    ///
    /// Same as [`Api::set_url`].
    pub fn update_url(&self, f: impl FnOnce(&String) -> String) -> Result<()> {
        self.builder.update_url(f)
    }

    /// Replaces the base options for all clones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisconfiguredBuilder`](crate::Error::MisconfiguredBuilder)
    /// if the base options were given as a fixed value.
    pub fn set_config(&self, config: OptionBag) -> Result<()> {
        self.builder.set_config(config)
    }

    /// Replaces the base options with a function of the previous ones.
    ///
    /// `f` runs under the state lock (see [`StateCell::update`]): it must not
    /// read or set this state, or the call deadlocks.
    ///
    /// # Errors
    ///
    /// Same as [`Api::set_config`].
    pub fn update_config(&self, f: impl FnOnce(&OptionBag) -> OptionBag) -> Result<()> {
        self.builder.update_config(f)
    }

    /// The underlying request builder.
    #[must_use]
    pub const fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    // ------------------------------------------------------------------------
    // Codec
    // ------------------------------------------------------------------------

    /// Encode parameters as a query string suffix; see [`query::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInputKind`](crate::Error::InvalidInputKind)
    /// when `params` is a sequence or a string.
    pub fn encode(&self, params: impl Into<ParamValue>) -> Result<String> {
        query::encode(&params.into())
    }

    /// Decode the allow-listed keys of a query string; see [`query::decode`].
    #[must_use]
    pub fn decode(&self, query_string: &str, descriptors: &Descriptors) -> ParamObject {
        query::decode(query_string, descriptors)
    }

    // ------------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------------

    /// Same base state and transport, different hooks.
    #[must_use]
    pub fn with_hooks<U>(&self, hooks: Hooks<U>) -> Api<C, U> {
        Api {
            builder: self.builder.clone(),
            transport: Arc::clone(&self.transport),
            hooks,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Api`].
///
/// Base URL and base options default to fixed empty values. Use
/// [`ApiBuilder::shared_url`] / [`ApiBuilder::shared_config`] (or pass your
/// own [`StateCell`]) to make `set_url` / `set_config` available.
pub struct ApiBuilder<C = HyperTransport, T = Response> {
    url: Binding<String>,
    config: Binding<OptionBag>,
    transport: C,
    hooks: Hooks<T>,
}

impl<C: fmt::Debug, T> fmt::Debug for ApiBuilder<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiBuilder")
            .field("url", &self.url)
            .field("config", &self.config)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl<C> ApiBuilder<C, Response> {
    /// Builder over a custom transport.
    pub fn new(transport: C) -> Self {
        Self {
            url: Binding::fixed(String::new()),
            config: Binding::fixed(OptionBag::new()),
            transport,
            hooks: Hooks::default(),
        }
    }
}

impl<C, T> ApiBuilder<C, T> {
    /// Fixed base URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Binding::fixed(url.into());
        self
    }

    /// Base URL owned by the `Api`, changeable with `set_url`.
    #[must_use]
    pub fn shared_url(self, url: impl Into<String>) -> Self {
        self.url_state(StateCell::new(url.into()))
    }

    /// Base URL read from an external cell.
    #[must_use]
    pub fn url_state(mut self, cell: StateCell<String>) -> Self {
        self.url = Binding::Shared(cell);
        self
    }

    /// Fixed base options.
    #[must_use]
    pub fn config(mut self, config: OptionBag) -> Self {
        self.config = Binding::fixed(config);
        self
    }

    /// Base options owned by the `Api`, changeable with `set_config`.
    #[must_use]
    pub fn shared_config(self, config: OptionBag) -> Self {
        self.config_state(StateCell::new(config))
    }

    /// Base options read from an external cell.
    #[must_use]
    pub fn config_state(mut self, cell: StateCell<OptionBag>) -> Self {
        self.config = Binding::Shared(cell);
        self
    }

    /// Replace the transport.
    #[must_use]
    pub fn transport<D>(self, transport: D) -> ApiBuilder<D, T> {
        ApiBuilder {
            url: self.url,
            config: self.config,
            transport,
            hooks: self.hooks,
        }
    }

    /// Replace the hooks.
    #[must_use]
    pub fn hooks<U>(self, hooks: Hooks<U>) -> ApiBuilder<C, U> {
        ApiBuilder {
            url: self.url,
            config: self.config,
            transport: self.transport,
            hooks,
        }
    }

    /// Build the [`Api`].
    #[must_use]
    pub fn build(self) -> Api<C, T> {
        Api {
            builder: RequestBuilder::from_bindings(self.url, self.config),
            transport: Arc::new(self.transport),
            hooks: self.hooks,
        }
    }
}
