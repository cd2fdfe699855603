//! Layered request building and query-string encoding over an async HTTP transport.
//!
//! An [`Api`] holds a base URL and base [`OptionBag`], merges them with
//! per-call options, appends the encoded query parameters and hands the
//! resulting [`EffectiveRequest`] to a [`Transport`]. The outcome goes through
//! a pair of [`hooks`].
//!
//! # Example
//!
//! ```ignore
//! use fetchkit::prelude::*;
//!
//! #[derive(Params)]
//! #[params(rename_all = "camelCase")]
//! struct Search {
//!     search_text: String,
//!     page: Option<u32>,
//! }
//!
//! let api = Api::builder()
//!     .shared_url("https://api.example.com")
//!     .config(OptionBag::new().with_header("Accept", "application/json"))
//!     .hooks(Hooks::error_for_status())
//!     .build();
//!
//! let search = Search { search_text: "rust".into(), page: None };
//! let response = api.get("/search", None, search.to_params()).await?;
//! // GET https://api.example.com/search?searchText=rust
//! ```

mod api;
mod client;
mod config;
mod connector;
pub mod hooks;
pub mod middleware;
pub mod prelude;

pub use api::{Api, ApiBuilder};
pub use client::{BoxedService, DEFAULT_METHOD, HyperTransport, HyperTransportBuilder, ServiceFuture};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use hooks::Hooks;

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use fetchkit_core::{
    Binding, Body, ContentType, Descriptors, EffectiveRequest, Error, Field, Headers, Method,
    OptionBag, ParamObject, ParamValue, QueryDescriptor, RequestBuilder, Response, Result, Scalar,
    StateCell, ToParamValue, ToParams, Transport, TransportFn, ValueKind, chrono, from_json, merge,
    query, to_json, transport_fn,
};

// Re-export http types for status codes and headers
pub use fetchkit_core::{StatusCode, header};

// Re-export macros
pub use fetchkit_macro::Params;
