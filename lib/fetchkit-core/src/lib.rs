//! Core types for fetchkit.
//!
//! This crate holds everything that does not touch the network:
//! - [`ParamObject`] / [`ParamValue`] - query parameter values
//! - [`query`] - query string [`encode`](query::encode) / [`decode`](query::decode)
//! - [`OptionBag`] and [`merge`] - layered transport options
//! - [`RequestBuilder`] and [`EffectiveRequest`] - `{url, options}` construction
//! - [`StateCell`] - shared base URL / base options
//! - [`Transport`] - the seam to the network
//! - [`Response`], [`Error`] and [`Result`]
//! - [`StatusCode`] and [`header`] - re-exported from the `http` crate

mod body;
mod error;
mod method;
mod options;
pub mod prelude;
pub mod query;
mod request;
mod response;
mod state;
mod transport;
mod value;

pub use body::{Body, ContentType, from_json, to_json};
pub use error::{Error, Result};
pub use method::Method;
pub use options::{Field, Headers, OptionBag, merge};
pub use query::{Descriptors, QueryDescriptor, ValueKind};
pub use request::{EffectiveRequest, RequestBuilder};
pub use response::Response;
pub use state::{Binding, StateCell};
pub use transport::{Transport, TransportFn, transport_fn};
pub use value::{ParamObject, ParamValue, Scalar, ToParamValue, ToParams};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};

// Date values in parameters are `chrono` types
pub use chrono;
