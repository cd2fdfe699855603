//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fetchkit_core::prelude::*;
//! ```

pub use crate::{
    Body, Descriptors, EffectiveRequest, Error, Method, OptionBag, ParamObject, ParamValue,
    QueryDescriptor, RequestBuilder, Response, Result, StateCell, ToParams, Transport, merge,
};
