//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fetchkit::prelude::*;
//! ```

pub use crate::{
    Api, Body, Descriptors, Error, Hooks, HyperTransport, Method, OptionBag, ParamObject,
    ParamValue, Params, QueryDescriptor, Response, Result, StateCell, ToParams, Transport,
};
pub use serde::{Deserialize, Serialize};
