//! Tower middleware for [`HyperTransport`](crate::HyperTransport).
//!
//! Layers wrap a service of [`EffectiveRequest`](crate::EffectiveRequest) to
//! [`Response`](crate::Response) and are added with
//! [`HyperTransportBuilder::layer`](crate::HyperTransportBuilder::layer).
//!
//! - [`LoggingLayer`] - logs requests/responses using `tracing`
//!
//! # Example
//!
//! ```ignore
//! use fetchkit::HyperTransport;
//! use fetchkit::middleware::LoggingLayer;
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::new())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for custom layers
pub use tower::{Layer, ServiceBuilder};
