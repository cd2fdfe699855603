//! Error types for fetchkit.

use derive_more::{Display, Error, From};

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for fetchkit operations.
///
/// Variants fall in three groups:
/// - contract errors raised synchronously at the call site
///   ([`Error::InvalidInputKind`], [`Error::MisconfiguredBuilder`]),
/// - transport failures, handed untouched to the reject hook,
/// - serialization errors for request and response bodies.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Query encoding was given something other than a mapping.
    #[display("query parameters should be an object, got {kind}")]
    #[from(skip)]
    InvalidInputKind {
        /// Kind of value that was received (`"array"`, `"string"`).
        #[error(not(source))]
        kind: &'static str,
    },

    /// A state setter was called on a builder whose state is fixed.
    #[display("`{setter}` is not available: the builder was created with a fixed value")]
    #[from(skip)]
    MisconfiguredBuilder {
        /// Name of the setter that was invoked.
        #[error(not(source))]
        setter: &'static str,
    },

    /// HTTP-level errors (non-2xx status codes).
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The transport could not turn the options into a request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// A hook rejected the outcome with its own message.
    #[display("rejected: {_0}")]
    #[from(skip)]
    Rejected(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid input kind error.
    #[must_use]
    pub const fn invalid_input_kind(kind: &'static str) -> Self {
        Self::InvalidInputKind { kind }
    }

    /// Create a misconfigured builder error.
    #[must_use]
    pub const fn misconfigured(setter: &'static str) -> Self {
        Self::MisconfiguredBuilder { setter }
    }

    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a rejection carrying a hook-provided message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the error was produced by the transport call.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Http { .. }
                | Self::Connection(_)
                | Self::Tls(_)
                | Self::Timeout
                | Self::InvalidRequest(_)
                | Self::InvalidUrl(_)
        )
    }

    /// Returns `true` for errors caused by misuse at the call site.
    #[must_use]
    pub const fn is_contract_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInputKind { .. } | Self::MisconfiguredBuilder { .. }
        )
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `None` if there is no body or this is not an HTTP error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::invalid_input_kind("array");
        assert_eq!(
            err.to_string(),
            "query parameters should be an object, got array"
        );

        let err = Error::misconfigured("set_url");
        assert_eq!(
            err.to_string(),
            "`set_url` is not available: the builder was created with a fixed value"
        );

        let err = Error::http(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::rejected("TypeError");
        assert_eq!(err.to_string(), "rejected: TypeError");
    }

    #[test]
    fn error_classification() {
        assert!(Error::invalid_input_kind("string").is_contract_error());
        assert!(Error::misconfigured("set_config").is_contract_error());
        assert!(!Error::invalid_input_kind("string").is_transport_failure());

        assert!(Error::Timeout.is_transport_failure());
        assert!(Error::connection("refused").is_transport_failure());
        assert!(Error::http(500, "boom").is_transport_failure());
        assert!(!Error::rejected("nope").is_transport_failure());
    }

    #[test]
    fn error_status() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = Error::http(503, "Service Unavailable");
        assert!(err.is_server_error());

        assert_eq!(Error::Timeout.status(), None);
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            error: String,
        }

        let body = bytes::Bytes::from(r#"{"error": "not found"}"#);
        let err = Error::http_with_body(404, "Not Found", body);

        let decoded = err
            .decode_body::<ApiError>()
            .expect("should have body")
            .expect("should decode");
        assert_eq!(
            decoded,
            ApiError {
                error: "not found".to_string()
            }
        );

        assert!(Error::http(404, "Not Found").decode_body::<ApiError>().is_none());
        assert!(Error::Timeout.decode_body::<ApiError>().is_none());
    }
}
