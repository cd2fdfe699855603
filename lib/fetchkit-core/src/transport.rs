//! Transport trait.
//!
//! A [`Transport`] takes an [`EffectiveRequest`] and performs the network
//! call. Implement it directly for custom transports or test doubles, or wrap
//! an async closure with [`transport_fn`].

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{EffectiveRequest, Response, Result};

/// Executes effective requests.
///
/// Implementations report network-level failures (connection, TLS, timeout)
/// as errors and return every received response, whatever its status.
pub trait Transport: Send + Sync {
    /// Send the request and wait for the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or no response was
    /// received.
    fn send(
        &self,
        request: EffectiveRequest,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: EffectiveRequest,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).send(request)
    }
}

/// [`Transport`] backed by an async function.
#[derive(Debug, Clone, Copy)]
pub struct TransportFn<F> {
    f: F,
}

/// Wraps an async function as a [`Transport`].
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use bytes::Bytes;
/// use fetchkit_core::{EffectiveRequest, Response, transport_fn};
///
/// let transport = transport_fn(|request: EffectiveRequest| async move {
///     Ok(Response::new(200, HashMap::new(), Bytes::new()).with_url(request.url()))
/// });
/// # let _ = transport;
/// ```
pub const fn transport_fn<F, Fut>(f: F) -> TransportFn<F>
where
    F: Fn(EffectiveRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>>> + Send,
{
    TransportFn { f }
}

impl<F, Fut> Transport for TransportFn<F>
where
    F: Fn(EffectiveRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>>> + Send,
{
    fn send(
        &self,
        request: EffectiveRequest,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (self.f)(request)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};

    use super::*;
    use crate::{Error, OptionBag};

    #[tokio::test]
    async fn transport_fn_forwards_requests() {
        let transport = transport_fn(|request: EffectiveRequest| async move {
            Ok(Response::new(200, HashMap::new(), Bytes::from(request.url().to_string())))
        });

        let response = transport
            .send(EffectiveRequest::new("https://h/p", OptionBag::new()))
            .await
            .expect("send");
        check!(response.body().as_ref() == b"https://h/p");
    }

    #[tokio::test]
    async fn arc_transport_delegates() {
        let transport = Arc::new(transport_fn(|_request: EffectiveRequest| async {
            Err::<Response, _>(Error::Timeout)
        }));

        let result = transport
            .send(EffectiveRequest::new("https://h", OptionBag::new()))
            .await;
        let_assert!(Err(err) = result);
        check!(err.is_timeout());
    }
}
