//! Success and failure hooks.
//!
//! Every transport call made by an [`Api`](crate::Api) ends in exactly one
//! hook chain: the response goes to `resolve`; a transport failure, or an
//! error returned by `resolve`, goes to `reject`. The defaults pass the
//! response and the error through untouched.
//!
//! # Example
//!
//! ```
//! use fetchkit::hooks::{self, Hooks};
//! use fetchkit::Error;
//!
//! // Treat non-2xx as failures, and hide transport details from callers.
//! let hooks = Hooks::new(hooks::error_for_status, |err: Error| {
//!     Err(Error::rejected(format!("service unavailable ({err})")))
//! });
//! # let _ = hooks;
//! ```

use std::fmt;
use std::sync::Arc;

use crate::{Error, Response, Result};

type ResolveFn<T> = dyn Fn(Response) -> Result<T> + Send + Sync;
type RejectFn<T> = dyn Fn(Error) -> Result<T> + Send + Sync;

/// Resolve/reject pair producing a `T` for each call.
pub struct Hooks<T = Response> {
    resolve: Arc<ResolveFn<T>>,
    reject: Arc<RejectFn<T>>,
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            resolve: Arc::clone(&self.resolve),
            reject: Arc::clone(&self.reject),
        }
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

impl Default for Hooks<Response> {
    fn default() -> Self {
        Self::new(Ok, Err)
    }
}

impl<T> Hooks<T> {
    /// Hooks from a resolve and a reject function.
    pub fn new<R, J>(resolve: R, reject: J) -> Self
    where
        R: Fn(Response) -> Result<T> + Send + Sync + 'static,
        J: Fn(Error) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            resolve: Arc::new(resolve),
            reject: Arc::new(reject),
        }
    }

    /// Replace the resolve hook, keeping the reject hook.
    #[must_use]
    pub fn with_resolve<R>(self, resolve: R) -> Self
    where
        R: Fn(Response) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            resolve: Arc::new(resolve),
            reject: self.reject,
        }
    }

    /// Replace the reject hook, keeping the resolve hook.
    #[must_use]
    pub fn with_reject<J>(self, reject: J) -> Self
    where
        J: Fn(Error) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            resolve: self.resolve,
            reject: Arc::new(reject),
        }
    }

    /// Route a transport outcome through the hooks.
    ///
    /// A failing `resolve` is handed to `reject`, like a promise chain
    /// `.then(resolve).catch(reject)`.
    pub fn settle(&self, outcome: Result<Response>) -> Result<T> {
        match outcome.and_then(|response| (self.resolve)(response)) {
            Ok(value) => Ok(value),
            Err(err) => (self.reject)(err),
        }
    }
}

impl Hooks<Response> {
    /// Default hooks with [`error_for_status`] as resolve.
    #[must_use]
    pub fn error_for_status() -> Self {
        Self::default().with_resolve(error_for_status)
    }
}

/// Resolve hook turning non-2xx responses into [`Error::Http`].
///
/// # Errors
///
/// Returns [`Error::Http`] (with the body) when the status is not 2xx.
pub fn error_for_status(response: Response) -> Result<Response> {
    response.error_for_status()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::{check, let_assert};
    use bytes::Bytes;

    use super::*;

    fn response(status: u16) -> Response {
        Response::new(status, HashMap::new(), Bytes::from("body"))
    }

    #[test]
    fn default_hooks_are_identity() {
        let hooks = Hooks::default();

        let_assert!(Ok(ok) = hooks.settle(Ok(response(500))));
        check!(ok.status() == 500);

        let_assert!(Err(err) = hooks.settle(Err(Error::Timeout)));
        check!(err.is_timeout());
    }

    #[test]
    fn resolve_errors_reach_reject() {
        let rejected = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&rejected);
        let hooks = Hooks::error_for_status().with_reject(move |err| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(err)
        });

        let_assert!(Err(Error::Http { status: 503, .. }) = hooks.settle(Ok(response(503))));
        check!(rejected.load(Ordering::SeqCst) == 1);

        let_assert!(Ok(_) = hooks.settle(Ok(response(200))));
        check!(rejected.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn reject_can_recover() {
        let hooks: Hooks<String> = Hooks::new(
            |response: Response| Ok(response.text().unwrap_or_default()),
            |err: Error| Ok(format!("fallback after {err}")),
        );

        check!(hooks.settle(Ok(response(200))).ok() == Some("body".to_string()));
        check!(
            hooks.settle(Err(Error::Timeout)).ok()
                == Some("fallback after request timeout".to_string())
        );
    }
}
