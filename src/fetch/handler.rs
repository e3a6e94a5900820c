//! The handler capability.

use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};

use super::{BoxError, Request, Response};

/// Future returned by a handler. `Ok(None)` declines to answer.
pub type HandlerFuture = BoxFuture<'static, Result<Option<Response>, BoxError>>;

/// Turns a [`Request`] into a [`Response`], or into nothing.
///
/// Invoked at most once per exchange, with no ordering guarantees
/// relative to other exchanges.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Response>, BoxError>> + Send + 'static,
{
    fn call(&self, request: Request) -> HandlerFuture {
        (self)(request).boxed()
    }
}
