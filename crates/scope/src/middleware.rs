//! Transport-boundary middleware that establishes the [`RequestContext`].
//!
//! Install [`RequestScopeLayer`] on the HTTP stack (e.g. `axum::Router::layer`). For every request
//! it snapshots the request head into an [`InboundRequest`], stores that snapshot in the request
//! extensions and drives the inner service inside a request scope. The scope is torn down when
//! the inner future resolves, errors, panics or is dropped.
//!
//! The extension lets handlers that continue the work on another task re-enter the scope with the
//! identical snapshot.

use crate::context::{InboundRequest, RequestContext};
use http::Request;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::futures::TaskLocalFuture;
use tower::{Layer, Service};

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestScopeLayer;

impl RequestScopeLayer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestScopeLayer {
    type Service = RequestScope<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestScope { inner }
    }
}

/// Service produced by [`RequestScopeLayer`].
#[derive(Debug, Clone)]
pub struct RequestScope<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestScope<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = TaskLocalFuture<Option<Arc<InboundRequest>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let inbound = Arc::new(InboundRequest::new(
            request.method().clone(),
            request.uri().clone(),
            request.headers().clone(),
        ));
        request.extensions_mut().insert(Arc::clone(&inbound));
        tracing::trace!(method = %inbound.method(), path = %inbound.uri().path(), "request scope entered");

        // `call` may do synchronous work before handing back its future; scope that too.
        let inner = &mut self.inner;
        let future = RequestContext::sync_scope(Some(Arc::clone(&inbound)), || inner.call(request));
        RequestContext::scope(Some(inbound), future)
    }
}
