//! Ambient, task-scoped access to the inbound request being served.
//!
//! The current request lives in a tokio task-local. A scope installs a value for the duration of
//! one future (or one synchronous closure) and restores whatever was installed before once that
//! future completes, fails, panics or is dropped. Concurrently served requests never observe each
//! other's value: each scope travels with its own future, across `.await` points and across
//! worker threads.
//!
//! Tasks spawned from inside a scope do **not** inherit it; re-enter the scope explicitly with the
//! same [`InboundRequest`] if a handler hops tasks.

use http::{HeaderMap, Method, Uri};
use std::future::Future;
use std::sync::Arc;
use tokio::task::futures::TaskLocalFuture;

tokio::task_local! {
    static CURRENT_REQUEST: Option<Arc<InboundRequest>>;
}

/// Read-only snapshot of an inbound HTTP request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl InboundRequest {
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// Snapshot the request line and headers of an `http` request head.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
        )
    }

    /// A request that carries only headers (`GET /`).
    #[must_use]
    pub fn from_headers(headers: HeaderMap) -> Self {
        Self::new(Method::GET, Uri::from_static("/"), headers)
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup.
    ///
    /// Returns `None` when the header is missing or its value is not visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Accessor for the request-scoped ambient value.
///
/// `scope` pairs the "set" with the matching "reset": the previous value is put back when the
/// returned future finishes, whatever the outcome, so scopes nest correctly.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext;

impl RequestContext {
    /// The request installed by the innermost enclosing scope, if any.
    ///
    /// Outside every scope (stdio transport, background tasks, tests) this is `None`.
    #[must_use]
    pub fn get() -> Option<Arc<InboundRequest>> {
        CURRENT_REQUEST.try_with(Clone::clone).ok().flatten()
    }

    /// Run `future` with `request` as the ambient request.
    ///
    /// Passing `None` masks any outer request for the duration of `future`.
    pub fn scope<F>(
        request: Option<Arc<InboundRequest>>,
        future: F,
    ) -> TaskLocalFuture<Option<Arc<InboundRequest>>, F>
    where
        F: Future,
    {
        CURRENT_REQUEST.scope(request, future)
    }

    /// Run a synchronous closure with `request` as the ambient request.
    pub fn sync_scope<F, R>(request: Option<Arc<InboundRequest>>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT_REQUEST.sync_scope(request, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn request_with(header: &'static str, value: &'static str) -> Arc<InboundRequest> {
        let mut headers = HeaderMap::new();
        headers.insert(header, HeaderValue::from_static(value));
        Arc::new(InboundRequest::from_headers(headers))
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = request_with("x-bitrise-enabled-api-groups", "apps");
        assert_eq!(req.header("X-Bitrise-Enabled-API-Groups"), Some("apps"));
        assert_eq!(req.header("x-bitrise-enabled-api-groups"), Some("apps"));
        assert_eq!(req.header("x-other"), None);
    }

    #[test]
    fn get_is_none_outside_any_scope() {
        assert!(RequestContext::get().is_none());
    }

    #[test]
    fn sync_scope_restores_previous_value_when_nested() {
        let outer = request_with("x-id", "outer");
        let inner = request_with("x-id", "inner");

        RequestContext::sync_scope(Some(Arc::clone(&outer)), || {
            assert_eq!(RequestContext::get().unwrap().header("x-id"), Some("outer"));

            RequestContext::sync_scope(Some(Arc::clone(&inner)), || {
                assert_eq!(RequestContext::get().unwrap().header("x-id"), Some("inner"));
            });

            let restored = RequestContext::get().expect("outer scope restored");
            assert!(Arc::ptr_eq(&restored, &outer));

            RequestContext::sync_scope(None, || assert!(RequestContext::get().is_none()));
            assert!(RequestContext::get().is_some());
        });

        assert!(RequestContext::get().is_none());
    }

    #[test]
    fn sync_scope_resets_even_when_the_closure_panics() {
        let req = request_with("x-id", "doomed");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            RequestContext::sync_scope(Some(req), || panic!("handler failed"));
        }));
        assert!(result.is_err());
        assert!(RequestContext::get().is_none());
    }

    #[tokio::test]
    async fn scope_survives_suspension_points() {
        let req = request_with("x-id", "suspended");
        let seen = RequestContext::scope(Some(req), async {
            tokio::task::yield_now().await;
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            RequestContext::get().and_then(|r| r.header("x-id").map(str::to_string))
        })
        .await;
        assert_eq!(seen.as_deref(), Some("suspended"));
        assert!(RequestContext::get().is_none());
    }
}
