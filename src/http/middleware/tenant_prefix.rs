//! Tenant URL prefix stripping.
//!
//! Wraps a tenant-unaware handler tree so it can serve paths namespaced by
//! tenant at the edge. For each request the layer:
//! 1. Reads the tenant set by the authentication layer
//! 2. Resolves the prefix template against it
//! 3. Strips the resolved prefix from the path when the path starts with it
//! 4. Records the stripped prefix as a [`ForwardPrefix`] extension
//! 5. Calls the inner service
//!
//! A request without tenant is answered with a 500 API error and never
//! reaches the inner service.

use std::task::{Context, Poll};

use axum::{
    http::{uri::PathAndQuery, Request, Uri},
    response::{IntoResponse, Response},
};
use futures_util::future::{ready, Either, Ready};
use tower::{util::Oneshot, Layer, Service, ServiceExt};

use crate::http::error::ApiError;
use crate::http::forward::ForwardPrefix;
use crate::observability::metrics;
use crate::tenant::{get_tenant, PrefixTemplate, RewrittenPath};

/// Layer producing [`StripTenantPrefix`] services for one prefix template.
#[derive(Debug, Clone)]
pub struct StripTenantPrefixLayer {
    template: PrefixTemplate,
}

impl StripTenantPrefixLayer {
    pub fn new(template: impl Into<PrefixTemplate>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl<S> Layer<S> for StripTenantPrefixLayer {
    type Service = StripTenantPrefix<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StripTenantPrefix {
            inner,
            template: self.template.clone(),
        }
    }
}

/// Service rewriting request paths relative to the tenant's prefix.
#[derive(Debug, Clone)]
pub struct StripTenantPrefix<S> {
    inner: S,
    template: PrefixTemplate,
}

impl<S, B> Service<Request<B>> for StripTenantPrefix<S>
where
    S: Service<Request<B>, Response = Response> + Clone,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<Response, S::Error>>, Oneshot<S, Request<B>>>;

    // The inner service is only driven to readiness for requests that reach
    // it, so a rejected request never holds one of its slots.
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let prefix = match get_tenant(req.extensions()) {
            Some(tenant) => self.template.resolve(tenant),
            None => {
                metrics::record_tenant_resolution_failure();
                return Either::Left(ready(Ok(ApiError::TenantNotFound.into_response())));
            }
        };

        match RewrittenPath::compute(req.uri().path(), &prefix) {
            RewrittenPath::Stripped {
                path,
                synthesized_slash,
            } => match with_path(req.uri(), &path) {
                Some(uri) => {
                    tracing::debug!(
                        prefix = %prefix,
                        original = %req.uri().path(),
                        rewritten = %path,
                        "Stripped tenant prefix"
                    );
                    *req.uri_mut() = uri;
                    req.extensions_mut()
                        .insert(ForwardPrefix::new(prefix, synthesized_slash));
                    metrics::record_prefix_rewrite(true);
                }
                None => metrics::record_prefix_rewrite(false),
            },
            RewrittenPath::Unchanged => {
                tracing::debug!(
                    prefix = %prefix,
                    path = %req.uri().path(),
                    "Path outside tenant prefix, passing through"
                );
                metrics::record_prefix_rewrite(false);
            }
        }

        Either::Right(self.inner.clone().oneshot(req))
    }
}

/// Returns `uri` with its path replaced, keeping query, scheme and authority.
///
/// `None` if the result is not a valid URI; the caller keeps the original.
fn with_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = match path_and_query.parse::<PathAndQuery>() {
        Ok(pq) => Some(pq),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Rewritten path rejected, passing through");
            return None;
        }
    };

    match Uri::from_parts(parts) {
        Ok(uri) => Some(uri),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Rewritten URI rejected, passing through");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        extract::Request as AxumRequest,
        http::StatusCode,
        Json, Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceBuilder;

    use crate::http::error::ApiErrorBody;
    use crate::http::forward::forward_prefix;
    use crate::tenant::{insert_tenant, TenantId};

    /// Inner tree echoing what it observed, counting its invocations.
    fn spy_router(calls: Arc<AtomicUsize>) -> Router {
        Router::new().fallback(move |req: AxumRequest| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "path": req.uri().path(),
                    "query": req.uri().query(),
                    "method": req.method().as_str(),
                    "prefix": forward_prefix(req.extensions()),
                    "absolute": req
                        .extensions()
                        .get::<ForwardPrefix>()
                        .map(|p| p.absolute_path(req.uri().path())),
                }))
            }
        })
    }

    fn request(uri: &str, tenant: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        if let Some(tenant) = tenant {
            insert_tenant(req.extensions_mut(), TenantId::new(tenant));
        }
        req
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_strips_tenant_prefix() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = StripTenantPrefixLayer::new("/api/v1/{tenant}/metrics").layer(spy_router(calls.clone()));

        let response = svc
            .oneshot(request("/api/v1/acme/metrics/query?q=up", Some("acme")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["path"], "/query");
        assert_eq!(body["query"], "q=up");
        assert_eq!(body["prefix"], "/api/v1/acme/metrics");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_matching_path_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = StripTenantPrefixLayer::new("/api/v1/{tenant}/metrics").layer(spy_router(calls.clone()));

        let response = svc
            .oneshot(request("/other/path", Some("acme")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["path"], "/other/path");
        assert_eq!(body["prefix"], Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_tenant_prefix_is_not_stripped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = StripTenantPrefixLayer::new("/api/v1/{tenant}").layer(spy_router(calls));

        let response = svc
            .oneshot(request("/api/v1/umbrella/query", Some("acme")))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["path"], "/api/v1/umbrella/query");
    }

    #[tokio::test]
    async fn test_missing_tenant_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = StripTenantPrefixLayer::new("/api/v1/{tenant}").layer(spy_router(calls.clone()));

        let response = svc
            .oneshot(request("/api/v1/acme/query", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "tenant not found");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_template_without_placeholder_is_fixed_prefix() {
        for tenant in ["acme", "umbrella"] {
            let calls = Arc::new(AtomicUsize::new(0));
            let svc = StripTenantPrefixLayer::new("/static").layer(spy_router(calls));

            let response = svc
                .oneshot(request("/static/css/site.css", Some(tenant)))
                .await
                .unwrap();

            let body = body_json(response).await;
            assert_eq!(body["path"], "/css/site.css");
            assert_eq!(body["prefix"], "/static");
        }
    }

    #[tokio::test]
    async fn test_method_is_preserved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = StripTenantPrefixLayer::new("/api/v1/{tenant}").layer(spy_router(calls));

        let mut req = Request::builder()
            .method("DELETE")
            .uri("/api/v1/acme/series")
            .body(Body::empty())
            .unwrap();
        insert_tenant(req.extensions_mut(), "acme".into());

        let body = body_json(svc.oneshot(req).await.unwrap()).await;
        assert_eq!(body["method"], "DELETE");
        assert_eq!(body["path"], "/series");
    }

    #[tokio::test]
    async fn test_concurrent_tenants_are_isolated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = StripTenantPrefixLayer::new("/api/v1/{tenant}").layer(spy_router(calls.clone()));

        let mut handles = Vec::new();
        for i in 0..64 {
            let tenant = if i % 2 == 0 { "acme" } else { "umbrella" };
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                let uri = format!("/api/v1/{tenant}/series/{i}");
                let response = svc.oneshot(request(&uri, Some(tenant))).await.unwrap();
                (tenant, i, body_json(response).await)
            }));
        }

        for handle in handles {
            let (tenant, i, body) = handle.await.unwrap();
            assert_eq!(body["path"], format!("/series/{i}"));
            assert_eq!(body["prefix"], format!("/api/v1/{tenant}"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 64);
    }

    #[test]
    fn test_with_path_keeps_query() {
        let uri: Uri = "/acme/series?match=up".parse().unwrap();
        let rewritten = with_path(&uri, "/series").unwrap();
        assert_eq!(rewritten.path(), "/series");
        assert_eq!(rewritten.query(), Some("match=up"));

        let uri: Uri = "http://gateway.local/acme/series".parse().unwrap();
        let rewritten = with_path(&uri, "/series").unwrap();
        assert_eq!(rewritten.to_string(), "http://gateway.local/series");
    }

    #[test]
    fn test_with_path_rejects_invalid_path() {
        let uri: Uri = "/acme/series".parse().unwrap();
        assert_eq!(with_path(&uri, "/bad path"), None);
    }

    #[tokio::test]
    async fn test_exact_and_partial_prefix_keep_original_path() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = StripTenantPrefixLayer::new("/api/v1/{tenant}").layer(spy_router(calls));

        for (uri, inner_path) in [
            ("/api/v1/acme", "/"),
            ("/api/v1/acmecorp/x", "/corp/x"),
            ("/api/v1/acme/x", "/x"),
        ] {
            let response = svc.clone().oneshot(request(uri, Some("acme"))).await.unwrap();
            let body = body_json(response).await;
            assert_eq!(body["path"], inner_path);
            assert_eq!(body["absolute"], uri);
        }
    }

    #[tokio::test]
    async fn test_rejected_request_leaves_inner_capacity() {
        let calls = Arc::new(AtomicUsize::new(0));
        let limited = ServiceBuilder::new()
            .concurrency_limit(1)
            .service(spy_router(calls.clone()));
        let mut svc = StripTenantPrefixLayer::new("/api/v1/{tenant}").layer(limited);

        let response = ServiceExt::<Request<Body>>::ready(&mut svc)
            .await
            .unwrap()
            .call(request("/api/v1/acme/query", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // `svc` is still alive; a clone must get the single slot
        let response = tokio::time::timeout(
            Duration::from_secs(1),
            svc.clone().oneshot(request("/api/v1/acme/query", Some("acme"))),
        )
        .await
        .expect("inner service slot was held by the rejected request")
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        drop(svc);
    }
}
