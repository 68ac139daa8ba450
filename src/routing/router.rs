//! Route registration bookkeeping.
//!
//! # Responsibilities
//! - Register handlers on an axum router
//! - Remember every pattern and its methods in registration order
//! - Hand out an immutable snapshot for introspection
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Registration order is preserved exactly
//! - Conflicting patterns panic at startup, as axum does

use std::sync::Arc;

use axum::{
    handler::Handler,
    http::Method,
    routing::{any, get, MethodRouter},
    Router,
};

/// One registered endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pattern: String,
    /// Empty when the route accepts any method.
    methods: Vec<Method>,
}

impl Route {
    pub fn new(pattern: impl Into<String>, methods: Vec<Method>) -> Self {
        Self {
            pattern: pattern.into(),
            methods,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn accepts_any_method(&self) -> bool {
        self.methods.is_empty()
    }

    /// Returns the same route as seen from behind a path prefix.
    pub fn prefixed(&self, prefix: &str) -> Route {
        let prefix = prefix.trim_end_matches('/');
        let pattern = if self.pattern == "/" {
            format!("{prefix}/")
        } else {
            format!("{prefix}{}", self.pattern)
        };
        Route::new(pattern, self.methods.clone())
    }
}

/// Axum router that records what gets registered on it.
pub struct RouteTable<S = ()> {
    router: Router<S>,
    routes: Vec<Route>,
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            routes: Vec::new(),
        }
    }

    /// Register `method_router` under `pattern`, recording `methods`.
    pub fn route(mut self, pattern: &str, methods: &[Method], method_router: MethodRouter<S>) -> Self {
        tracing::debug!(pattern = %pattern, methods = ?methods, "Registering route");
        self.routes.push(Route::new(pattern, methods.to_vec()));
        self.router = self.router.route(pattern, method_router);
        self
    }

    pub fn get<H, T>(self, pattern: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(pattern, &[Method::GET], get(handler))
    }

    pub fn any<H, T>(self, pattern: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(pattern, &[], any(handler))
    }

    /// Record routes that are dispatched elsewhere (e.g. a nested service)
    /// so that they still show up in the listing.
    pub fn record(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Snapshot of the routes registered so far.
    pub fn routes(&self) -> Arc<[Route]> {
        Arc::from(self.routes.as_slice())
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

impl<S> Default for RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
