//! Route listing endpoint.
//!
//! Serves the registered route patterns as pretty-printed JSON:
//!
//! ```json
//! {
//!   "paths": [
//!     "/",
//!     "/api/v1/{tenant}/{*path}"
//!   ]
//! }
//! ```

use std::future::{ready, Ready};
use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::routing::router::Route;

/// Body of the route listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsResponse {
    pub paths: Vec<String>,
}

impl PathsResponse {
    pub fn from_routes(routes: &[Route]) -> Self {
        Self {
            paths: routes.iter().map(|r| r.pattern().to_string()).collect(),
        }
    }
}

/// Handler listing all paths of `routes`, in order.
///
/// The patterns are copied now; later changes to the route table are not
/// reflected.
pub fn list_paths(
    routes: &[Route],
) -> impl Fn() -> Ready<Response> + Clone + Send + Sync + 'static {
    let paths = Arc::new(PathsResponse::from_routes(routes));
    move || ready(render_json(paths.as_ref()))
}

/// Serializes `value` with two-space indentation.
///
/// On failure the client gets an empty 500.
fn render_json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec_pretty(value) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to marshal paths to JSON");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
