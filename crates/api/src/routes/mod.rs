pub mod health;
pub mod items;

use axum::extract::OriginalUri;
use axum::http::Method;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /items          list, create
/// /items/{id}     get, update, delete
/// /debug          connection and store diagnostics (optional)
/// ```
///
/// Unknown paths and unsupported methods answer with the JSON error body
/// instead of falling through to the static files.
pub fn api_routes(enable_debug_routes: bool) -> Router<AppState> {
    let mut router = Router::new().nest("/items", items::router());

    if enable_debug_routes {
        router = router.route("/debug", get(health::debug_info));
    }

    // Must come after every route: it only applies to routes already added.
    router
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
