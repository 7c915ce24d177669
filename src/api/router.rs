//! Axum router wiring for the query service (§4.8, §6).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::store::Store;

use super::handlers;

pub fn build_router(store: Store) -> Router {
    Router::new()
        .route("/lookup", post(handlers::lookup))
        .route("/docs", get(handlers::docs))
        .route("/openapi.json", get(handlers::openapi_json))
        .route("/healthz", get(handlers::liveness))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
