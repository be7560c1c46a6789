//! Router configuration for the REST API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Aggregate analysis results
        .route("/analysis-result", get(handlers::list_analysis_results))
        .route("/analysis-result/:call_id", get(handlers::get_analysis_result))
        // Calls
        .route("/call", get(handlers::list_calls).post(handlers::create_call))
        .route("/call/:call_id", get(handlers::get_call))
        // Composite merchant records
        .route(
            "/api/v1/merchants/complete",
            get(handlers::merchants_by_ids),
        )
        .route(
            "/api/v1/merchants/complete/batch",
            post(handlers::merchants_batch),
        )
        .route(
            "/api/v1/merchants/complete/:merchant_id",
            get(handlers::merchant_complete),
        )
        .route(
            "/api/v1/merchants/search/phone/:phone",
            get(handlers::merchant_by_phone),
        )
        // Search service proxy
        .route("/search/health", get(handlers::search_health))
        .route("/search/collections", get(handlers::search_collections))
        .route(
            "/search/collections/:name",
            get(handlers::search_collection_info),
        )
        .route(
            "/search/collections/:name/search",
            post(handlers::search_vectors),
        )
        .route(
            "/search/collections/:name/search/text",
            post(handlers::search_text),
        )
        .route(
            "/search/collections/:name/search/recommend",
            post(handlers::search_recommend),
        )
        .route(
            "/search/collections/:name/search/batch",
            post(handlers::search_batch),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
