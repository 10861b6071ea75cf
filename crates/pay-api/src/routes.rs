//! # Routes
//!
//! Axum router configuration for the payments page and JSON API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Page (path from `payments_path`, default `/payments`):
///   - GET  - Payment form; consumes the `?payment=` return marker
///   - POST - Form submit; redirect acknowledgment or the form with one error
///
/// - API v1:
///   - POST /api/v1/payments - Initiate, returns `{reference, checkoutUrl}`
///   - GET  /api/v1/payments/{reference} - Transaction status
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/payments", post(handlers::api_initiate))
        .route("/payments/{reference}", get(handlers::api_status))
        .layer(cors);

    let payments_path = state.payments_path().to_string();

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            &payments_path,
            get(handlers::payments_page).post(handlers::submit_payment_form),
        )
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
