//! Route definitions.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the API router.
///
/// The API is served at the root and again under `/api`, the path older
/// clients call.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/expenses",
            get(handlers::get_expenses)
                .post(handlers::post_expenses)
                .delete(handlers::delete_expenses),
        )
        .route("/expenses/summary", get(handlers::get_summary))
        .route("/categories", get(handlers::categories));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api.clone())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
