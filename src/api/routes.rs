use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::authenticate;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Public -- no identity required
    let auth_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    // Identity checks live in each handler's extractors
    let sweet_routes = Router::new()
        .route(
            "/sweets",
            post(handlers::add_sweet).get(handlers::list_sweets),
        )
        .route("/sweets/search", get(handlers::search_sweets))
        .route(
            "/sweets/:id",
            get(handlers::get_sweet)
                .put(handlers::update_sweet)
                .delete(handlers::delete_sweet),
        )
        .route("/sweets/:id/purchase", post(handlers::purchase_sweet))
        .route("/sweets/:id/restock", post(handlers::restock_sweet));

    Router::new()
        .nest("/api", auth_routes.merge(sweet_routes))
        .route("/health", get(handlers::health))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
