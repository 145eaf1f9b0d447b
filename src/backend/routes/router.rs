/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route groups into a single Axum router.
 *
 * # Route Order
 *
 * 1. Auth routes (public, except logout)
 * 2. User routes (authenticated)
 * 3. Product, cart and order routes (authenticated)
 * 4. Fallback handler (JSON 404)
 */
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

use crate::backend::error::not_found_fallback;
use crate::backend::routes::auth_routes::configure_auth_routes;
use crate::backend::routes::product_routes::configure_product_routes;
use crate::backend::routes::user_routes::configure_user_routes;
use crate::backend::server::state::AppState;

/// Largest accepted request body; image uploads are the big ones
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Services shared by the handlers
///
/// # Returns
///
/// Configured Axum Router ready to serve requests. CORS is left to the
/// caller.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new();
    let router = configure_auth_routes(router, &app_state);
    let router = configure_user_routes(router, &app_state);
    let router = configure_product_routes(router, &app_state);

    router
        .fallback(not_found_fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
