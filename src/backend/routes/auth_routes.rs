/**
 * Authentication Routes
 *
 * - `POST /v1/auth/register` - Create an account, returns a verification code
 * - `POST /v1/auth/login` - Exchange credentials for a token pair
 * - `POST /v1/auth/validate` - Verify the email with the code
 * - `POST /v1/auth/refresh` - Rotate the refresh token
 * - `POST /v1/auth/logout` - Revoke the session (requires authentication)
 */
use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::backend::auth::handlers::{login, logout, refresh, register, validate_account};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure authentication routes
///
/// Only `/v1/auth/logout` sits behind `auth_middleware`.
pub fn configure_auth_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    router
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/validate", post(validate_account))
        .route("/v1/auth/refresh", post(refresh))
        .route(
            "/v1/auth/logout",
            post(logout).route_layer(from_fn_with_state(app_state.clone(), auth_middleware)),
        )
}
