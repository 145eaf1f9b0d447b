/**
 * Login Handler
 *
 * POST /v1/auth/login
 *
 * # Authentication Process
 *
 * 1. Look up the user by email
 * 2. Verify the password with bcrypt
 * 3. Issue an access/refresh token pair and record both tokens
 *
 * Email verification is not required to log in.
 */
use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::backend::auth::handlers::types::{LoginRequest, TokensResponse};
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;

/// Login handler
///
/// # Errors
///
/// * `404 Not Found` - No user has this email
/// * `400 Bad Request` - Wrong password
///
/// # Example Response
///
/// ```json
/// {
///   "tokens": {
///     "access_token": "eyJhbGciOiJIUzI1NiJ9...",
///     "refresh_token": "eyJhbGciOiJIUzI1NiJ9..."
///   }
/// }
/// ```
pub async fn login(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokensResponse>, BackendError> {
    tracing::info!("Login request");
    let tokens = auth.login(&request.email, &request.password).await?;
    Ok(Json(TokensResponse { tokens }))
}
