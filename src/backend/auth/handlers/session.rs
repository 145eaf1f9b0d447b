/**
 * Session Handlers
 *
 * - POST /v1/auth/refresh - exchange a refresh token for a new pair
 * - POST /v1/auth/logout - revoke the current session (authenticated)
 */
use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use std::sync::Arc;

use crate::backend::auth::handlers::types::{LogoutRequest, RefreshRequest, TokensResponse};
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;

/// Refresh handler
///
/// The presented refresh token is revoked; replaying it returns 401.
///
/// # Errors
///
/// * `401 Unauthorized` - The token is invalid, expired, revoked, or an
///   access token
pub async fn refresh(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokensResponse>, BackendError> {
    let tokens = auth.refresh(&request.refresh_token).await?;
    Ok(Json(TokensResponse { tokens }))
}

/// Logout handler
///
/// Revokes the access token used for this request. If the body names a
/// refresh token of the same user, that one is revoked too. An empty body
/// is accepted.
pub async fn logout(
    State(auth): State<Arc<AuthService>>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> Result<StatusCode, BackendError> {
    let request: LogoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| BackendError::validation("body", e.to_string()))?
    };

    auth.logout(&user, request.refresh_token.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
