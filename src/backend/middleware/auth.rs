/**
 * Authentication Middleware
 *
 * Protects routes that require a logged-in user. The access token is read
 * from the `x-auth-token` header as `Bearer <token>`, checked by
 * `AuthService::authenticate`, and the resulting `AuthenticatedUser` is
 * attached to the request extensions for handlers to pick up.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Header carrying the access token
pub const AUTH_HEADER: &str = "x-auth-token";

/// Authenticated user data extracted from the access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    /// Id of the access token used for this request
    pub token_id: Uuid,
}

/// Pull the bearer token out of the request headers
///
/// The scheme is matched case-insensitively.
///
/// # Errors
/// `Unauthorized` if the header is missing, not UTF-8, or not in
/// `Bearer <token>` form
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BackendError> {
    let value = headers
        .get(AUTH_HEADER)
        .ok_or_else(|| BackendError::unauthorized("authorization header is not provided"))?
        .to_str()
        .map_err(|_| BackendError::unauthorized("invalid authorization header format"))?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        (Some(scheme), Some(_), None) => Err(BackendError::unauthorized(format!(
            "unsupported authorization type {}",
            scheme
        ))),
        _ => Err(BackendError::unauthorized("invalid authorization header format")),
    }
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the token from the `x-auth-token` header
/// 2. Verifies it and checks it has not been revoked
/// 3. Attaches the `AuthenticatedUser` to the request extensions
///
/// Responds 401 if any step fails.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).inspect_err(|e| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
    })?;

    let user = app_state.auth.authenticate(token).await.inspect_err(|e| {
        tracing::warn!("Invalid token: {}", e);
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Only usable on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("authentication required")
            })?;

        Ok(AuthUser(user))
    }
}
