/**
 * Account Verification Handler
 *
 * POST /v1/auth/validate
 */
use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;

use crate::backend::auth::handlers::types::ValidateRequest;
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;

/// Verify an account with the code issued at registration
///
/// # Returns
///
/// `204 No Content`
///
/// # Errors
///
/// * `400 Bad Request` - The code is not 6 characters long
/// * `404 Not Found` - The code is unknown, used, or expired
pub async fn validate_account(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<ValidateRequest>,
) -> Result<StatusCode, BackendError> {
    auth.validate_account(request.code.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}
