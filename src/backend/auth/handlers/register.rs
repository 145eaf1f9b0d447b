/**
 * Registration Handler
 *
 * POST /v1/auth/register
 *
 * # Registration Process
 *
 * 1. Validate names, email and password
 * 2. Hash the password with bcrypt
 * 3. Insert the user; the unique email index rejects duplicates
 * 4. Issue a 6-letter verification code valid for the configured TTL
 */
use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;

use crate::backend::auth::handlers::types::RegisterResponse;
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;
use crate::shared::NewUser;

/// Registration handler
///
/// # Arguments
///
/// * `State(auth)` - Authentication service
/// * `Json(request)` - First name, last name, email and password
///
/// # Returns
///
/// `201 Created` with the verification code
///
/// # Errors
///
/// * `400 Bad Request` - A field fails validation
/// * `409 Conflict` - The email is already registered
///
/// # Example Request
///
/// ```http
/// POST /v1/auth/register HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "first_name": "Ada",
///   "last_name": "Obi",
///   "email": "ada@example.com",
///   "password": "abcdefg1"
/// }
/// ```
pub async fn register(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<RegisterResponse>), BackendError> {
    let code = auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { code })))
}
