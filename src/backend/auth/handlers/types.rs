/**
 * Authentication Handler Types
 *
 * Request and response bodies for the `/v1/auth` endpoints.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::service::TokenPair;

/// Registration response
///
/// Carries the email verification code, since no mail transport exists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    pub code: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    /// Plaintext password, verified against the stored hash
    pub password: String,
}

/// Response of login and refresh
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokensResponse {
    pub tokens: TokenPair,
}

/// Account verification request
#[derive(Deserialize, Serialize, Debug)]
pub struct ValidateRequest {
    pub code: String,
}

/// Refresh request
#[derive(Deserialize, Serialize, Debug)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout request; the body itself is optional
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}
