/**
 * Backend Error Types
 *
 * `BackendError` is what every service and handler returns. Each variant
 * knows its HTTP status and the message shown to the client.
 *
 * # Error Categories
 *
 * ## Client errors
 *
 * - Validation failures and bad input (400)
 * - Authentication failures: bad, expired or revoked tokens (401)
 * - Ownership violations (403)
 * - Missing records and unknown verification codes (404)
 * - Taken emails and brand names (409)
 *
 * ## Server errors
 *
 * Storage, image host, hashing and signing failures map to 500 (503 when
 * image uploads are not configured). Their details are logged, never sent
 * to the client.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::codes::CodeStoreError;
use crate::backend::auth::password::PasswordError;
use crate::backend::auth::sessions::TokenError;
use crate::backend::images::ImageError;
use crate::backend::storage::StoreError;
use crate::shared::SharedError;

/// Message sent to clients for every 5xx error
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Backend error types
///
/// # Usage
///
/// ```rust
/// use kamou_shop::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::not_found("product not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// A request field broke an input rule
    #[error("Validation error in field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("a user with this email already exists")]
    DuplicateEmail,

    #[error("brand name is already taken")]
    BrandNameTaken,

    #[error("password does not match")]
    PasswordMismatch,

    #[error("verification code has expired or does not exist, please request another")]
    CodeExpiredOrNotFound,

    #[error("cart is empty")]
    EmptyCart,

    /// Missing, malformed or unusable credentials
    #[error("{message}")]
    Unauthorized { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("token has been revoked")]
    TokenRevoked,

    #[error("{message}")]
    Forbidden { message: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("verification code store error: {0}")]
    Codes(#[from] CodeStoreError),

    #[error("image host error: {0}")]
    Image(#[from] ImageError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BackendError {
    /// Create a validation error
    ///
    /// # Arguments
    ///
    /// * `field` - Offending request field
    /// * `message` - What is wrong with it
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Validation`, `PasswordMismatch`, `EmptyCart` - 400
    /// - `Unauthorized`, `TokenRevoked`, invalid or expired `Token` - 401
    /// - `Forbidden` - 403
    /// - `NotFound`, `CodeExpiredOrNotFound` - 404
    /// - `DuplicateEmail`, `BrandNameTaken`, store conflicts - 409
    /// - `Image(NotConfigured)` - 503
    /// - everything else - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::PasswordMismatch | Self::EmptyCart => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized { .. } | Self::TokenRevoked => StatusCode::UNAUTHORIZED,
            Self::Token(err) => match err {
                TokenError::InvalidToken | TokenError::ExpiredToken => StatusCode::UNAUTHORIZED,
                TokenError::InvalidKeySize | TokenError::Encoding(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } | Self::CodeExpiredOrNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateEmail | Self::BrandNameTaken => StatusCode::CONFLICT,
            Self::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            Self::Image(ImageError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_)
            | Self::Codes(_)
            | Self::Image(_)
            | Self::Password(_)
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is the server's fault
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Get the message sent to the client
    ///
    /// Server errors get a generic message; their detail stays in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::Image(ImageError::NotConfigured) => self.to_string(),
            Self::Validation { field, message } => format!("{}: {}", field, message),
            _ if self.is_server_error() => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { field, message } => Self::Validation { field, message },
            SharedError::SerializationError { message } => Self::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BackendError::validation("email", "bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BackendError::PasswordMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BackendError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BackendError::TokenRevoked.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            BackendError::from(TokenError::ExpiredToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(BackendError::forbidden("not yours").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(BackendError::CodeExpiredOrNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BackendError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(BackendError::BrandNameTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            BackendError::from(ImageError::NotConfigured).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            BackendError::from(TokenError::InvalidKeySize).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = BackendError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
        assert!(err.to_string().contains("storage error"));
    }

    #[test]
    fn test_from_shared_validation() {
        let err: BackendError = SharedError::validation("password", "too short").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "password: too short");
    }

    #[test]
    fn test_client_messages() {
        assert_eq!(BackendError::not_found("product not found").message(), "product not found");
        assert_eq!(
            BackendError::from(TokenError::InvalidToken).message(),
            "token is invalid"
        );
    }
}
