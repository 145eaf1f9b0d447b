/**
 * Input Validation
 *
 * Field rules shared by registration, profile updates and product
 * management. Every check returns `SharedError::ValidationError` naming
 * the field that failed.
 */
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 7;

/// Length of an email verification code
pub const CODE_LEN: usize = 6;

/// Minimum product name length
pub const MIN_PRODUCT_NAME_LEN: usize = 3;

/// Minimum product description length
pub const MIN_DESCRIPTION_LEN: usize = 5;

/// Validate an email address
///
/// Accepts `local@domain` where both parts are non-empty, the domain holds
/// a dot that is neither its first nor last character, and no whitespace
/// appears anywhere.
///
/// # Errors
/// `ValidationError` on field `email`
pub fn validate_email(email: &str) -> Result<(), SharedError> {
    let invalid = || SharedError::validation("email", "invalid email address");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot < domain.len() - 1 => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validate a password: alphanumeric, at least `MIN_PASSWORD_LEN` characters
///
/// # Arguments
/// * `field` - Field name reported on failure (`password`, `new_password`)
/// * `password` - Candidate password
pub fn validate_password(field: &str, password: &str) -> Result<(), SharedError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SharedError::validation(
            field,
            format!("password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SharedError::validation(
            field,
            "password may only contain letters and digits",
        ));
    }
    Ok(())
}

/// Require a value with at least `min` non-whitespace-trimmed characters
pub fn validate_min_len(field: &str, value: &str, min: usize) -> Result<(), SharedError> {
    if value.trim().chars().count() < min {
        let message = if min == 1 {
            format!("{} is required", field)
        } else {
            format!("{} must be at least {} characters", field, min)
        };
        return Err(SharedError::validation(field, message));
    }
    Ok(())
}

/// Reject negative amounts (prices, stock counts)
pub fn validate_non_negative(field: &str, value: i64) -> Result<(), SharedError> {
    if value < 0 {
        return Err(SharedError::validation(field, format!("{} cannot be negative", field)));
    }
    Ok(())
}

/// Validate the shape of a verification code
pub fn validate_code(code: &str) -> Result<(), SharedError> {
    if code.chars().count() != CODE_LEN {
        return Err(SharedError::validation(
            "code",
            format!("code must be exactly {} characters", CODE_LEN),
        ));
    }
    Ok(())
}

/// Parse an id sent as text
pub fn parse_id(field: &str, value: &str) -> Result<Uuid, SharedError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| SharedError::validation(field, format!("{} is not a valid id", field)))
}
