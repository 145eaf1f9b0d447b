/**
 * Session Tokens
 *
 * This module signs and verifies the access and refresh tokens handed out
 * at login. Tokens are HS256 JWTs carrying a token id, the user id, the
 * token kind and issue/expiry timestamps.
 *
 * The token string is verified without touching storage; revocation is
 * handled separately through the token records kept by `TokenStore`.
 */
use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::TokenKind;

/// Minimum symmetric key length in bytes
pub const MIN_KEY_LEN: usize = 32;

/// Token codec errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, encoding or claims
    #[error("token is invalid")]
    InvalidToken,

    /// Signature is good but the token is past its expiry
    #[error("token has expired")]
    ExpiredToken,

    #[error("invalid key size: must be at least {MIN_KEY_LEN} bytes")]
    InvalidKeySize,

    #[error("failed to sign token: {0}")]
    Encoding(String),
}

/// Decoded token contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Token id; also the key of the token's revocation record
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// Build a payload valid for `duration` from now
    ///
    /// Timestamps are truncated to whole seconds, the resolution they are
    /// signed with.
    pub fn new(user_id: Uuid, kind: TokenKind, duration: Duration) -> Self {
        let issued_at = Utc::now().trunc_subsecs(0);
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            issued_at,
            expires_at: issued_at + duration,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// JWT claims as they appear on the wire
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: Uuid,
    sub: Uuid,
    kind: TokenKind,
    iat: i64,
    exp: i64,
}

impl From<&Payload> for Claims {
    fn from(payload: &Payload) -> Self {
        Self {
            jti: payload.id,
            sub: payload.user_id,
            kind: payload.kind,
            iat: payload.issued_at.timestamp(),
            exp: payload.expires_at.timestamp(),
        }
    }
}

impl TryFrom<Claims> for Payload {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::InvalidToken)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::InvalidToken)?;
        Ok(Self {
            id: claims.jti,
            user_id: claims.sub,
            kind: claims.kind,
            issued_at,
            expires_at,
        })
    }
}

/// Signs and verifies tokens with a symmetric key
#[derive(Clone)]
pub struct TokenMaker {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenMaker").finish_non_exhaustive()
    }
}

impl TokenMaker {
    /// Create a token maker
    ///
    /// # Arguments
    /// * `symmetric_key` - Signing key, at least `MIN_KEY_LEN` bytes
    ///
    /// # Errors
    /// `TokenError::InvalidKeySize` if the key is too short
    pub fn new(symmetric_key: &str) -> Result<Self, TokenError> {
        if symmetric_key.len() < MIN_KEY_LEN {
            return Err(TokenError::InvalidKeySize);
        }

        // Expiry is checked by hand after the signature, so that a forged
        // token is never reported as merely expired.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "jti"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(symmetric_key.as_bytes()),
            decoding: DecodingKey::from_secret(symmetric_key.as_bytes()),
            validation,
        })
    }

    /// Create a signed token for a user
    ///
    /// # Arguments
    /// * `user_id` - Owner of the token
    /// * `kind` - Access or refresh
    /// * `duration` - Lifetime from now; may be negative
    ///
    /// # Returns
    /// The signed token string and the payload it carries
    pub fn create_token(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(user_id, kind, duration);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Claims::from(&payload),
            &self.encoding,
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))?;
        Ok((token, payload))
    }

    /// Verify a token against the current time
    ///
    /// # Errors
    /// - `InvalidToken` if signature, encoding or claims are bad
    /// - `ExpiredToken` if the token is authentic but past its expiry
    pub fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }

    /// Verify a token as of `now`
    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            TokenError::InvalidToken
        })?;

        let payload = Payload::try_from(data.claims)?;
        if payload.is_expired_at(now) {
            return Err(TokenError::ExpiredToken);
        }
        Ok(payload)
    }
}
