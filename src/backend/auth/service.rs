/**
 * Authentication Service
 *
 * Registration, email verification and the token session lifecycle:
 *
 * ```text
 * login ──► access + refresh issued ──► refresh ──► old refresh blacklisted,
 *                   │                               new pair issued
 *                   ├──► logout ──► access (and refresh) blacklisted
 *                   └──► password change ──► every token blacklisted
 * ```
 *
 * A token authorizes a request only if its signature and expiry check out,
 * its kind is `access`, its record exists and is not blacklisted, and its
 * user still exists.
 */
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::auth::codes::{generate_code, CodeStore};
use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::sessions::{Payload, TokenError, TokenMaker};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::storage::{Store, USERS_EMAIL_KEY};
use crate::shared::validation::validate_code;
use crate::shared::{NewUser, TokenKind, TokenRecord, User};

/// Attempts at finding an unused verification code
const MAX_CODE_ATTEMPTS: usize = 5;

/// Token and code lifetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub code_ttl: std::time::Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::seconds(6000),
            code_ttl: std::time::Duration::from_secs(30 * 60),
        }
    }
}

/// Access and refresh token handed to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
pub struct AuthService {
    store: Arc<dyn Store>,
    codes: Arc<dyn CodeStore>,
    maker: TokenMaker,
    hasher: PasswordHasher,
    policy: TokenPolicy,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        codes: Arc<dyn CodeStore>,
        maker: TokenMaker,
        hasher: PasswordHasher,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            store,
            codes,
            maker,
            hasher,
            policy,
        }
    }

    pub fn token_maker(&self) -> &TokenMaker {
        &self.maker
    }

    /// Register a new user
    ///
    /// # Returns
    /// The verification code issued for the user's email
    ///
    /// # Errors
    /// - `Validation` if a field breaks the registration rules
    /// - `DuplicateEmail` if the email is already registered
    pub async fn register(&self, new_user: NewUser) -> Result<String, BackendError> {
        new_user.validate()?;

        let password_hash = self.hasher.hash(&new_user.password)?;
        let user = User::new(&new_user, password_hash, Utc::now());

        match self.store.insert_user(&user).await {
            Ok(()) => {}
            Err(e) if e.is_conflict_on(USERS_EMAIL_KEY) => {
                tracing::warn!("Registration rejected, email already in use");
                return Err(BackendError::DuplicateEmail);
            }
            Err(e) => return Err(e.into()),
        }

        let code = self.issue_verification_code(&user.email).await?;
        tracing::info!("Registered user {}", user.id);
        tracing::debug!("Verification code for user {}: {}", user.id, code);
        Ok(code)
    }

    async fn issue_verification_code(&self, email: &str) -> Result<String, BackendError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();
            if self.codes.put_if_absent(&code, email, self.policy.code_ttl).await? {
                return Ok(code);
            }
        }
        Err(BackendError::internal("could not allocate a unique verification code"))
    }

    /// Log in with email and password
    ///
    /// # Errors
    /// - `NotFound` if no user has this email
    /// - `PasswordMismatch` if the password is wrong
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, BackendError> {
        let user = self
            .store
            .user_by_email(email)
            .await?
            .ok_or_else(|| BackendError::not_found("no user registered with this email"))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::warn!("Failed login for user {}", user.id);
            return Err(BackendError::PasswordMismatch);
        }

        let tokens = self.issue_token_pair(user.id).await?;
        tracing::info!("User {} logged in", user.id);
        Ok(tokens)
    }

    /// Mark the account behind a verification code as verified
    ///
    /// The code is deleted once used.
    ///
    /// # Errors
    /// - `Validation` if the code has the wrong length
    /// - `CodeExpiredOrNotFound` if the code is unknown or expired
    /// - `NotFound` if the user was deleted since registering
    pub async fn validate_account(&self, code: &str) -> Result<(), BackendError> {
        validate_code(code)?;

        let email = self
            .codes
            .get(code)
            .await?
            .ok_or(BackendError::CodeExpiredOrNotFound)?;

        let verified = self.store.mark_verified(&email).await?;
        self.codes.remove(code).await?;

        if !verified {
            return Err(BackendError::not_found("user not found"));
        }
        tracing::info!("Account verified");
        Ok(())
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The presented refresh token is blacklisted, so each one works once.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, BackendError> {
        let payload = self.maker.verify_token(refresh_token)?;
        if payload.kind != TokenKind::Refresh {
            return Err(BackendError::unauthorized("a refresh token is required"));
        }

        self.ensure_not_revoked(&payload).await?;
        if !self.store.blacklist_token(payload.id).await? {
            tracing::warn!("Refresh token {} was used concurrently", payload.id);
            return Err(BackendError::TokenRevoked);
        }

        if self.store.user_by_id(payload.user_id).await?.is_none() {
            return Err(BackendError::unauthorized("user no longer exists"));
        }

        let tokens = self.issue_token_pair(payload.user_id).await?;
        tracing::info!("Rotated refresh token for user {}", payload.user_id);
        Ok(tokens)
    }

    /// Revoke the session's access token and, optionally, its refresh token
    ///
    /// # Errors
    /// `Unauthorized` if the refresh token belongs to someone else or is
    /// not a refresh token
    pub async fn logout(
        &self,
        session: &AuthenticatedUser,
        refresh_token: Option<&str>,
    ) -> Result<(), BackendError> {
        if let Some(refresh_token) = refresh_token {
            let payload = match self.maker.verify_token(refresh_token) {
                Ok(payload) => Some(payload),
                // Nothing left to revoke.
                Err(TokenError::ExpiredToken) => None,
                Err(e) => return Err(e.into()),
            };
            if let Some(payload) = payload {
                if payload.kind != TokenKind::Refresh || payload.user_id != session.user_id {
                    return Err(BackendError::unauthorized(
                        "refresh token does not belong to this session",
                    ));
                }
                self.store.blacklist_token(payload.id).await?;
            }
        }

        self.store.blacklist_token(session.token_id).await?;
        tracing::info!("User {} logged out", session.user_id);
        Ok(())
    }

    /// Resolve an access token to the user it authorizes
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, BackendError> {
        let payload = self.maker.verify_token(access_token)?;
        if payload.kind != TokenKind::Access {
            return Err(BackendError::unauthorized("refresh tokens cannot authorize requests"));
        }

        self.ensure_not_revoked(&payload).await?;

        let user = self
            .store
            .user_by_id(payload.user_id)
            .await?
            .ok_or_else(|| BackendError::unauthorized("user no longer exists"))?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            token_id: payload.id,
        })
    }

    async fn ensure_not_revoked(&self, payload: &Payload) -> Result<(), BackendError> {
        match self.store.token_by_id(payload.id).await? {
            Some(record) if !record.blacklisted => Ok(()),
            _ => Err(BackendError::TokenRevoked),
        }
    }

    async fn issue_token_pair(&self, user_id: uuid::Uuid) -> Result<TokenPair, BackendError> {
        let (access_token, access) =
            self.maker
                .create_token(user_id, TokenKind::Access, self.policy.access_ttl)?;
        let (refresh_token, refresh) =
            self.maker
                .create_token(user_id, TokenKind::Refresh, self.policy.refresh_ttl)?;

        let now = Utc::now();
        let records = [(&access, self.policy.access_ttl), (&refresh, self.policy.refresh_ttl)]
            .map(|(payload, ttl)| TokenRecord {
                id: payload.id,
                user_id,
                kind: payload.kind,
                duration_secs: ttl.num_seconds(),
                expires_at: payload.expires_at,
                blacklisted: false,
                created_at: now,
            });
        self.store.insert_tokens(&records).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
