//! Authentication Module
//!
//! User registration, email verification and token sessions.
//!
//! # Architecture
//!
//! - **`password`** - bcrypt hashing
//! - **`sessions`** - signing and verifying access/refresh tokens
//! - **`codes`** - short-lived email verification codes
//! - **`service`** - the flows built on top of the above and storage
//! - **`handlers`** - HTTP handlers for `/v1/auth`
//!
//! # Authentication Flow
//!
//! 1. **Register**: names, email, password → user stored → verification code returned
//! 2. **Validate**: code → user marked verified → code deleted
//! 3. **Login**: email, password → access and refresh token issued and recorded
//! 4. **Refresh**: refresh token → old one revoked → new pair issued
//! 5. **Logout**: access token (and optionally refresh token) revoked
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt before storage
//! - Tokens are HS256-signed; the payload is readable by anyone holding the
//!   token and carries no secrets
//! - Every authenticated request checks the token's revocation record

/// Password hashing
pub mod password;

/// Token signing and verification
pub mod sessions;

/// Email verification codes
pub mod codes;

/// Authentication flows
pub mod service;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use codes::{CodeStore, MemoryCodeStore, PgCodeStore};
pub use password::PasswordHasher;
pub use service::{AuthService, TokenPair, TokenPolicy};
pub use sessions::{Payload, TokenError, TokenMaker};
