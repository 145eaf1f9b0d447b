//! Authentication Handlers Module
//!
//! HTTP handlers for the `/v1/auth` endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Handler exports
//! ├── types.rs     - Request and response types
//! ├── register.rs  - Registration
//! ├── login.rs     - Login
//! ├── validate.rs  - Email verification
//! └── session.rs   - Refresh and logout
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /v1/auth/register
//! - **`login`** - POST /v1/auth/login
//! - **`validate_account`** - POST /v1/auth/validate
//! - **`refresh`** - POST /v1/auth/refresh
//! - **`logout`** - POST /v1/auth/logout (requires authentication)

/// Request and response types
pub mod types;

/// Registration handler
pub mod register;

/// Login handler
pub mod login;

/// Email verification handler
pub mod validate;

/// Refresh and logout handlers
pub mod session;

pub use login::login;
pub use register::register;
pub use session::{logout, refresh};
pub use types::{LoginRequest, RegisterResponse, TokensResponse};
pub use validate::validate_account;
