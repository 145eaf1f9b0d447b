//! Middleware Module
//!
//! HTTP middleware that runs before handlers.
//!
//! - **`auth`** - Access token check for protected routes, plus the
//!   `AuthUser` extractor handlers use to read the caller
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//! use kamou_shop::backend::middleware::auth_middleware;
//!
//! let protected = router.route_layer(from_fn_with_state(app_state, auth_middleware));
//! ```

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
