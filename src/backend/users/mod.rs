//! Users Module
//!
//! Profiles, brand names, shop stars and account deletion.
//!
//! - **`service`** - `UserService`, the profile operations
//! - **`types`** - request and response bodies
//! - **`handlers`** - HTTP handlers for `/v1/user`

/// Profile operations
pub mod service;

/// Request and response types
pub mod types;

/// HTTP handlers
pub mod handlers;

pub use service::UserService;
pub use types::{ProfileResponse, UserResponse};
