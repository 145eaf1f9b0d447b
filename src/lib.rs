//! Kamou Shop - Main Library
//!
//! Kamou Shop is the HTTP backend of a small marketplace: shop owners publish
//! products, buyers fill a cart and place orders.
//!
//! # Overview
//!
//! This library provides:
//! - Registration with a one-time email verification code
//! - Login with signed access/refresh token pairs, rotation and logout
//! - User profiles, brand names and shop stars
//! - Product CRUD with paginated listing and keyword search
//! - Cart management and atomic cart-to-order checkout
//!
//! # Module Structure
//!
//! - **`shared`** - Domain types and validation used by every layer
//!   - Users, products, orders, cart items, token records
//!   - Pagination requests and pages
//!   - Field validation errors
//!
//! - **`backend`** - The Axum server
//!   - Token codec, password hashing, verification codes
//!   - Storage traits with PostgreSQL and in-memory implementations
//!   - Image hosting (Cloudinary)
//!   - Services, handlers, middleware and routing
//!
//! # Usage
//!
//! ```rust,no_run
//! use kamou_shop::backend::server::{config::ServerConfig, init::create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await?;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::error::SharedError` for validation failures in domain types
//! - `backend::error::BackendError` for everything a handler can return;
//!   it renders as `{"error": ..., "status": ...}`

/// Shared domain types
pub mod shared;

/// Backend server-side code
pub mod backend;
