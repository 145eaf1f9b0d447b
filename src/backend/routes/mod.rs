//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by resource into focused submodules.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation and route assembly
//! - **`auth_routes`** - `/v1/auth/*`
//! - **`user_routes`** - `/v1/user/*`
//! - **`product_routes`** - `/v1/product/*`
//!
//! # Authentication
//!
//! Protected groups are wrapped with `auth_middleware` through
//! `route_layer`, so unmatched paths still reach the JSON 404 fallback
//! instead of answering 401.
//!
//! # Example
//!
//! ```rust,ignore
//! use kamou_shop::backend::routes::create_router;
//! use kamou_shop::backend::server::{AppState, Dependencies};
//!
//! let router = create_router(AppState::new(dependencies));
//! ```

/// Main router creation
pub mod router;

/// Authentication routes
pub mod auth_routes;

/// User profile routes
pub mod user_routes;

/// Product, cart and order routes
pub mod product_routes;

pub use router::create_router;
