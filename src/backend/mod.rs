//! Backend Module
//!
//! This module contains all server-side code for the kamou-shop backend:
//! an Axum HTTP/JSON API for accounts, shop profiles, products, carts and
//! orders.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Password hashing, tokens, verification codes, auth flow
//! - **`users`** - Profile operations
//! - **`products`** - Product CRUD, cart and checkout
//! - **`storage`** - Store traits with PostgreSQL and in-memory backends
//! - **`images`** - Image hosting (Cloudinary)
//! - **`middleware`** - Request authentication
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Config, state and initialization
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── users/          - User profiles
//! ├── products/       - Products, cart, orders
//! ├── storage/        - Persistence
//! ├── images/         - Image host
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds one `Arc` per service. Services are built once at
//! startup and hold `Arc<dyn Store>`, `Arc<dyn CodeStore>` and
//! `Arc<dyn ImageHost>`, so handlers share them without locking. The
//! stores own all mutable data.
//!
//! # Error Handling
//!
//! Every handler returns `Result<_, BackendError>`. `BackendError`
//! implements `IntoResponse` and renders `{"error": ..., "status": ...}`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and token lifecycle
pub mod auth;

/// User profiles
pub mod users;

/// Products, cart and orders
pub mod products;

/// Persistence
pub mod storage;

/// Image hosting
pub mod images;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
