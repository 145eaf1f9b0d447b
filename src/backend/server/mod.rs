//! Server Module
//!
//! This module contains the code that initializes and configures the Axum
//! HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - `AppState`, `Dependencies` and `FromRef` implementations
//! - **`config`** - Environment configuration loading and validation
//! - **`init`** - Backend selection and app creation
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env`
//! 2. **Backends**: PostgreSQL or in-memory storage, Cloudinary or no uploads
//! 3. **State Creation**: services built once and shared through `Arc`
//! 4. **Router Creation**: routes, auth middleware, tracing and CORS
//!
//! # Example
//!
//! ```rust,no_run
//! use kamou_shop::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::{create_app, InitError};
pub use state::{AppState, Dependencies};
