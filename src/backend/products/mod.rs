//! Products Module
//!
//! Product listings, carts and orders.
//!
//! - **`service`** - `ProductService`
//! - **`types`** - request and response bodies
//! - **`handlers`** - HTTP handlers for `/v1/product`

/// Product, cart and order operations
pub mod service;

/// Request and response types
pub mod types;

/// HTTP handlers
pub mod handlers;

pub use service::ProductService;
