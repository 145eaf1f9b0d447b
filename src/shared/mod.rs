//! Shared Module
//!
//! Domain types used by storage, services and HTTP handlers alike.
//!
//! # Overview
//!
//! Nothing in here performs I/O. The types describe users, products,
//! orders and issued tokens, plus the validation rules applied to the
//! input that creates or changes them.

/// Users, products, orders, cart items and token records
pub mod models;

/// Page requests and paginated results
pub mod pagination;

/// Input validation rules
pub mod validation;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use models::{
    CartError, CartItem, NewProduct, NewUser, Order, Product, ProductUpdate, ProfileUpdate, TokenKind,
    TokenRecord, User,
};
pub use pagination::{Page, PageRequest};
