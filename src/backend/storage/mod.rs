//! Storage Module
//!
//! Persistence for users, products, orders and token records, split into
//! one trait per collection and combined as [`Store`].
//!
//! # Implementations
//!
//! - [`postgres::PgStore`] - sqlx over PostgreSQL, schema in `migrations/`
//! - [`memory::MemoryStore`] - a single lock around in-process maps, used
//!   when no database is configured and in tests
//!
//! # Uniqueness
//!
//! Email and brand-name uniqueness is enforced by the store itself (unique
//! indexes in PostgreSQL, checks under the write lock in memory). A
//! violated constraint comes back as [`StoreError::Conflict`] carrying the
//! constraint name, one of [`USERS_EMAIL_KEY`] or [`USERS_BRAND_NAME_KEY`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{
    CartError, CartItem, Order, PageRequest, Product, ProductUpdate, ProfileUpdate, TokenRecord, User,
};

/// In-memory implementation
pub mod memory;

/// PostgreSQL implementation
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Unique constraint on `users.email`
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Unique constraint on `users.brand_name`
pub const USERS_BRAND_NAME_KEY: &str = "users_brand_name_key";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// A stored value could not be mapped back into a domain type
    #[error("corrupt record: {message}")]
    Corrupt { message: String },

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn conflict(constraint: impl Into<String>) -> Self {
        Self::Conflict {
            constraint: constraint.into(),
        }
    }

    /// Whether this is a conflict on the named constraint
    pub fn is_conflict_on(&self, name: &str) -> bool {
        matches!(self, Self::Conflict { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::conflict(db_err.constraint().unwrap_or_default());
            }
        }
        Self::Database(err)
    }
}

/// Result of starring a shop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarOutcome {
    /// The caller was added and the star count went up
    Added,
    /// The caller had already starred this shop; nothing changed
    AlreadyStarred,
    UnknownShop,
}

/// Result of turning a cart into an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkout {
    Placed(Order),
    /// Nothing was written; the cart is left as it was
    Rejected(CartError),
    UnknownUser,
}

/// User records, including the embedded cart
///
/// Mutations return `false` (or `None`) when the user does not exist.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; a taken email is `StoreError::Conflict`
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// All users, oldest first, with the total count
    async fn list_users(&self, page: PageRequest) -> Result<(Vec<User>, i64), StoreError>;

    /// Users whose brand name contains `keyword`, ignoring case
    async fn search_brands(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), StoreError>;

    async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<bool, StoreError>;

    async fn set_image(&self, id: Uuid, url: &str) -> Result<bool, StoreError>;

    /// Overwrite the provided contact fields, leaving the others untouched
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<bool, StoreError>;

    /// Set the brand name; a taken name is `StoreError::Conflict`
    async fn set_brand_name(&self, id: Uuid, brand_name: &str) -> Result<bool, StoreError>;

    async fn mark_verified(&self, email: &str) -> Result<bool, StoreError>;

    /// Record `by` as a starrer of `shop_id`, counting each starrer once
    async fn add_star(&self, shop_id: Uuid, by: Uuid) -> Result<StarOutcome, StoreError>;

    /// Delete a user together with their products, orders and token records
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Append a snapshot to the user's cart
    async fn push_cart_item(&self, user_id: Uuid, item: &CartItem) -> Result<bool, StoreError>;

    /// Drop every cart line for `product_id`
    ///
    /// # Returns
    /// Number of lines removed, or `None` for an unknown user
    async fn remove_cart_items(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<usize>, StoreError>;
}

/// Product records
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    /// Products owned by `owner_id`, newest first, with the total count
    async fn products_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), StoreError>;

    /// Products whose name contains `keyword`, ignoring case
    async fn search_products(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), StoreError>;

    /// Apply the provided fields and return the updated product
    async fn update_product(
        &self,
        id: Uuid,
        update: &ProductUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError>;

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Orders and checkout
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically turn the user's cart into an order and empty the cart
    async fn checkout(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Checkout, StoreError>;

    /// The user's orders, newest first
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;
}

/// Issued token records
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist several records in one write
    async fn insert_tokens(&self, records: &[TokenRecord]) -> Result<(), StoreError>;

    async fn token_by_id(&self, id: Uuid) -> Result<Option<TokenRecord>, StoreError>;

    /// Blacklist one token
    ///
    /// # Returns
    /// `true` only if this call flipped the flag, so concurrent callers
    /// cannot both succeed
    async fn blacklist_token(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Blacklist every live token of a user, returning how many changed
    async fn blacklist_user_tokens(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

/// Everything the services need from storage
pub trait Store: UserStore + ProductStore + OrderStore + TokenStore {}

impl<T> Store for T where T: UserStore + ProductStore + OrderStore + TokenStore {}

/// Escape `%`, `_` and `\` so `keyword` matches literally inside LIKE
pub fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
