/**
 * Domain Models
 *
 * Records persisted by the storage layer and the inputs that create or
 * change them. Timestamps are UTC; prices are integer minor units.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::validation::{
    validate_email, validate_min_len, validate_non_negative, validate_password,
    MIN_DESCRIPTION_LEN, MIN_PRODUCT_NAME_LEN,
};

/// A registered user, buyer and (optionally) shop owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub brand_name: Option<String>,
    pub phone_no: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub is_verified: bool,
    pub stars: i64,
    pub starred_by: Vec<Uuid>,
    pub cart: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh, unverified user with an empty cart
    pub fn new(new_user: &NewUser, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            email: new_user.email.clone(),
            password_hash,
            image: None,
            brand_name: None,
            phone_no: None,
            instagram: None,
            facebook: None,
            is_verified: false,
            stars: 0,
            starred_by: Vec::new(),
            cart: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Check every registration rule, reporting the first failing field
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_min_len("first_name", &self.first_name, 1)?;
        validate_min_len("last_name", &self.last_name, 1)?;
        validate_email(&self.email)?;
        validate_password("password", &self.password)
    }
}

/// Optional contact fields a user can set on their profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.phone_no.is_none() && self.instagram.is_none() && self.facebook.is_none() {
            return Err(SharedError::validation(
                "profile",
                "provide at least one of phone_no, instagram, facebook",
            ));
        }
        Ok(())
    }
}

/// A product listed by a shop owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub total_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        owner_id: Uuid,
        new_product: NewProduct,
        image: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: new_product.name.trim().to_string(),
            description: new_product.description.trim().to_string(),
            price: new_product.price,
            image,
            total_stock: new_product.total_stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Product creation input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub total_stock: i64,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_min_len("name", &self.name, MIN_PRODUCT_NAME_LEN)?;
        validate_min_len("description", &self.description, MIN_DESCRIPTION_LEN)?;
        validate_non_negative("price", self.price)?;
        validate_non_negative("total_stock", self.total_stock)
    }
}

/// Partial product update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.description.is_none() && self.price.is_none() {
            return Err(SharedError::validation(
                "update",
                "provide a description or a price to update",
            ));
        }
        if let Some(description) = &self.description {
            validate_min_len("description", description, 1)?;
        }
        if let Some(price) = self.price {
            validate_non_negative("price", price)?;
        }
        Ok(())
    }
}

/// Snapshot of a product taken when it was added to a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub image: Option<String>,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// A placed order; never modified after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a cart cannot become an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart is empty")]
    Empty,
    #[error("order total is too large")]
    TotalOverflow,
}

impl Order {
    /// Turn a cart into an order
    ///
    /// # Errors
    /// `CartError::Empty` for an empty cart, `CartError::TotalOverflow`
    /// when the prices do not sum within `i64`
    pub fn from_cart(
        user_id: Uuid,
        items: Vec<CartItem>,
        now: DateTime<Utc>,
    ) -> Result<Self, CartError> {
        if items.is_empty() {
            return Err(CartError::Empty);
        }
        let total_price = items
            .iter()
            .try_fold(0i64, |total, item| total.checked_add(item.price))
            .ok_or(CartError::TotalOverflow)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            items,
            total_price,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Which half of a token pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            other => Err(SharedError::validation(
                "kind",
                format!("unknown token kind '{}'", other),
            )),
        }
    }
}

/// Server-side record of an issued token, used for revocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Same as the token payload id
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TokenKind,
    pub duration_secs: i64,
    pub expires_at: DateTime<Utc>,
    pub blacklisted: bool,
    pub created_at: DateTime<Utc>,
}
