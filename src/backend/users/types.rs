/**
 * User Handler Types
 *
 * Request and response bodies for the `/v1/user` endpoints.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::{CartItem, PageRequest, SharedError, User};

/// Public view of a user
///
/// Contains no password hash, email or cart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub brand_name: Option<String>,
    pub phone_no: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub is_verified: bool,
    pub stars: i64,
    pub starred_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            image: user.image,
            brand_name: user.brand_name,
            phone_no: user.phone_no,
            instagram: user.instagram,
            facebook: user.facebook,
            is_verified: user.is_verified,
            stars: user.stars,
            starred_by: user.starred_by,
            created_at: user.created_at,
        }
    }
}

/// The caller's own profile, including email and cart
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub email: String,
    pub cart: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(mut user: User) -> Self {
        let email = std::mem::take(&mut user.email);
        let cart = std::mem::take(&mut user.cart);
        let updated_at = user.updated_at;
        Self {
            user: user.into(),
            email,
            cart,
            updated_at,
        }
    }
}

/// Generic confirmation body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of an image upload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageResponse {
    pub image: String,
}

/// `limit`/`page` query parameters
#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn page_request(&self) -> Result<PageRequest, SharedError> {
        PageRequest::new(self.limit, self.page)
    }
}

/// Keyword search query parameters
#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl SearchQuery {
    pub fn page_request(&self) -> Result<PageRequest, SharedError> {
        PageRequest::new(self.limit, self.page)
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct BrandNameRequest {
    pub brand_name: String,
}

/// Account deletion request; the password confirms the deletion
#[derive(Deserialize, Serialize, Debug)]
pub struct DeleteAccountRequest {
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::NewUser;

    #[test]
    fn test_public_view_hides_private_fields() {
        let new_user = NewUser {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "a@x.com".to_string(),
            password: "abcdefg".to_string(),
        };
        let user = User::new(&new_user, "$2b$04$hash".to_string(), Utc::now());
        let json = serde_json::to_value(UserResponse::from(user.clone())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_none());
        assert!(json.get("cart").is_none());

        let profile = serde_json::to_value(ProfileResponse::from(user)).unwrap();
        assert_eq!(profile["email"], "a@x.com");
        assert_eq!(profile["first_name"], "Ada");
        assert!(profile["cart"].as_array().unwrap().is_empty());
        assert!(profile.get("password_hash").is_none());
    }
}
