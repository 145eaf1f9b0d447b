/**
 * Product Handler Types
 *
 * Request and response bodies for the `/v1/product` endpoints.
 */
use serde::{Deserialize, Serialize};

use crate::shared::{PageRequest, ProductUpdate, SharedError};

/// Body of `PATCH /v1/product/update`
///
/// `id` arrives as text so a malformed id is reported as a validation
/// error on `id`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UpdateProductRequest {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

impl UpdateProductRequest {
    pub fn into_update(self) -> ProductUpdate {
        ProductUpdate {
            description: self.description,
            price: self.price,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AddToCartRequest {
    pub prod_id: String,
}

/// Query of `GET /v1/product/products/by-id`
#[derive(Deserialize, Debug, Default)]
pub struct OwnerQuery {
    #[serde(default)]
    pub user_id: String,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl OwnerQuery {
    pub fn page_request(&self) -> Result<PageRequest, SharedError> {
        PageRequest::new(self.limit, self.page)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoveFromCartResponse {
    pub removed: usize,
}
