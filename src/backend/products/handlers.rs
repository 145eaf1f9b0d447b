/**
 * Product Handlers
 *
 * HTTP handlers for the `/v1/product` endpoints: product CRUD, the cart
 * and orders. All of them require an authenticated caller.
 */
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::images::read_upload_form;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::products::service::ProductService;
use crate::backend::products::types::{
    AddToCartRequest, OwnerQuery, RemoveFromCartResponse, UpdateProductRequest,
};
use crate::backend::users::types::SearchQuery;
use crate::shared::validation::parse_id;
use crate::shared::{CartItem, NewProduct, Order, Page, Product};

/// POST /v1/product
///
/// Multipart form with the text fields `name`, `description`, `price`,
/// `total_stock` and an optional `upload` file.
///
/// # Returns
/// `201 Created` with the stored product
pub async fn create_product(
    State(products): State<Arc<ProductService>>,
    AuthUser(session): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), BackendError> {
    let mut form = read_upload_form(multipart).await?;
    let new_product = NewProduct {
        name: form.required("name")?.to_string(),
        description: form.required("description")?.to_string(),
        price: form.required_i64("price")?,
        total_stock: form.required_i64("total_stock")?,
    };
    let upload = form.take_upload();

    let product = products.create(session.user_id, new_product, upload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /v1/product/{id}
pub async fn get_product(
    State(products): State<Arc<ProductService>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, BackendError> {
    let product = products.get(parse_id("id", &id)?).await?;
    Ok(Json(product))
}

/// GET /v1/product/products/by-id?user_id=&limit=&page=
pub async fn products_by_owner(
    State(products): State<Arc<ProductService>>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Page<Product>>, BackendError> {
    let owner_id = parse_id("user_id", &query.user_id)?;
    let page = products
        .list_by_owner(owner_id, query.page_request()?)
        .await?;
    Ok(Json(page))
}

/// GET /v1/product/products/by-name?keyword=&limit=&page=
pub async fn search_products(
    State(products): State<Arc<ProductService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Page<Product>>, BackendError> {
    let page = products
        .search(&query.keyword, query.page_request()?)
        .await?;
    Ok(Json(page))
}

/// PATCH /v1/product/update
///
/// # Errors
///
/// * `400 Bad Request` - Nothing to update, or a negative price
/// * `403 Forbidden` - The caller does not own the product
/// * `404 Not Found` - Unknown product
pub async fn update_product(
    State(products): State<Arc<ProductService>>,
    AuthUser(session): AuthUser,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, BackendError> {
    let id = parse_id("id", &request.id)?;
    let product = products
        .update(session.user_id, id, request.into_update())
        .await?;
    Ok(Json(product))
}

/// DELETE /v1/product/{id}
pub async fn delete_product(
    State(products): State<Arc<ProductService>>,
    AuthUser(session): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, BackendError> {
    products.delete(session.user_id, parse_id("id", &id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/product/add-to-cart
///
/// # Returns
/// The cart line that was appended
pub async fn add_to_cart(
    State(products): State<Arc<ProductService>>,
    AuthUser(session): AuthUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartItem>, BackendError> {
    let product_id = parse_id("prod_id", &request.prod_id)?;
    let item = products.add_to_cart(session.user_id, product_id).await?;
    Ok(Json(item))
}

/// DELETE /v1/product/remove-from-cart/{id}
pub async fn remove_from_cart(
    State(products): State<Arc<ProductService>>,
    AuthUser(session): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RemoveFromCartResponse>, BackendError> {
    let removed = products
        .remove_from_cart(session.user_id, parse_id("id", &id)?)
        .await?;
    Ok(Json(RemoveFromCartResponse { removed }))
}

/// POST /v1/product/make-order
///
/// # Errors
///
/// * `400 Bad Request` - The cart is empty
pub async fn make_order(
    State(products): State<Arc<ProductService>>,
    AuthUser(session): AuthUser,
) -> Result<(StatusCode, Json<Order>), BackendError> {
    let order = products.make_order(session.user_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/product/orders
pub async fn list_orders(
    State(products): State<Arc<ProductService>>,
    AuthUser(session): AuthUser,
) -> Result<Json<Vec<Order>>, BackendError> {
    Ok(Json(products.list_orders(session.user_id).await?))
}
