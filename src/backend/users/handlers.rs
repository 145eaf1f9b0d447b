/**
 * User Handlers
 *
 * HTTP handlers for the `/v1/user` endpoints. Every route here sits behind
 * the authentication middleware.
 */
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::images::{form::UPLOAD_FIELD, read_upload_form};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::users::service::UserService;
use crate::backend::users::types::{
    BrandNameRequest, ChangePasswordRequest, DeleteAccountRequest, ImageResponse,
    MessageResponse, PageQuery, ProfileResponse, SearchQuery, UserResponse,
};
use crate::shared::validation::parse_id;
use crate::shared::{Page, ProfileUpdate};

/// GET /v1/user
///
/// Lists all users, oldest first.
pub async fn list_users(
    State(users): State<Arc<UserService>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserResponse>>, BackendError> {
    let page = users.list_users(query.page_request()?).await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// GET /v1/user/me
pub async fn me(
    State(users): State<Arc<UserService>>,
    AuthUser(session): AuthUser,
) -> Result<Json<ProfileResponse>, BackendError> {
    let user = users.get_user(session.user_id).await?;
    Ok(Json(user.into()))
}

/// GET /v1/user/by-id/{id}
pub async fn get_user(
    State(users): State<Arc<UserService>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, BackendError> {
    let user = users.get_user(parse_id("id", &id)?).await?;
    Ok(Json(user.into()))
}

/// GET /v1/user/brands?keyword=&limit=&page=
///
/// Case-insensitive substring search over brand names. An empty keyword
/// lists every user that has a brand name.
pub async fn search_brands(
    State(users): State<Arc<UserService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Page<UserResponse>>, BackendError> {
    let page = users
        .search_brands(&query.keyword, query.page_request()?)
        .await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// PATCH /v1/user/update/password
///
/// All existing tokens stop working; the client must log in again.
///
/// # Errors
///
/// * `400 Bad Request` - Old password wrong, or new password invalid
pub async fn change_password(
    State(users): State<Arc<UserService>>,
    AuthUser(session): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    users
        .change_password(session.user_id, &request.old_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("password updated")))
}

/// PATCH /v1/user/update/image
///
/// Expects a multipart body with the file in the `upload` field.
///
/// # Errors
///
/// * `400 Bad Request` - No file sent
/// * `503 Service Unavailable` - Image uploads are not configured
pub async fn update_image(
    State(users): State<Arc<UserService>>,
    AuthUser(session): AuthUser,
    multipart: Multipart,
) -> Result<Json<ImageResponse>, BackendError> {
    let mut form = read_upload_form(multipart).await?;
    let upload = form
        .take_upload()
        .ok_or_else(|| BackendError::validation(UPLOAD_FIELD, "an image file is required"))?;

    let image = users.update_image(session.user_id, upload).await?;
    Ok(Json(ImageResponse { image }))
}

/// PATCH /v1/user/update/profile
pub async fn update_profile(
    State(users): State<Arc<UserService>>,
    AuthUser(session): AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<MessageResponse>, BackendError> {
    users.update_profile(session.user_id, update).await?;
    Ok(Json(MessageResponse::new("profile updated")))
}

/// PATCH /v1/user/update/brand-name
///
/// # Errors
///
/// * `409 Conflict` - Another user holds the brand name
pub async fn update_brand_name(
    State(users): State<Arc<UserService>>,
    AuthUser(session): AuthUser,
    Json(request): Json<BrandNameRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    users
        .update_brand_name(session.user_id, &request.brand_name)
        .await?;
    Ok(Json(MessageResponse::new("brand name updated")))
}

/// PATCH /v1/user/star/{id}
pub async fn star_shop(
    State(users): State<Arc<UserService>>,
    AuthUser(session): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, BackendError> {
    users.star_shop(session.user_id, parse_id("id", &id)?).await?;
    Ok(Json(MessageResponse::new("shop starred")))
}

/// DELETE /v1/user
///
/// Deletes the caller's account, its products and orders.
pub async fn delete_account(
    State(users): State<Arc<UserService>>,
    AuthUser(session): AuthUser,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<StatusCode, BackendError> {
    users.delete_user(session.user_id, &request.password).await?;
    Ok(StatusCode::NO_CONTENT)
}
