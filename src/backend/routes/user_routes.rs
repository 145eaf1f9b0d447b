/**
 * User Routes
 *
 * Every route in this group requires authentication.
 *
 * - `GET /v1/user` - List users
 * - `DELETE /v1/user` - Delete the caller's account
 * - `GET /v1/user/me` - The caller's profile
 * - `GET /v1/user/by-id/{id}` - Public view of a user
 * - `GET /v1/user/brands` - Search brand names
 * - `PATCH /v1/user/update/{password,image,profile,brand-name}`
 * - `PATCH /v1/user/star/{id}` - Star a shop
 */
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};

use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;
use crate::backend::users::handlers::{
    change_password, delete_account, get_user, list_users, me, search_brands, star_shop,
    update_brand_name, update_image, update_profile,
};

/// Configure user routes
pub fn configure_user_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/v1/user", get(list_users).delete(delete_account))
        .route("/v1/user/me", get(me))
        .route("/v1/user/by-id/{id}", get(get_user))
        .route("/v1/user/brands", get(search_brands))
        .route("/v1/user/update/password", patch(change_password))
        .route("/v1/user/update/image", patch(update_image))
        .route("/v1/user/update/profile", patch(update_profile))
        .route("/v1/user/update/brand-name", patch(update_brand_name))
        .route("/v1/user/star/{id}", patch(star_shop))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    router.merge(protected)
}
