/**
 * Product Routes
 *
 * Every route in this group requires authentication.
 *
 * ## Products
 * - `POST /v1/product` - Create (multipart)
 * - `GET /v1/product/{id}` - Fetch one product
 * - `DELETE /v1/product/{id}` - Delete one's own product
 * - `GET /v1/product/products/by-id` - List by owner
 * - `GET /v1/product/products/by-name` - Search by name
 * - `PATCH /v1/product/update` - Update description and/or price
 *
 * ## Cart and orders
 * - `POST /v1/product/add-to-cart`
 * - `DELETE /v1/product/remove-from-cart/{id}`
 * - `POST /v1/product/make-order`
 * - `GET /v1/product/orders`
 */
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};

use crate::backend::middleware::auth_middleware;
use crate::backend::products::handlers::{
    add_to_cart, create_product, delete_product, get_product, list_orders, make_order,
    products_by_owner, remove_from_cart, search_products, update_product,
};
use crate::backend::server::state::AppState;

/// Configure product, cart and order routes
///
/// The static `/v1/product/...` segments win over `/v1/product/{id}` in
/// axum's matcher, so `orders` is never read as a product id.
pub fn configure_product_routes(
    router: Router<AppState>,
    app_state: &AppState,
) -> Router<AppState> {
    let protected = Router::new()
        .route("/v1/product", post(create_product))
        .route("/v1/product/{id}", get(get_product).delete(delete_product))
        .route("/v1/product/products/by-id", get(products_by_owner))
        .route("/v1/product/products/by-name", get(search_products))
        .route("/v1/product/update", patch(update_product))
        .route("/v1/product/add-to-cart", post(add_to_cart))
        .route("/v1/product/remove-from-cart/{id}", delete(remove_from_cart))
        .route("/v1/product/make-order", post(make_order))
        .route("/v1/product/orders", get(list_orders))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    router.merge(protected)
}
