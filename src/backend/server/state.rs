/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds one `Arc` per service:
 * - `AuthService` for registration, login and token lifecycle
 * - `UserService` for profiles, brand names and stars
 * - `ProductService` for products, carts and orders
 *
 * Services are built once from `Dependencies` and never mutated; all
 * mutable data lives behind the store traits.
 *
 * # Example
 *
 * ```rust,ignore
 * use axum::extract::State;
 * use std::sync::Arc;
 * use kamou_shop::backend::users::UserService;
 *
 * async fn handler(State(users): State<Arc<UserService>>) {
 *     // ...
 * }
 * ```
 */
use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::{AuthService, CodeStore, PasswordHasher, TokenMaker, TokenPolicy};
use crate::backend::images::ImageHost;
use crate::backend::products::ProductService;
use crate::backend::storage::Store;
use crate::backend::users::UserService;

/// External collaborators the services are built from
pub struct Dependencies {
    pub store: Arc<dyn Store>,
    pub codes: Arc<dyn CodeStore>,
    pub images: Arc<dyn ImageHost>,
    pub token_maker: TokenMaker,
    pub hasher: PasswordHasher,
    pub policy: TokenPolicy,
}

/// Application state shared by every handler
///
/// # Fields
///
/// * `auth` - Token issuance, verification and revocation
/// * `users` - Profile operations
/// * `products` - Product, cart and order operations
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub products: Arc<ProductService>,
}

impl AppState {
    /// Build every service from its collaborators
    pub fn new(deps: Dependencies) -> Self {
        let auth = AuthService::new(
            deps.store.clone(),
            deps.codes,
            deps.token_maker,
            deps.hasher,
            deps.policy,
        );
        let users = UserService::new(deps.store.clone(), deps.hasher, deps.images.clone());
        let products = ProductService::new(deps.store, deps.images);

        Self {
            auth: Arc::new(auth),
            users: Arc::new(users),
            products: Arc::new(products),
        }
    }
}

/// Lets handlers extract `State<Arc<AuthService>>`
impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<UserService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for Arc<ProductService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.products.clone()
    }
}
