/**
 * In-Memory Store
 *
 * All collections live behind one `RwLock`, so every trait method is a
 * single critical section. That makes the uniqueness checks, the star
 * update and checkout atomic without any extra coordination.
 *
 * Data is lost on restart.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::storage::{
    Checkout, OrderStore, ProductStore, StarOutcome, StoreError, TokenStore, UserStore,
    USERS_BRAND_NAME_KEY, USERS_EMAIL_KEY,
};
use crate::shared::{
    CartItem, Order, PageRequest, Product, ProductUpdate, ProfileUpdate, TokenRecord, User,
};

#[derive(Debug, Default)]
struct MemoryData {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    tokens: HashMap<Uuid, TokenRecord>,
}

/// Store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cut one page out of an already-sorted result set
fn paginate<T>(items: Vec<T>, page: PageRequest) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let page_items = items
        .into_iter()
        .skip(page.skip() as usize)
        .take(page.limit() as usize)
        .collect();
    (page_items, total)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn update_user<F>(data: &mut MemoryData, id: Uuid, f: F) -> bool
where
    F: FnOnce(&mut User),
{
    match data.users.get_mut(&id) {
        Some(user) => {
            f(user);
            user.updated_at = Utc::now();
            true
        }
        None => false,
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::conflict(USERS_EMAIL_KEY));
        }
        if let Some(brand) = &user.brand_name {
            if data.users.values().any(|u| u.brand_name.as_ref() == Some(brand)) {
                return Err(StoreError::conflict(USERS_BRAND_NAME_KEY));
            }
        }
        data.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let data = self.data.read().await;
        Ok(data.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, page: PageRequest) -> Result<(Vec<User>, i64), StoreError> {
        let data = self.data.read().await;
        let mut users: Vec<User> = data.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(paginate(users, page))
    }

    async fn search_brands(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), StoreError> {
        let data = self.data.read().await;
        let mut users: Vec<User> = data
            .users
            .values()
            .filter(|u| {
                u.brand_name
                    .as_deref()
                    .is_some_and(|brand| contains_ignore_case(brand, keyword))
            })
            .cloned()
            .collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(paginate(users, page))
    }

    async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        Ok(update_user(&mut data, id, |user| user.password_hash = hash.to_string()))
    }

    async fn set_image(&self, id: Uuid, url: &str) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        Ok(update_user(&mut data, id, |user| user.image = Some(url.to_string())))
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        Ok(update_user(&mut data, id, |user| {
            if let Some(phone_no) = &update.phone_no {
                user.phone_no = Some(phone_no.clone());
            }
            if let Some(instagram) = &update.instagram {
                user.instagram = Some(instagram.clone());
            }
            if let Some(facebook) = &update.facebook {
                user.facebook = Some(facebook.clone());
            }
        }))
    }

    async fn set_brand_name(&self, id: Uuid, brand_name: &str) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        let taken = data
            .users
            .values()
            .any(|u| u.id != id && u.brand_name.as_deref() == Some(brand_name));
        if taken {
            return Err(StoreError::conflict(USERS_BRAND_NAME_KEY));
        }
        Ok(update_user(&mut data, id, |user| {
            user.brand_name = Some(brand_name.to_string())
        }))
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        let id = data.users.values().find(|u| u.email == email).map(|u| u.id);
        Ok(match id {
            Some(id) => update_user(&mut data, id, |user| user.is_verified = true),
            None => false,
        })
    }

    async fn add_star(&self, shop_id: Uuid, by: Uuid) -> Result<StarOutcome, StoreError> {
        let mut data = self.data.write().await;
        let Some(shop) = data.users.get_mut(&shop_id) else {
            return Ok(StarOutcome::UnknownShop);
        };
        if shop.starred_by.contains(&by) {
            return Ok(StarOutcome::AlreadyStarred);
        }
        shop.starred_by.push(by);
        shop.stars += 1;
        shop.updated_at = Utc::now();
        Ok(StarOutcome::Added)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        if data.users.remove(&id).is_none() {
            return Ok(false);
        }
        data.products.retain(|_, p| p.owner_id != id);
        data.orders.retain(|_, o| o.user_id != id);
        data.tokens.retain(|_, t| t.user_id != id);
        Ok(true)
    }

    async fn push_cart_item(&self, user_id: Uuid, item: &CartItem) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        Ok(update_user(&mut data, user_id, |user| user.cart.push(item.clone())))
    }

    async fn remove_cart_items(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<usize>, StoreError> {
        let mut data = self.data.write().await;
        let Some(user) = data.users.get_mut(&user_id) else {
            return Ok(None);
        };
        let before = user.cart.len();
        user.cart.retain(|item| item.product_id != product_id);
        let removed = before - user.cart.len();
        if removed > 0 {
            user.updated_at = Utc::now();
        }
        Ok(Some(removed))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.data
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.data.read().await.products.get(&id).cloned())
    }

    async fn products_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), StoreError> {
        let data = self.data.read().await;
        let mut products: Vec<Product> = data
            .products
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(products, page))
    }

    async fn search_products(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), StoreError> {
        let data = self.data.read().await;
        let mut products: Vec<Product> = data
            .products
            .values()
            .filter(|p| contains_ignore_case(&p.name, keyword))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(products, page))
    }

    async fn update_product(
        &self,
        id: Uuid,
        update: &ProductUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let mut data = self.data.write().await;
        let Some(product) = data.products.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(description) = &update.description {
            product.description = description.clone();
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        product.updated_at = now;
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.data.write().await.products.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn checkout(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Checkout, StoreError> {
        let mut data = self.data.write().await;
        let Some(user) = data.users.get_mut(&user_id) else {
            return Ok(Checkout::UnknownUser);
        };
        let order = match Order::from_cart(user_id, user.cart.clone(), now) {
            Ok(order) => order,
            Err(reason) => return Ok(Checkout::Rejected(reason)),
        };
        user.cart.clear();
        user.updated_at = now;
        data.orders.insert(order.id, order.clone());
        Ok(Checkout::Placed(order))
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let data = self.data.read().await;
        let mut orders: Vec<Order> = data
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_tokens(&self, records: &[TokenRecord]) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        for record in records {
            data.tokens.insert(record.id, record.clone());
        }
        Ok(())
    }

    async fn token_by_id(&self, id: Uuid) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.data.read().await.tokens.get(&id).cloned())
    }

    async fn blacklist_token(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        match data.tokens.get_mut(&id) {
            Some(record) if !record.blacklisted => {
                record.blacklisted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn blacklist_user_tokens(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        let mut changed = 0;
        for record in data.tokens.values_mut() {
            if record.user_id == user_id && !record.blacklisted {
                record.blacklisted = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
