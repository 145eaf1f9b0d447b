/**
 * PostgreSQL Store
 *
 * sqlx-backed implementation of the storage traits. The schema lives in
 * `migrations/` and is applied at startup.
 *
 * # Layout
 *
 * - `users.cart` is a JSONB array of cart snapshots
 * - `users.starred_by` is a `UUID[]`
 * - products, orders and tokens reference `users(id)` with
 *   `ON DELETE CASCADE`, so deleting a user removes what they own
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::backend::storage::{
    escape_like, Checkout, OrderStore, ProductStore, StarOutcome, StoreError, TokenStore,
    UserStore,
};
use crate::shared::{
    CartItem, Order, PageRequest, Product, ProductUpdate, ProfileUpdate, TokenRecord, User,
};

macro_rules! user_columns {
    () => {
        "id, first_name, last_name, email, password_hash, image, brand_name, phone_no, \
         instagram, facebook, is_verified, stars, starred_by, cart, created_at, updated_at"
    };
}

macro_rules! product_columns {
    () => {
        "id, owner_id, name, description, price, image, total_stock, created_at, updated_at"
    };
}

macro_rules! order_columns {
    () => {
        "id, user_id, items, total_price, created_at, updated_at"
    };
}

macro_rules! token_columns {
    () => {
        "id, user_id, kind, duration_secs, expires_at, blacklisted, created_at"
    };
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    image: Option<String>,
    brand_name: Option<String>,
    phone_no: Option<String>,
    instagram: Option<String>,
    facebook: Option<String>,
    is_verified: bool,
    stars: i64,
    starred_by: Vec<Uuid>,
    cart: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            image: row.image,
            brand_name: row.brand_name,
            phone_no: row.phone_no,
            instagram: row.instagram,
            facebook: row.facebook,
            is_verified: row.is_verified,
            stars: row.stars,
            starred_by: row.starred_by,
            cart: row.cart.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<CartItem>>,
    total_price: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            total_price: row.total_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TokenRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    duration_secs: i64,
    expires_at: DateTime<Utc>,
    blacklisted: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for TokenRecord {
    type Error = StoreError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse().map_err(|_| StoreError::Corrupt {
            message: format!("token {} has unknown kind '{}'", row.id, row.kind),
        })?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            kind,
            duration_secs: row.duration_secs,
            expires_at: row.expires_at,
            blacklisted: row.blacklisted,
            created_at: row.created_at,
        })
    }
}

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(concat!(
            "INSERT INTO users (",
            user_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.image)
        .bind(&user.brand_name)
        .bind(&user.phone_no)
        .bind(&user.instagram)
        .bind(&user.facebook)
        .bind(user.is_verified)
        .bind(user.stars)
        .bind(&user.starred_by)
        .bind(Json(&user.cart))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self, page: PageRequest) -> Result<(Vec<User>, i64), StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.skip())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    async fn search_brands(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), StoreError> {
        let pattern = format!("%{}%", escape_like(keyword));

        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            r" FROM users WHERE brand_name ILIKE $1 ESCAPE '\'",
            " ORDER BY created_at, id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.skip())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r"SELECT COUNT(*) FROM users WHERE brand_name ILIKE $1 ESCAPE '\'",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_image(&self, id: Uuid, url: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET image = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET phone_no = COALESCE($2, phone_no),
                instagram = COALESCE($3, instagram),
                facebook = COALESCE($4, facebook),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.phone_no)
        .bind(&update.instagram)
        .bind(&update.facebook)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_brand_name(&self, id: Uuid, brand_name: &str) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE users SET brand_name = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(brand_name)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = now() WHERE email = $1")
                .bind(email)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn add_star(&self, shop_id: Uuid, by: Uuid) -> Result<StarOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET stars = stars + 1,
                starred_by = array_append(starred_by, $2),
                updated_at = now()
            WHERE id = $1 AND NOT ($2 = ANY(starred_by))
            "#,
        )
        .bind(shop_id)
        .bind(by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(StarOutcome::Added);
        }

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(shop_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(if exists {
            StarOutcome::AlreadyStarred
        } else {
            StarOutcome::UnknownShop
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn push_cart_item(&self, user_id: Uuid, item: &CartItem) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET cart = cart || jsonb_build_array($2::jsonb),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(Json(item))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_cart_items(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<usize>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let cart = sqlx::query_scalar::<_, Json<Vec<CartItem>>>(
            "SELECT cart FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(Json(mut cart)) = cart else {
            return Ok(None);
        };

        let before = cart.len();
        cart.retain(|item| item.product_id != product_id);
        let removed = before - cart.len();

        if removed > 0 {
            sqlx::query("UPDATE users SET cart = $2, updated_at = now() WHERE id = $1")
                .bind(user_id)
                .bind(Json(&cart))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(Some(removed))
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(concat!(
            "INSERT INTO products (",
            product_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(product.id)
        .bind(product.owner_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.image)
        .bind(product.total_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn products_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), StoreError> {
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE owner_id = $1",
            " ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        ))
        .bind(owner_id)
        .bind(page.limit())
        .bind(page.skip())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((products, total))
    }

    async fn search_products(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), StoreError> {
        let pattern = format!("%{}%", escape_like(keyword));

        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            r" FROM products WHERE name ILIKE $1 ESCAPE '\'",
            " ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.skip())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r"SELECT COUNT(*) FROM products WHERE name ILIKE $1 ESCAPE '\'",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((products, total))
    }

    async fn update_product(
        &self,
        id: Uuid,
        update: &ProductUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "UPDATE products SET description = COALESCE($2, description),",
            " price = COALESCE($3, price), updated_at = $4 WHERE id = $1 RETURNING ",
            product_columns!()
        ))
        .bind(id)
        .bind(&update.description)
        .bind(update.price)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn checkout(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Checkout, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps concurrent add-to-cart and checkout from interleaving.
        let cart = sqlx::query_scalar::<_, Json<Vec<CartItem>>>(
            "SELECT cart FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(Json(items)) = cart else {
            return Ok(Checkout::UnknownUser);
        };
        let order = match Order::from_cart(user_id, items, now) {
            Ok(order) => order,
            Err(reason) => return Ok(Checkout::Rejected(reason)),
        };

        sqlx::query(concat!(
            "INSERT INTO orders (",
            order_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.total_price)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET cart = '[]'::jsonb, updated_at = $2 WHERE id = $1")
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Checkout::Placed(order))
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert_tokens(&self, records: &[TokenRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(concat!(
                "INSERT INTO tokens (",
                token_columns!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ))
            .bind(record.id)
            .bind(record.user_id)
            .bind(record.kind.as_str())
            .bind(record.duration_secs)
            .bind(record.expires_at)
            .bind(record.blacklisted)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn token_by_id(&self, id: Uuid) -> Result<Option<TokenRecord>, StoreError> {
        let row = sqlx::query_as::<_, TokenRow>(concat!(
            "SELECT ",
            token_columns!(),
            " FROM tokens WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TokenRecord::try_from).transpose()
    }

    async fn blacklist_token(&self, id: Uuid) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE tokens SET blacklisted = TRUE WHERE id = $1 AND NOT blacklisted")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn blacklist_user_tokens(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE tokens SET blacklisted = TRUE WHERE user_id = $1 AND NOT blacklisted",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
