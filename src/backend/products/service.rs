/**
 * Product Service
 *
 * Product CRUD for shop owners plus the cart and checkout flow for buyers.
 */
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::images::{ImageHost, ImageUpload};
use crate::backend::storage::{Checkout, Store};
use crate::shared::{CartError, CartItem, NewProduct, Order, Page, PageRequest, Product, ProductUpdate};

/// Product, cart and order operations
pub struct ProductService {
    store: Arc<dyn Store>,
    images: Arc<dyn ImageHost>,
}

fn product_not_found() -> BackendError {
    BackendError::not_found("product not found")
}

impl ProductService {
    pub fn new(store: Arc<dyn Store>, images: Arc<dyn ImageHost>) -> Self {
        Self { store, images }
    }

    /// Create a product owned by `owner_id`
    ///
    /// The image, when given, is uploaded before the product is stored. If
    /// storing fails the upload is deleted again.
    ///
    /// # Arguments
    /// * `owner_id` - Authenticated caller
    /// * `new_product` - Validated before anything is uploaded
    /// * `upload` - Optional product image
    ///
    /// # Errors
    /// - `Validation` for bad product fields
    /// - `Image` if the upload fails
    pub async fn create(
        &self,
        owner_id: Uuid,
        new_product: NewProduct,
        upload: Option<ImageUpload>,
    ) -> Result<Product, BackendError> {
        new_product.validate()?;

        let uploaded = match upload {
            Some(upload) => Some(self.images.upload(upload).await?),
            None => None,
        };

        let product = Product::new(
            owner_id,
            new_product,
            uploaded.as_ref().map(|image| image.url.clone()),
            Utc::now(),
        );

        if let Err(e) = self.store.insert_product(&product).await {
            if let Some(image) = uploaded {
                if let Err(delete_err) = self.images.delete(&image.public_id).await {
                    tracing::warn!(
                        "Failed to remove orphaned image {}: {}",
                        image.public_id,
                        delete_err
                    );
                }
            }
            return Err(e.into());
        }

        tracing::info!("User {} created product {}", owner_id, product.id);
        Ok(product)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, BackendError> {
        self.store.product_by_id(id).await?.ok_or_else(product_not_found)
    }

    /// Products of one owner, newest first
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Product>, BackendError> {
        let (products, total) = self.store.products_by_owner(owner_id, page).await?;
        Ok(Page::new(products, page, total))
    }

    /// Products whose name contains `keyword`, ignoring case
    pub async fn search(&self, keyword: &str, page: PageRequest) -> Result<Page<Product>, BackendError> {
        let (products, total) = self.store.search_products(keyword.trim(), page).await?;
        Ok(Page::new(products, page, total))
    }

    async fn owned_product(&self, user_id: Uuid, id: Uuid) -> Result<Product, BackendError> {
        let product = self.get(id).await?;
        if product.owner_id != user_id {
            tracing::warn!("User {} tried to modify product {} of another owner", user_id, id);
            return Err(BackendError::forbidden("only the owner can modify this product"));
        }
        Ok(product)
    }

    /// Update the description and/or price of one's own product
    ///
    /// # Errors
    /// - `Validation` if nothing is provided or the price is negative
    /// - `NotFound` for an unknown product
    /// - `Forbidden` if the caller is not the owner
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<Product, BackendError> {
        update.validate()?;
        self.owned_product(user_id, id).await?;

        let update = ProductUpdate {
            description: update.description.map(|d| d.trim().to_string()),
            price: update.price,
        };
        self.store
            .update_product(id, &update, Utc::now())
            .await?
            .ok_or_else(product_not_found)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), BackendError> {
        self.owned_product(user_id, id).await?;
        if !self.store.delete_product(id).await? {
            return Err(product_not_found());
        }
        tracing::info!("User {} deleted product {}", user_id, id);
        Ok(())
    }

    /// Append a snapshot of the product to the caller's cart
    ///
    /// Adding the same product twice yields two cart lines.
    pub async fn add_to_cart(&self, user_id: Uuid, product_id: Uuid) -> Result<CartItem, BackendError> {
        let product = self.get(product_id).await?;
        let item = CartItem::from(&product);

        if !self.store.push_cart_item(user_id, &item).await? {
            return Err(BackendError::not_found("user not found"));
        }
        tracing::debug!("User {} added product {} to cart", user_id, product_id);
        Ok(item)
    }

    /// Remove every cart line for `product_id`
    ///
    /// # Returns
    /// How many lines were removed; zero when the product was not in the cart
    pub async fn remove_from_cart(&self, user_id: Uuid, product_id: Uuid) -> Result<usize, BackendError> {
        self.store
            .remove_cart_items(user_id, product_id)
            .await?
            .ok_or_else(|| BackendError::not_found("user not found"))
    }

    /// Turn the caller's cart into an order
    ///
    /// # Errors
    /// `EmptyCart` when there is nothing to order, `Validation` when the
    /// cart total does not fit
    pub async fn make_order(&self, user_id: Uuid) -> Result<Order, BackendError> {
        match self.store.checkout(user_id, Utc::now()).await? {
            Checkout::Placed(order) => {
                tracing::info!(
                    "User {} placed order {} ({} items, total {})",
                    user_id,
                    order.id,
                    order.items.len(),
                    order.total_price
                );
                Ok(order)
            }
            Checkout::Rejected(CartError::Empty) => Err(BackendError::EmptyCart),
            Checkout::Rejected(CartError::TotalOverflow) => {
                Err(BackendError::validation("cart", "order total is too large"))
            }
            Checkout::UnknownUser => Err(BackendError::not_found("user not found")),
        }
    }

    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>, BackendError> {
        Ok(self.store.orders_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::images::{DisabledImageHost, ImageError, UploadedImage};
    use crate::backend::storage::{MemoryStore, UserStore};
    use crate::shared::{NewUser, User};
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    struct FakeHost;

    #[async_trait]
    impl ImageHost for FakeHost {
        async fn upload(&self, upload: ImageUpload) -> Result<UploadedImage, ImageError> {
            Ok(UploadedImage {
                url: format!("https://img.test/{}", upload.file_name),
                public_id: upload.file_name,
            })
        }

        async fn delete(&self, _public_id: &str) -> Result<(), ImageError> {
            Ok(())
        }
    }

    async fn seed_user(store: &MemoryStore, email: &str) -> User {
        let new_user = NewUser {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: email.to_string(),
            password: "abcdefg".to_string(),
        };
        let user = User::new(&new_user, "hash".to_string(), Utc::now());
        store.insert_user(&user).await.unwrap();
        user
    }

    fn shoe() -> NewProduct {
        NewProduct {
            name: "Sneakers".to_string(),
            description: "White canvas sneakers".to_string(),
            price: 2500,
            total_stock: 10,
        }
    }

    #[tokio::test]
    async fn test_create_with_image() {
        let store = Arc::new(MemoryStore::new());
        let products = ProductService::new(store.clone(), Arc::new(FakeHost));
        let owner = seed_user(&store, "shop@x.com").await;

        let upload = ImageUpload {
            file_name: "shoe.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: bytes::Bytes::from_static(b"png"),
        };
        let product = products.create(owner.id, shoe(), Some(upload)).await.unwrap();
        assert_eq!(product.image.as_deref(), Some("https://img.test/shoe.png"));
        assert_eq!(products.get(product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let store = Arc::new(MemoryStore::new());
        let products = ProductService::new(store.clone(), Arc::new(DisabledImageHost));
        let owner = seed_user(&store, "shop@x.com").await;

        let mut bad = shoe();
        bad.price = -1;
        assert_matches!(
            products.create(owner.id, bad, None).await,
            Err(BackendError::Validation { .. })
        );
    }

    #[tokio::test]
    async fn test_only_owner_may_modify() {
        let store = Arc::new(MemoryStore::new());
        let products = ProductService::new(store.clone(), Arc::new(DisabledImageHost));
        let owner = seed_user(&store, "shop@x.com").await;
        let other = seed_user(&store, "other@x.com").await;
        let product = products.create(owner.id, shoe(), None).await.unwrap();

        let update = ProductUpdate {
            price: Some(1),
            ..Default::default()
        };
        assert_matches!(
            products.update(other.id, product.id, update.clone()).await,
            Err(BackendError::Forbidden { .. })
        );
        assert_matches!(
            products.delete(other.id, product.id).await,
            Err(BackendError::Forbidden { .. })
        );

        let updated = products.update(owner.id, product.id, update).await.unwrap();
        assert_eq!(updated.price, 1);
        assert_eq!(updated.description, product.description);

        products.delete(owner.id, product.id).await.unwrap();
        assert_matches!(products.get(product.id).await, Err(BackendError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cart_then_order() {
        let store = Arc::new(MemoryStore::new());
        let products = ProductService::new(store.clone(), Arc::new(DisabledImageHost));
        let owner = seed_user(&store, "shop@x.com").await;
        let buyer = seed_user(&store, "buyer@x.com").await;
        let product = products.create(owner.id, shoe(), None).await.unwrap();

        assert_matches!(products.make_order(buyer.id).await, Err(BackendError::EmptyCart));

        for _ in 0..3 {
            products.add_to_cart(buyer.id, product.id).await.unwrap();
        }
        let order = products.make_order(buyer.id).await.unwrap();
        assert_eq!(order.total_price, 3 * product.price);
        assert_eq!(order.items.len(), 3);

        let stored = store.user_by_id(buyer.id).await.unwrap().unwrap();
        assert!(stored.cart.is_empty());
        assert_eq!(products.list_orders(buyer.id).await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn test_order_total_overflow_keeps_cart() {
        let store = Arc::new(MemoryStore::new());
        let products = ProductService::new(store.clone(), Arc::new(DisabledImageHost));
        let owner = seed_user(&store, "shop@x.com").await;
        let buyer = seed_user(&store, "buyer@x.com").await;
        let pricey = NewProduct {
            price: i64::MAX,
            ..shoe()
        };
        let product = products.create(owner.id, pricey, None).await.unwrap();

        products.add_to_cart(buyer.id, product.id).await.unwrap();
        products.add_to_cart(buyer.id, product.id).await.unwrap();
        assert_matches!(
            products.make_order(buyer.id).await,
            Err(BackendError::Validation { ref field, .. }) if field == "cart"
        );

        let stored = store.user_by_id(buyer.id).await.unwrap().unwrap();
        assert_eq!(stored.cart.len(), 2);
        assert!(products.list_orders(buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_from_cart_counts_lines() {
        let store = Arc::new(MemoryStore::new());
        let products = ProductService::new(store.clone(), Arc::new(DisabledImageHost));
        let owner = seed_user(&store, "shop@x.com").await;
        let buyer = seed_user(&store, "buyer@x.com").await;
        let product = products.create(owner.id, shoe(), None).await.unwrap();

        products.add_to_cart(buyer.id, product.id).await.unwrap();
        products.add_to_cart(buyer.id, product.id).await.unwrap();
        assert_eq!(products.remove_from_cart(buyer.id, product.id).await.unwrap(), 2);
        assert_eq!(products.remove_from_cart(buyer.id, product.id).await.unwrap(), 0);

        assert_matches!(
            products.add_to_cart(buyer.id, Uuid::new_v4()).await,
            Err(BackendError::NotFound { .. })
        );
    }
}
