/**
 * User Service
 *
 * Profile reads and updates, brand names, shop stars and account deletion.
 */
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::auth::password::PasswordHasher;
use crate::backend::error::BackendError;
use crate::backend::images::{ImageHost, ImageUpload};
use crate::backend::storage::{StarOutcome, Store, USERS_BRAND_NAME_KEY};
use crate::shared::validation::{validate_min_len, validate_password};
use crate::shared::{Page, PageRequest, ProfileUpdate, User};

/// User service
pub struct UserService {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    images: Arc<dyn ImageHost>,
}

fn user_not_found() -> BackendError {
    BackendError::not_found("user not found")
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher, images: Arc<dyn ImageHost>) -> Self {
        Self {
            store,
            hasher,
            images,
        }
    }

    /// Fetch a user by id
    ///
    /// # Errors
    /// `NotFound` if no such user exists
    pub async fn get_user(&self, id: Uuid) -> Result<User, BackendError> {
        self.store.user_by_id(id).await?.ok_or_else(user_not_found)
    }

    pub async fn list_users(&self, page: PageRequest) -> Result<Page<User>, BackendError> {
        let (users, total) = self.store.list_users(page).await?;
        Ok(Page::new(users, page, total))
    }

    /// Users whose brand name contains `keyword`, ignoring case
    pub async fn search_brands(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<User>, BackendError> {
        let (users, total) = self.store.search_brands(keyword.trim(), page).await?;
        Ok(Page::new(users, page, total))
    }

    /// Change a password after checking the old one
    ///
    /// Every token the user holds is revoked, so they must log in again.
    ///
    /// # Errors
    /// - `PasswordMismatch` if `old_password` is wrong
    /// - `Validation` if `new_password` breaks the password rules
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), BackendError> {
        let user = self.get_user(user_id).await?;
        if !self.hasher.verify(old_password, &user.password_hash)? {
            tracing::warn!("Password change rejected for user {}", user_id);
            return Err(BackendError::PasswordMismatch);
        }
        validate_password("new_password", new_password)?;

        let hash = self.hasher.hash(new_password)?;
        if !self.store.set_password_hash(user_id, &hash).await? {
            return Err(user_not_found());
        }
        let revoked = self.store.blacklist_user_tokens(user_id).await?;
        tracing::info!("User {} changed password, {} tokens revoked", user_id, revoked);
        Ok(())
    }

    /// Upload a new profile image and store its URL
    pub async fn update_image(
        &self,
        user_id: Uuid,
        upload: ImageUpload,
    ) -> Result<String, BackendError> {
        let uploaded = self.images.upload(upload).await?;

        if !self.store.set_image(user_id, &uploaded.url).await? {
            if let Err(e) = self.images.delete(&uploaded.public_id).await {
                tracing::warn!("Failed to remove orphaned image {}: {}", uploaded.public_id, e);
            }
            return Err(user_not_found());
        }
        tracing::info!("User {} updated profile image", user_id);
        Ok(uploaded.url)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<(), BackendError> {
        update.validate()?;
        if !self.store.update_profile(user_id, &update).await? {
            return Err(user_not_found());
        }
        Ok(())
    }

    /// Set the user's brand name
    ///
    /// # Errors
    /// `BrandNameTaken` if another user holds it
    pub async fn update_brand_name(
        &self,
        user_id: Uuid,
        brand_name: &str,
    ) -> Result<(), BackendError> {
        validate_min_len("brand_name", brand_name, 1)?;

        match self.store.set_brand_name(user_id, brand_name.trim()).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(user_not_found()),
            Err(e) if e.is_conflict_on(USERS_BRAND_NAME_KEY) => Err(BackendError::BrandNameTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Star a shop on behalf of `user_id`
    ///
    /// Starring the same shop again is accepted but does not count twice.
    ///
    /// # Errors
    /// - `Validation` when starring one's own shop
    /// - `NotFound` if the shop does not exist
    pub async fn star_shop(&self, user_id: Uuid, shop_id: Uuid) -> Result<(), BackendError> {
        if user_id == shop_id {
            return Err(BackendError::validation("id", "you cannot star your own shop"));
        }

        match self.store.add_star(shop_id, user_id).await? {
            StarOutcome::Added => {
                tracing::info!("User {} starred shop {}", user_id, shop_id);
                Ok(())
            }
            StarOutcome::AlreadyStarred => Ok(()),
            StarOutcome::UnknownShop => Err(BackendError::not_found("shop not found")),
        }
    }

    /// Delete the account after confirming the password
    ///
    /// The user's products, orders and tokens are deleted with it.
    pub async fn delete_user(&self, user_id: Uuid, password: &str) -> Result<(), BackendError> {
        let user = self.get_user(user_id).await?;
        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::warn!("Account deletion rejected for user {}", user_id);
            return Err(BackendError::PasswordMismatch);
        }

        if !self.store.delete_user(user_id).await? {
            return Err(user_not_found());
        }
        tracing::info!("Deleted user {}", user_id);
        Ok(())
    }
}
