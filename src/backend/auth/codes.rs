/**
 * Email Verification Codes
 *
 * Short-lived one-time codes mapping to the email they were issued for.
 * A code is stored with a TTL, looked up once, and deleted after use.
 *
 * Two backends implement `CodeStore`: an in-memory map and a PostgreSQL
 * table. Expired entries are invisible to `get` in both.
 */
use async_trait::async_trait;
use rand::Rng;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

pub use crate::shared::validation::CODE_LEN;

/// Verification code store errors
#[derive(Debug, Error)]
pub enum CodeStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Key-value store for verification codes
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `code -> email` for `ttl` unless a live entry already holds `code`
    ///
    /// # Returns
    /// `true` if stored, `false` if the code is taken
    async fn put_if_absent(&self, code: &str, email: &str, ttl: Duration)
        -> Result<bool, CodeStoreError>;

    /// Email for a live code
    async fn get(&self, code: &str) -> Result<Option<String>, CodeStoreError>;

    /// Delete a code; deleting a missing code is not an error
    async fn remove(&self, code: &str) -> Result<(), CodeStoreError>;
}

/// Generate a random code of `CODE_LEN` lowercase ASCII letters
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// In-process code store
#[derive(Debug, Default)]
pub struct MemoryCodeStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn put_if_absent(
        &self,
        code: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<bool, CodeStoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);

        if entries.contains_key(code) {
            return Ok(false);
        }
        entries.insert(code.to_string(), (email.to_string(), now + ttl));
        Ok(true)
    }

    async fn get(&self, code: &str) -> Result<Option<String>, CodeStoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(code)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(email, _)| email.clone()))
    }

    async fn remove(&self, code: &str) -> Result<(), CodeStoreError> {
        self.entries.write().await.remove(code);
        Ok(())
    }
}

/// Code store backed by the `verification_codes` table
#[derive(Debug, Clone)]
pub struct PgCodeStore {
    pool: PgPool,
}

impl PgCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeStore for PgCodeStore {
    async fn put_if_absent(
        &self,
        code: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<bool, CodeStoreError> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = chrono::Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);

        sqlx::query("DELETE FROM verification_codes WHERE code = $1 AND expires_at <= now()")
            .bind(code)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO verification_codes (code, email, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(email)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, code: &str) -> Result<Option<String>, CodeStoreError> {
        let email = sqlx::query_scalar::<_, String>(
            "SELECT email FROM verification_codes WHERE code = $1 AND expires_at > now()",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(email)
    }

    async fn remove(&self, code: &str) -> Result<(), CodeStoreError> {
        sqlx::query("DELETE FROM verification_codes WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = MemoryCodeStore::new();
        assert!(store
            .put_if_absent("abcdef", "a@x.com", Duration::from_secs(60))
            .await
            .unwrap());
        assert_eq!(store.get("abcdef").await.unwrap().as_deref(), Some("a@x.com"));

        store.remove("abcdef").await.unwrap();
        assert_eq!(store.get("abcdef").await.unwrap(), None);
        store.remove("abcdef").await.unwrap();
    }

    #[tokio::test]
    async fn test_live_code_is_not_overwritten() {
        let store = MemoryCodeStore::new();
        let ttl = Duration::from_secs(60);
        assert!(store.put_if_absent("abcdef", "a@x.com", ttl).await.unwrap());
        assert!(!store.put_if_absent("abcdef", "b@x.com", ttl).await.unwrap());
        assert_eq!(store.get("abcdef").await.unwrap().as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn test_expired_code_is_gone() {
        let store = MemoryCodeStore::new();
        assert!(store
            .put_if_absent("abcdef", "a@x.com", Duration::from_millis(10))
            .await
            .unwrap());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("abcdef").await.unwrap(), None);
        assert!(store
            .put_if_absent("abcdef", "b@x.com", Duration::from_secs(60))
            .await
            .unwrap());
    }
}
