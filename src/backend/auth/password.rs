/**
 * Password Hashing
 *
 * Salted bcrypt hashes with a configurable work factor.
 */
use thiserror::Error;

/// Hashing or verification failed inside bcrypt
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// Password hasher
///
/// Cheap to copy; holds only the bcrypt cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Lowest cost bcrypt accepts
    pub const MIN_COST: u32 = 4;
    /// Highest cost bcrypt accepts
    pub const MAX_COST: u32 = 31;

    /// Create a hasher, clamping `cost` into bcrypt's accepted range
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(Self::MIN_COST, Self::MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password
    ///
    /// # Errors
    /// `PasswordError` if bcrypt fails
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Check a plaintext password against a stored hash
    ///
    /// # Returns
    /// `Ok(false)` on mismatch; `Err` only when the hash itself is unusable
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        Ok(bcrypt::verify(password, hash)?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
