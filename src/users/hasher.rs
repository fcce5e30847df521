//! bcrypt password hashing.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Work factor used in production; each step doubles the hashing time.
pub const DEFAULT_COST: u32 = 14;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt cost {0} is outside the supported range 4..=31")]
    Cost(u32),
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Salted one-way hashing of account passwords.
///
/// The salt is embedded in the produced hash, so hashing the same plaintext
/// twice yields two different strings that both verify.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// # Errors
    /// Returns [`HashError::Cost`] if `cost` is not accepted by bcrypt.
    pub fn new(cost: u32) -> Result<Self, HashError> {
        if (MIN_COST..=MAX_COST).contains(&cost) {
            Ok(Self { cost })
        } else {
            Err(HashError::Cost(cost))
        }
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// # Errors
    /// Returns an error only if bcrypt itself fails.
    pub fn hash(&self, plaintext: &SecretString) -> Result<String, HashError> {
        Ok(bcrypt::hash(plaintext.expose_secret(), self.cost)?)
    }

    /// # Errors
    /// Returns an error if `hashed` is not a bcrypt hash.
    pub fn verify(&self, plaintext: &SecretString, hashed: &str) -> Result<bool, HashError> {
        Ok(bcrypt::verify(plaintext.expose_secret(), hashed)?)
    }

    /// Hash on the blocking pool so request workers are not stalled.
    ///
    /// # Errors
    /// Returns an error if bcrypt fails or the blocking task is cancelled.
    pub async fn hash_blocking(&self, plaintext: SecretString) -> Result<String, HashError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}
