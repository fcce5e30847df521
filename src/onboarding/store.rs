//! In-process verification code storage.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeStoreError {
    #[error("verification code store lock poisoned")]
    Poisoned,
}

/// Where an email stands in the verification flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeState {
    NoCode,
    Pending(String),
    /// The code matched at least once; it stays valid until replaced.
    Verified(String),
}

impl CodeState {
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::NoCode => None,
            Self::Pending(code) | Self::Verified(code) => Some(code),
        }
    }
}

/// Ephemeral email → code mapping. At most one code per email.
pub trait CodeStore: Send + Sync {
    /// Replace any previous code for `email` with a pending `code`.
    ///
    /// # Errors
    /// Returns an error if the store is unusable.
    fn save_code(&self, email: &str, code: &str) -> Result<(), CodeStoreError>;

    /// # Errors
    /// Returns an error if the store is unusable.
    fn state(&self, email: &str) -> Result<CodeState, CodeStoreError>;

    /// Current code for `email`, `None` when no code was ever issued.
    ///
    /// # Errors
    /// Returns an error if the store is unusable.
    fn get_code(&self, email: &str) -> Result<Option<String>, CodeStoreError> {
        Ok(self.state(email)?.code().map(ToString::to_string))
    }

    /// # Errors
    /// Returns an error if the store is unusable.
    fn mark_verified(&self, email: &str) -> Result<(), CodeStoreError>;

    /// # Errors
    /// Returns an error if the store is unusable.
    fn remove(&self, email: &str) -> Result<(), CodeStoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryCodeStore {
    codes: Mutex<HashMap<String, CodeState>>,
}

impl MemoryCodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, CodeState>>, CodeStoreError> {
        self.codes.lock().map_err(|_| CodeStoreError::Poisoned)
    }
}

impl CodeStore for MemoryCodeStore {
    fn save_code(&self, email: &str, code: &str) -> Result<(), CodeStoreError> {
        self.lock()?
            .insert(email.to_string(), CodeState::Pending(code.to_string()));
        Ok(())
    }

    fn state(&self, email: &str) -> Result<CodeState, CodeStoreError> {
        Ok(self.lock()?.get(email).cloned().unwrap_or(CodeState::NoCode))
    }

    fn mark_verified(&self, email: &str) -> Result<(), CodeStoreError> {
        let mut codes = self.lock()?;
        let Some(state) = codes.get_mut(email) else {
            return Ok(());
        };
        if let CodeState::Pending(code) = state {
            let code = std::mem::take(code);
            *state = CodeState::Verified(code);
        }
        Ok(())
    }

    fn remove(&self, email: &str) -> Result<(), CodeStoreError> {
        self.lock()?.remove(email);
        Ok(())
    }
}
