//! User registration and email availability.

pub mod hasher;
pub mod validation;

use crate::storage::{StorageError, UserStorage};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub use hasher::{HashError, PasswordHasher};
pub use validation::{EmailCheck, FieldErrors};

use validation::{require, valid_email, MIN_PASSWORD_LEN, RULE_EMAIL, RULE_MIN};

/// A persisted account. `password` always holds the bcrypt hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("city", &self.city)
            .field("country", &self.country)
            .field("password", &"***")
            .finish()
    }
}

/// Signup body as received on the wire; absent fields become empty strings.
#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("city", &self.city)
            .field("country", &self.country)
            .field("password", &"***")
            .finish()
    }
}

impl SignupRequest {
    /// Check every field and turn the request into a [`Registration`].
    ///
    /// # Errors
    /// Returns every violated field with its rule tag.
    pub fn validate(self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::default();

        require(&mut errors, "name", &self.name);
        if require(&mut errors, "email", &self.email) && !valid_email(&self.email) {
            errors.add("email", RULE_EMAIL);
        }
        require(&mut errors, "city", &self.city);
        require(&mut errors, "country", &self.country);
        if require(&mut errors, "password", &self.password)
            && self.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.add("password", RULE_MIN);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Registration {
            name: self.name,
            email: self.email,
            city: self.city,
            country: self.country,
            password: SecretString::from(self.password),
        })
    }
}

/// A validated signup whose password is still plaintext.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub password: SecretString,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to hash password: {0}")]
    Hashing(#[from] HashError),
    #[error("failed to store user: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of an email availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Invalid,
    Taken,
    Available,
}

/// Validates, hashes and persists new accounts.
pub struct Registrar {
    storage: Arc<dyn UserStorage>,
    hasher: PasswordHasher,
    email_check: EmailCheck,
}

impl Registrar {
    #[must_use]
    pub fn new(storage: Arc<dyn UserStorage>, hasher: PasswordHasher) -> Self {
        Self {
            storage,
            hasher,
            email_check: EmailCheck::default(),
        }
    }

    #[must_use]
    pub fn with_email_check(mut self, email_check: EmailCheck) -> Self {
        self.email_check = email_check;
        self
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn UserStorage> {
        &self.storage
    }

    /// Hash the password, then persist the user.
    ///
    /// # Errors
    /// Returns [`RegistrationError::Hashing`] or [`RegistrationError::Storage`].
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<User, RegistrationError> {
        let Registration {
            name,
            email,
            city,
            country,
            password,
        } = registration;

        let password = self.hasher.hash_blocking(password).await?;

        let user = User {
            name,
            email,
            city,
            country,
            password,
        };

        self.storage.create_user(&user).await?;

        debug!(storage = self.storage.kind(), "user created");

        Ok(user)
    }

    /// # Errors
    /// Returns an error if the storage lookup fails.
    #[instrument(skip(self))]
    pub async fn check_email_available(&self, email: &str) -> Result<Availability, StorageError> {
        if !self.email_check.accepts(email) {
            return Ok(Availability::Invalid);
        }

        match self.storage.get_user_by_email(email).await? {
            Some(_) => Ok(Availability::Taken),
            None => Ok(Availability::Available),
        }
    }
}
