//! Email verification-code flow.
//!
//! Per email the flow moves `NoCode → Pending → Verified`. A wrong code keeps
//! the pending code; a new `begin_verification` always replaces the current
//! code, whatever state the email was in. There is no attempt counter and no
//! expiry.

pub mod delivery;
pub mod store;

use rand::Rng;
use std::{ops::Range, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, instrument};

pub use delivery::{CodeSender, LogCodeSender};
pub use store::{CodeState, CodeStore, CodeStoreError, MemoryCodeStore};

/// Codes are drawn uniformly from this half-open range (99,999 values).
pub const CODE_RANGE: Range<u32> = 600_000..699_999;

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("verification code store failure: {0}")]
    Store(#[from] CodeStoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// No code was issued for the email (or it was consumed).
    NoCode,
    Mismatch,
    Matched,
}

#[must_use]
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(CODE_RANGE).to_string()
}

/// Issues and checks verification codes.
pub struct Onboarding {
    store: Arc<dyn CodeStore>,
    sender: Arc<dyn CodeSender>,
    consume_on_success: bool,
}

impl Onboarding {
    #[must_use]
    pub fn new(store: Arc<dyn CodeStore>, sender: Arc<dyn CodeSender>) -> Self {
        Self {
            store,
            sender,
            consume_on_success: false,
        }
    }

    /// Drop the code after the first successful match instead of keeping it reusable.
    #[must_use]
    pub fn with_consume_on_success(mut self, consume: bool) -> Self {
        self.consume_on_success = consume;
        self
    }

    /// # Errors
    /// Returns an error if the code store is unusable.
    pub fn state(&self, email: &str) -> Result<CodeState, OnboardingError> {
        Ok(self.store.state(email)?)
    }

    /// Generate a fresh code for `email`, replace any pending one and hand it to the sender.
    ///
    /// # Errors
    /// Returns an error if the code could not be stored. Delivery failures are
    /// only logged, since the stored code is still valid.
    #[instrument(skip(self))]
    pub fn begin_verification(&self, email: &str) -> Result<(), OnboardingError> {
        let code = generate_code();

        self.store.save_code(email, &code)?;

        if let Err(err) = self.sender.send(email, &code) {
            error!(operation = "begin_verification", email = %email, error = %err, "Failed to deliver verification code");
        }

        Ok(())
    }

    /// # Errors
    /// Returns an error if the code store is unusable.
    #[instrument(skip(self, code))]
    pub fn verify_code(&self, email: &str, code: &str) -> Result<VerifyOutcome, OnboardingError> {
        let Some(expected) = self.store.get_code(email)? else {
            return Ok(VerifyOutcome::NoCode);
        };

        if expected != code {
            debug!("verification code mismatch");
            return Ok(VerifyOutcome::Mismatch);
        }

        if self.consume_on_success {
            self.store.remove(email)?;
        } else {
            self.store.mark_verified(email)?;
        }

        Ok(VerifyOutcome::Matched)
    }
}
