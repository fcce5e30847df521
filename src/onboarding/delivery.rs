//! Out-of-band delivery of verification codes.
//!
//! Real SMS or email delivery plugs in behind [`CodeSender`]. The default
//! [`LogCodeSender`] only writes the code to the operator log.

use anyhow::Result;
use tracing::info;

/// Code delivery abstraction used by the onboarding flow.
pub trait CodeSender: Send + Sync {
    /// Deliver `code` to `email`.
    ///
    /// # Errors
    /// Returns an error if delivery failed; the code stays stored regardless.
    fn send(&self, email: &str, code: &str) -> Result<()>;
}

/// Stand-in sender that logs the code instead of delivering it.
///
/// Telemetry keeps this module at `INFO` regardless of the verbosity flag.
#[derive(Clone, Debug)]
pub struct LogCodeSender;

impl CodeSender for LogCodeSender {
    fn send(&self, email: &str, code: &str) -> Result<()> {
        info!(email = %email, code = %code, "verification code issued");
        Ok(())
    }
}
