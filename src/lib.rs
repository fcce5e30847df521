//! # Enroll (account onboarding service)
//!
//! `enroll` accepts signups, checks whether an email is already registered and
//! runs an email verification-code flow.
//!
//! ## Signup
//!
//! A signup body is validated field by field, the password is hashed with
//! bcrypt and the user is handed to a [`storage::UserStorage`] backend. The
//! plaintext password never reaches storage and is never logged.
//!
//! ## Storage backends
//!
//! Backends are chosen at startup and are interchangeable behind
//! [`storage::UserStorage`]: an in-memory list, an append-only CSV file, or a
//! `PostgreSQL` table.
//!
//! ## Verification codes
//!
//! `begin_verification` issues a 6-digit code per email and keeps it in an
//! in-process [`onboarding::CodeStore`]; a newer code always replaces the
//! previous one. Codes are not persisted and do not expire.

pub mod api;
pub mod cli;
pub mod onboarding;
pub mod storage;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }
}
