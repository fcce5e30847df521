//! Pluggable persistence for user records.
//!
//! Callers depend only on [`UserStorage`]; the concrete backend is picked at
//! startup. The interface does not deduplicate: a caller that needs "email
//! already taken" semantics must look the email up first.

pub mod csv_file;
pub mod memory;
pub mod postgres;

use crate::users::User;
use async_trait::async_trait;
use thiserror::Error;

pub use csv_file::CsvFileStorage;
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("storage task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Persist a new user; returns once the backend considers the write durable.
    async fn create_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch the first user registered with `email`, `Ok(None)` if there is none.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Liveness probe used by `/health`.
    async fn health(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Backend name for logs and health output.
    fn kind(&self) -> &'static str;
}

/// Backend selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Csv,
    Postgres,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "csv" => Ok(Self::Csv),
            "postgres" => Ok(Self::Postgres),
            other => Err(format!("invalid storage backend: {other}")),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Csv => "csv",
            Self::Postgres => "postgres",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_from_str() {
        assert_eq!("memory".parse::<Backend>(), Ok(Backend::Memory));
        assert_eq!("CSV".parse::<Backend>(), Ok(Backend::Csv));
        assert_eq!("postgres".parse::<Backend>(), Ok(Backend::Postgres));
        assert!("redis".parse::<Backend>().is_err());
    }
}
