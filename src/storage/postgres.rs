use super::{StorageError, UserStorage};
use crate::users::User;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Connection, PgPool, Row};
use std::time::Duration;
use tracing::{info_span, Instrument};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Relational backend on a `users` table.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `dsn` and make sure the `users` table exists.
    ///
    /// # Errors
    /// Returns an error if the connection or the schema statement fails.
    pub async fn connect(dsn: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await?;

        let storage = Self::new(pool);
        storage.ensure_schema().await?;

        Ok(storage)
    }

    /// # Errors
    /// Returns an error if the schema statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "CREATE",
            db.statement = SCHEMA_SQL
        );
        sqlx::query(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UserStorage for PostgresStorage {
    async fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let query =
            "INSERT INTO users (name, email, city, country, password) VALUES ($1, $2, $3, $4, $5)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.city)
            .bind(&user.country)
            .bind(&user.password)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let query = "SELECT name, email, city, country, password FROM users WHERE email = $1 ORDER BY id LIMIT 1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.map(|row| -> Result<User, StorageError> {
            Ok(User {
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                city: row.try_get("city")?,
                country: row.try_get("country")?,
                password: row.try_get("password")?,
            })
        })
        .transpose()
    }

    async fn health(&self) -> Result<(), StorageError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Runs only against a disposable database named in ENROLL_TEST_DSN.
    async fn storage() -> Option<PostgresStorage> {
        let dsn = std::env::var("ENROLL_TEST_DSN").ok()?;
        match PostgresStorage::connect(&dsn).await {
            Ok(storage) => Some(storage),
            Err(err) => {
                eprintln!("Skipping postgres test: {err}");
                None
            }
        }
    }

    #[test]
    fn schema_creates_users_table() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS users"));
        for column in ["name", "email", "city", "country", "password"] {
            assert!(SCHEMA_SQL.contains(column), "missing column {column}");
        }
    }

    #[tokio::test]
    async fn create_then_lookup() {
        let Some(storage) = storage().await else {
            return;
        };
        let email = format!("{}@example.com", ulid::Ulid::new().to_string().to_lowercase());
        let user = User {
            name: "Ann".to_string(),
            email: email.clone(),
            city: "Lagos".to_string(),
            country: "Nigeria".to_string(),
            password: "$2b$04$hash".to_string(),
        };

        assert!(storage.get_user_by_email(&email).await.unwrap().is_none());
        storage.create_user(&user).await.unwrap();
        assert_eq!(storage.get_user_by_email(&email).await.unwrap(), Some(user));
        assert!(storage.health().await.is_ok());
    }
}
