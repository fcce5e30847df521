use super::{StorageError, UserStorage};
use crate::users::User;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local backend, used for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: RwLock<Vec<User>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn create_user(&self, user: &User) -> Result<(), StorageError> {
        self.users.write().await.push(user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User {
            name: name.to_string(),
            email: email.to_string(),
            city: "Lagos".to_string(),
            country: "Nigeria".to_string(),
            password: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn lookup_missing_is_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get_user_by_email("ann@x.com").await.unwrap().is_none());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn duplicates_are_kept_and_first_wins() {
        let storage = MemoryStorage::new();
        storage.create_user(&user("Ann", "ann@x.com")).await.unwrap();
        storage.create_user(&user("Other", "ann@x.com")).await.unwrap();

        assert_eq!(storage.len().await, 2);
        let found = storage.get_user_by_email("ann@x.com").await.unwrap().unwrap();
        assert_eq!(found.name, "Ann");
    }
}
