//! In-memory user directory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{normalize_email, NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, User>,
    /// Normalized email -> user ID
    email_index: HashMap<String, String>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .email_index
            .get(&normalize_email(email))
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let inner = self.inner.read().await;

        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id.as_str()))
            .cloned()
            .collect())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        if new_user.password_hash.is_empty() {
            return Err(DomainError::validation("Password hash cannot be empty"));
        }

        let mut inner = self.inner.write().await;
        let email = normalize_email(&new_user.email);

        if inner.email_index.contains_key(&email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already registered",
                email
            )));
        }

        let user = NewUser { email, ..new_user }.into_user(UserId::generate());
        let id = user.id().as_str().to_string();

        inner.email_index.insert(user.email().to_string(), id.clone());
        inner.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let id = user.id().as_str().to_string();

        let old_email = match inner.users.get(&id) {
            Some(existing) => normalize_email(existing.email()),
            None => return Err(DomainError::not_found(format!("User '{}' not found", id))),
        };
        let new_email = normalize_email(user.email());

        // If the email changed, check uniqueness and move the index entry
        if old_email != new_email {
            if inner.email_index.contains_key(&new_email) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already registered",
                    new_email
                )));
            }

            inner.email_index.remove(&old_email);
            inner.email_index.insert(new_email, id.clone());
        }

        inner.users.insert(id, user.clone());

        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;

        match inner.users.remove(id.as_str()) {
            Some(user) => {
                inner.email_index.remove(&normalize_email(user.email()));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser::new(email, "hashed_password")
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let repo = InMemoryUserRepository::new();

        let user = repo.create(new_user("a@b.com")).await.unwrap();
        assert!(!user.id().as_str().is_empty());

        let retrieved = repo.get(user.id()).await.unwrap();
        assert_eq!(retrieved.unwrap().email(), "a@b.com");
    }

    #[tokio::test]
    async fn test_get_by_email_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("Mixed@Case.COM")).await.unwrap();

        assert_eq!(user.email(), "mixed@case.com");

        let retrieved = repo.get_by_email("MIXED@case.com").await.unwrap();
        assert_eq!(retrieved.unwrap().id(), user.id());

        let not_found = repo.get_by_email("other@case.com").await.unwrap();
        assert!(not_found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("a@b.com")).await.unwrap();

        let result = repo.create(new_user("A@B.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_password_hash_rejected() {
        let repo = InMemoryUserRepository::new();

        let result = repo.create(NewUser::new("a@b.com", "")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(new_user("a@b.com")).await.unwrap();
        let b = repo.create(new_user("b@b.com")).await.unwrap();

        let found = repo
            .get_many(&[a.id().clone(), UserId::generate(), b.id().clone()])
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(repo.get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_moves_email_index() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(new_user("old@b.com")).await.unwrap();

        user.set_email("new@b.com");
        repo.update(&user).await.unwrap();

        assert!(repo.get_by_email("old@b.com").await.unwrap().is_none());
        assert!(repo.get_by_email("new@b.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_conflict_and_missing() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("taken@b.com")).await.unwrap();
        let mut user = repo.create(new_user("mine@b.com")).await.unwrap();

        user.set_email("taken@b.com");
        let result = repo.update(&user).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));

        let ghost = new_user("ghost@b.com").into_user(UserId::generate());
        let result = repo.update(&ghost).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("a@b.com")).await.unwrap();

        assert!(repo.delete(user.id()).await.unwrap());
        assert!(!repo.delete(user.id()).await.unwrap());

        assert!(repo.get(user.id()).await.unwrap().is_none());
        assert!(repo.get_by_email("a@b.com").await.unwrap().is_none());
    }
}
