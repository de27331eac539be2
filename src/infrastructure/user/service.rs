//! User lookups for other services

use std::sync::Arc;

use tracing::debug;

use crate::domain::user::{UserId, UserRepository};
use crate::domain::{DomainError, UserResponse};

/// Read-only access to user records, returned as public views
#[derive(Debug)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Resolve a batch of user IDs
    ///
    /// IDs that are not well formed are skipped. Unknown IDs are absent from
    /// the result. No storage round trip happens when nothing is left to look up.
    pub async fn users_by_ids(&self, ids: &[String]) -> Result<Vec<UserResponse>, DomainError> {
        let user_ids: Vec<UserId> = ids
            .iter()
            .filter_map(|id| match UserId::new(id.as_str()) {
                Ok(user_id) => Some(user_id),
                Err(e) => {
                    debug!(id = %id, error = %e, "Skipping malformed user ID");
                    None
                }
            })
            .collect();

        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.repository.get_many(&user_ids).await?;

        Ok(users.iter().map(UserResponse::from_user).collect())
    }

    /// Check that the user directory is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MockUserRepository, NewUser};
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    #[tokio::test]
    async fn test_users_by_ids() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let a = repository
            .create(NewUser::new("a@b.com", "hash").with_name("Ada", "Lovelace"))
            .await
            .unwrap();
        let b = repository.create(NewUser::new("b@b.com", "hash")).await.unwrap();

        let service = UserService::new(repository);

        let ids = vec![
            a.id().to_string(),
            "not an id!".to_string(),
            b.id().to_string(),
            UserId::generate().to_string(),
        ];
        let views = service.users_by_ids(&ids).await.unwrap();

        assert_eq!(views.len(), 2);
        assert!(views.iter().any(|v| v.email == "a@b.com" && v.first_name == "Ada"));
        assert!(views.iter().any(|v| v.email == "b@b.com"));
    }

    #[tokio::test]
    async fn test_empty_input_skips_storage() {
        let mut repository = MockUserRepository::new();
        repository.expect_get_many().never();

        let service = UserService::new(Arc::new(repository));

        assert!(service.users_by_ids(&[]).await.unwrap().is_empty());

        let invalid = vec!["".to_string(), "-bad".to_string()];
        assert!(service.users_by_ids(&invalid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_many()
            .times(1)
            .returning(|_| Err(DomainError::storage("connection reset")));

        let service = UserService::new(Arc::new(repository));

        let result = service.users_by_ids(&[UserId::generate().to_string()]).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
