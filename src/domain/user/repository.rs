//! User directory trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Lookups return `Ok(None)` for a missing record so callers can tell
/// "not found" apart from a transport failure. Callers cancel an in-flight
/// call by dropping its future.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their (normalized) email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Get every user whose ID is in `ids`; unknown IDs are skipped
    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError>;

    /// Persist a new user and return it with its assigned ID
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Replace an existing user
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// Delete a user, returning whether it existed
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> Result<(), DomainError>;
}
