//! PostgreSQL user directory implementation

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::warn;

use crate::domain::user::{normalize_email, NewUser, Role, User, UserId, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, avatar, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
///
/// Every round trip is bounded by the configured query timeout.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: &str, query: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(|e| {
                warn!(operation, error = %e, "User query failed");
                DomainError::storage(format!("Failed to {}: {}", operation, e))
            }),
            Err(_) => {
                warn!(operation, timeout = ?self.query_timeout, "User query timed out");
                Err(DomainError::storage(format!(
                    "Timed out trying to {} after {:?}",
                    operation, self.query_timeout
                )))
            }
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = self
            .bounded(
                "get user",
                sqlx::query(&sql).bind(id.as_str()).fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE LOWER(email) = $1", USER_COLUMNS);
        let row = self
            .bounded(
                "get user by email",
                sqlx::query(&sql)
                    .bind(normalize_email(email))
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let sql = format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY created_at",
            USER_COLUMNS
        );
        let rows = self
            .bounded(
                "get users",
                sqlx::query(&sql).bind(&ids).fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(row_to_user).collect()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        if new_user.password_hash.is_empty() {
            return Err(DomainError::validation("Password hash cannot be empty"));
        }

        let email = normalize_email(&new_user.email);
        let user = NewUser { email, ..new_user }.into_user(UserId::generate());

        let insert = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role,
                               avatar, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.role().as_str())
        .bind(user.avatar())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool);

        match tokio::time::timeout(self.query_timeout, insert).await {
            Ok(Ok(_)) => Ok(user),
            Ok(Err(e)) if is_unique_violation(&e) => Err(DomainError::conflict(format!(
                "Email '{}' already registered",
                user.email()
            ))),
            Ok(Err(e)) => {
                warn!(error = %e, "User insert failed");
                Err(DomainError::storage(format!("Failed to create user: {}", e)))
            }
            Err(_) => Err(DomainError::storage(format!(
                "Timed out trying to create user after {:?}",
                self.query_timeout
            ))),
        }
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let update = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, first_name = $4, last_name = $5,
                role = $6, avatar = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(user.id().as_str())
        .bind(normalize_email(user.email()))
        .bind(user.password_hash())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.role().as_str())
        .bind(user.avatar())
        .bind(user.updated_at())
        .execute(&self.pool);

        let result = match tokio::time::timeout(self.query_timeout, update).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) if is_unique_violation(&e) => {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already registered",
                    user.email()
                )))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "User update failed");
                return Err(DomainError::storage(format!("Failed to update user: {}", e)));
            }
            Err(_) => {
                return Err(DomainError::storage(format!(
                    "Timed out trying to update user after {:?}",
                    self.query_timeout
                )))
            }
        };

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = self
            .bounded(
                "delete user",
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id.as_str())
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.bounded(
            "ping database",
            sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool),
        )
        .await
        .map(|_| ())
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: String = row.get("id");
    let role: String = row.get("role");

    let user_id = UserId::new(&id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let role = Role::parse(&role)
        .ok_or_else(|| DomainError::storage(format!("Invalid role in database: '{}'", role)))?;

    let new_user = NewUser {
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role,
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    };

    Ok(new_user.into_user(user_id))
}
