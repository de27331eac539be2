//! User infrastructure module
//!
//! This module provides the credential verifier (Argon2), the in-memory and
//! PostgreSQL user directories, and bulk user lookups.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::UserService;
