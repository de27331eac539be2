//! User domain
//!
//! This module provides domain types and traits for identity records,
//! including user entities, validation, and the directory trait.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, Role, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    normalize_email, validate_email, validate_password, validate_user_id,
    UserValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
