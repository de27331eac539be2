//! Domain layer - Core identity entities and rules

pub mod auth;
pub mod error;
pub mod user;

pub use auth::{
    AuthError, AuthResponse, Claims, LoginRequest, PasswordError, RefreshTokenRequest,
    RegisterRequest, SharedClaims, TokenError, TokenKind, UserResponse,
};
pub use error::DomainError;
pub use user::{NewUser, Role, User, UserId, UserRepository, UserValidationError};
