//! Authentication domain
//!
//! Claims capability, token kinds, the error taxonomy, and the request and
//! response shapes of the Login / Register / Refresh / Me operations.

mod claims;
mod dto;
mod error;

pub use claims::{Claims, SharedClaims, TokenKind};
pub use dto::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse};
pub use error::{AuthError, PasswordError, TokenError};
