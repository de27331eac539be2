//! Authentication error taxonomy

use thiserror::Error;

/// Failures while issuing or validating a signed token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token subject is empty")]
    EmptySubject,

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token uses an unexpected signing algorithm")]
    WrongAlgorithm,

    #[error("token issuer does not match")]
    IssuerMismatch,

    #[error("token has expired")]
    Expired,

    #[error("refresh token has no identifier")]
    MissingJti,

    #[error("token is not of the expected kind")]
    WrongKind,

    #[error("authorization header is missing")]
    MissingHeader,

    #[error("authorization header must have the form 'Bearer <token>'")]
    MalformedHeader,

    #[error("invalid key material: {0}")]
    KeyMaterial(String),
}

/// Failures of the credential verifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password is empty")]
    EmptyInput,

    #[error("password does not match")]
    Mismatch,

    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// Failure of a Login / Register / Refresh / Me operation
///
/// `Display` never includes collaborator detail; `Internal` keeps the cause
/// reachable through `source()` for logging.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    NotFound,

    #[error("Internal error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Internal(source.into())
    }

    /// Whether the failure is attributable to the service rather than the caller
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::error::Error as _;

    #[test]
    fn test_internal_hides_detail_but_keeps_source() {
        let err = AuthError::internal(DomainError::storage("connection refused on 10.0.0.3"));

        assert_eq!(err.to_string(), "Internal error");
        assert!(err.is_internal());

        let source = err.source().unwrap();
        assert!(source.to_string().contains("connection refused"));
    }

    #[test]
    fn test_credentials_message_is_ambiguous() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
