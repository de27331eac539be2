//! Error responses of the identity API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, DomainError, TokenError};

/// Broad class of an error, serialized as `error.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    NotFoundError,
    ConflictError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error body: `{ "error": { "message", "type", "code" } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    pub code: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error_type: ApiErrorType,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: code.into(),
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiErrorType::InvalidRequestError,
            "validation_error",
            message,
        )
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorType::AuthenticationError,
            code,
            message,
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ApiErrorType::NotFoundError,
            "not_found",
            message,
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            ApiErrorType::ConflictError,
            "already_exists",
            message,
        )
    }

    /// Internal failures never expose their cause
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorType::ServerError,
            "internal_error",
            "Internal error",
        )
    }

    pub fn code(&self) -> &str {
        &self.response.error.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Validation(message) => Self::bad_request(message),
            AuthError::InvalidCredentials => {
                Self::unauthorized("invalid_credentials", err.to_string())
            }
            AuthError::AlreadyExists => Self::conflict(err.to_string()),
            AuthError::InvalidToken => Self::unauthorized("invalid_token", err.to_string()),
            AuthError::NotFound => Self::not_found(err.to_string()),
            AuthError::Internal(_) => Self::internal(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingHeader => Self::unauthorized("missing_authorization", err.to_string()),
            TokenError::MalformedHeader => {
                Self::unauthorized("malformed_authorization", err.to_string())
            }
            TokenError::Expired => Self::unauthorized("token_expired", err.to_string()),
            TokenError::Signing(_) | TokenError::KeyMaterial(_) => Self::internal(),
            _ => Self::unauthorized("invalid_token", err.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::Storage { .. } => Self::internal(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_codes() {
        let cases = [
            (AuthError::validation("bad email"), StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::AlreadyExists, StatusCode::CONFLICT),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (
                AuthError::internal(DomainError::storage("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::from(AuthError::internal(DomainError::storage(
            "password authentication failed for user postgres",
        )));

        let json = serde_json::to_string(&err.response).unwrap();
        assert!(!json.contains("postgres"));
        assert!(json.contains("internal_error"));

        let err = ApiError::from(DomainError::storage("pool timed out"));
        assert_eq!(err.response.error.message, "Internal error");
    }

    #[test]
    fn test_token_error_mapping() {
        let err = ApiError::from(TokenError::Expired);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "token_expired");

        assert_eq!(ApiError::from(TokenError::MissingHeader).code(), "missing_authorization");
        assert_eq!(ApiError::from(TokenError::BadSignature).code(), "invalid_token");
        assert_eq!(ApiError::from(TokenError::WrongAlgorithm).code(), "invalid_token");
        assert_eq!(
            ApiError::from(TokenError::Signing("x".into())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::from(AuthError::InvalidCredentials);
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "authentication_error");
        assert_eq!(json["error"]["code"], "invalid_credentials");
        assert_eq!(json["error"]["message"], "Invalid email or password");
    }
}
