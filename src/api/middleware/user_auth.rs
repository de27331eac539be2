//! Bearer access token authentication

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{SharedClaims, TokenError};
use crate::infrastructure::auth::TokenService;

/// Extractor that requires a valid access token
///
/// The token is read from the `Authorization: Bearer <token>` header. Only
/// claims that passed every validation check reach the handler.
#[derive(Debug, Clone)]
pub struct RequireClaims(pub SharedClaims);

impl FromRequestParts<AppState> for RequireClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(&parts.headers, state.token_service.as_ref()).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            ApiError::from(e)
        })?;

        Ok(RequireClaims(claims))
    }
}

/// Validate the bearer token carried by a request's headers
pub fn authenticate(
    headers: &HeaderMap,
    tokens: &dyn TokenService,
) -> Result<SharedClaims, TokenError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| TokenError::MalformedHeader))
        .transpose()?;

    tokens.extract_from_authorization_header(header)
}
