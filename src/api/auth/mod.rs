//! Authentication API endpoints
//!
//! Login, registration, token refresh and the current user's profile.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use crate::api::middleware::RequireClaims;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/refresh-token", post(refresh_token))
        .route("/me", get(me))
}

/// Login with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}

/// Create an account
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.auth_service.register(request).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new token pair
///
/// POST /auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.auth_service.refresh_token(request).await?;
    Ok(Json(response))
}

/// Profile of the authenticated user
///
/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    RequireClaims(claims): RequireClaims,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.me(claims.subject()).await?;
    Ok(Json(user))
}
