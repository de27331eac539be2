//! User lookup endpoints for other services

use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireClaims;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::UserResponse;

/// Create the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new().route("/lookup", post(lookup))
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub users: Vec<UserResponse>,
}

/// Resolve a batch of user IDs; unknown and malformed IDs are left out
///
/// POST /users/lookup
pub async fn lookup(
    State(state): State<AppState>,
    _claims: RequireClaims,
    Json(request): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    let users = state.user_service.users_by_ids(&request.ids).await?;
    Ok(Json(LookupResponse { users }))
}
