//! Transport-agnostic request and response shapes

use serde::{Deserialize, Serialize};

use crate::domain::user::User;

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// User view; the password hash has no field here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub avatar: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            email: user.email().to_string(),
            role: user.role().as_str().to_string(),
            avatar: user.avatar().to_string(),
        }
    }
}

/// Successful Login / Register / Refresh result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    /// Access token lifetime in seconds
    pub access_token_expires_in: u64,
    pub refresh_token: String,
    /// Refresh token lifetime in seconds
    pub refresh_token_expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{NewUser, UserId};

    #[test]
    fn test_user_response_has_no_secret() {
        let user = NewUser::new("a@b.com", "$argon2id$secret-hash")
            .into_user(UserId::new("user-1").unwrap());

        let view = UserResponse::from_user(&user);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["role"], "user");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }
}
