//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::UserRepository;
use crate::domain::{
    AuthError, AuthResponse, DomainError, LoginRequest, RefreshTokenRequest, RegisterRequest,
    UserResponse,
};
use crate::infrastructure::auth::{AuthService, TokenService};
use crate::infrastructure::user::{PasswordHasher, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub token_service: Arc<dyn TokenService>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<dyn AuthServiceTrait>,
        user_service: Arc<dyn UserServiceTrait>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            token_service,
        }
    }
}

/// Trait for the authentication orchestrator
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError>;
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError>;
    async fn refresh_token(&self, request: RefreshTokenRequest)
    -> Result<AuthResponse, AuthError>;
    async fn me(&self, user_id: &str) -> Result<UserResponse, AuthError>;
}

/// Trait for user lookups
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn users_by_ids(&self, ids: &[String]) -> Result<Vec<UserResponse>, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R, H, T> AuthServiceTrait for AuthService<R, H, T>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenService + 'static,
{
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        AuthService::login(self, request).await
    }

    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        AuthService::register(self, request).await
    }

    async fn refresh_token(
        &self,
        request: RefreshTokenRequest,
    ) -> Result<AuthResponse, AuthError> {
        AuthService::refresh_token(self, request).await
    }

    async fn me(&self, user_id: &str) -> Result<UserResponse, AuthError> {
        AuthService::me(self, user_id).await
    }
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn users_by_ids(&self, ids: &[String]) -> Result<Vec<UserResponse>, DomainError> {
        UserService::users_by_ids(self, ids).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        UserService::ping(self).await
    }
}
