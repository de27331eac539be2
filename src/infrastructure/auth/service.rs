//! Login, registration, token refresh and identity lookup

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::user::{
    normalize_email, validate_email, validate_password, NewUser, User, UserId, UserRepository,
};
use crate::domain::{
    AuthError, AuthResponse, DomainError, LoginRequest, PasswordError, RefreshTokenRequest,
    RegisterRequest, TokenError, UserResponse,
};
use crate::infrastructure::user::PasswordHasher;

use super::jwt::TokenService;

/// Authentication orchestrator
///
/// Holds no per-request state; every call is independent.
#[derive(Debug)]
pub struct AuthService<R: UserRepository, H: PasswordHasher, T: TokenService> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<R: UserRepository, H: PasswordHasher, T: TokenService> AuthService<R, H, T> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Authenticate with email and password
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = validated_email(&request.email)?;
        validate_password(&request.password).map_err(|e| AuthError::validation(e.to_string()))?;

        let user = match self
            .repository
            .get_by_email(&email)
            .await
            .map_err(|e| directory_failure("login", e))?
        {
            Some(user) => user,
            None => {
                debug!("Login rejected: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        match self.hasher.verify(user.password_hash(), &request.password) {
            Ok(()) => {}
            Err(PasswordError::Hashing(e)) => {
                error!(error = %e, "Password verification failed");
                return Err(AuthError::internal(PasswordError::Hashing(e)));
            }
            Err(_) => {
                debug!(user_id = %user.id(), "Login rejected: wrong password");
                return Err(AuthError::InvalidCredentials);
            }
        }

        info!(user_id = %user.id(), "User logged in");

        self.issue_tokens(&user)
    }

    /// Create an account and sign it in
    ///
    /// Either the user is created and tokens are returned, or nothing is stored.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = validated_email(&request.email)?;
        validate_password(&request.password).map_err(|e| AuthError::validation(e.to_string()))?;

        let existing = self
            .repository
            .get_by_email(&email)
            .await
            .map_err(|e| directory_failure("register", e))?;

        if existing.is_some() {
            debug!("Registration rejected: email already registered");
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = self.hasher.hash(&request.password).map_err(|e| match e {
            PasswordError::EmptyInput => AuthError::validation(e.to_string()),
            other => {
                error!(error = %other, "Password hashing failed");
                AuthError::internal(other)
            }
        })?;

        let user = self
            .repository
            .create(NewUser::new(email, password_hash))
            .await
            .map_err(|e| match e {
                DomainError::Conflict { .. } => AuthError::AlreadyExists,
                other => directory_failure("register", other),
            })?;

        let response = match self.issue_tokens(&user) {
            Ok(response) => response,
            Err(e) => {
                if let Err(cleanup) = self.repository.delete(user.id()).await {
                    error!(user_id = %user.id(), error = %cleanup, "Failed to roll back registration");
                }
                return Err(e);
            }
        };

        info!(user_id = %user.id(), "User registered");

        Ok(response)
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The user is re-read so the new tokens carry the current role.
    pub async fn refresh_token(
        &self,
        request: RefreshTokenRequest,
    ) -> Result<AuthResponse, AuthError> {
        if request.refresh_token.trim().is_empty() {
            return Err(AuthError::validation("Refresh token is required"));
        }

        let subject = self
            .tokens
            .validate_refresh_token(&request.refresh_token)
            .map_err(|e| {
                warn!(error = %e, "Refresh token rejected");
                AuthError::InvalidToken
            })?;

        let user_id = UserId::new(subject).map_err(|e| {
            warn!(error = %e, "Refresh token has a malformed subject");
            AuthError::InvalidToken
        })?;

        let user = self
            .repository
            .get(&user_id)
            .await
            .map_err(|e| directory_failure("refresh", e))?
            .ok_or_else(|| {
                debug!(user_id = %user_id, "Refresh token for unknown user");
                AuthError::InvalidToken
            })?;

        self.issue_tokens(&user)
    }

    /// View of the user an access token was issued to
    pub async fn me(&self, user_id: &str) -> Result<UserResponse, AuthError> {
        let user_id = UserId::new(user_id).map_err(|_| AuthError::NotFound)?;

        self.repository
            .get(&user_id)
            .await
            .map_err(|e| directory_failure("me", e))?
            .as_ref()
            .map(UserResponse::from_user)
            .ok_or(AuthError::NotFound)
    }

    fn issue_tokens(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let access_token = self.tokens.issue_access_token(user).map_err(token_failure)?;
        let refresh_token = self.tokens.issue_refresh_token(user).map_err(token_failure)?;

        Ok(AuthResponse {
            user: UserResponse::from_user(user),
            access_token,
            access_token_expires_in: self.tokens.access_token_ttl(),
            refresh_token,
            refresh_token_expires_in: self.tokens.refresh_token_ttl(),
        })
    }
}

fn validated_email(email: &str) -> Result<String, AuthError> {
    let email = normalize_email(email);
    validate_email(&email).map_err(|e| AuthError::validation(e.to_string()))?;
    Ok(email)
}

fn directory_failure(operation: &'static str, err: DomainError) -> AuthError {
    error!(operation, error = %err, "User directory call failed");
    AuthError::internal(err)
}

fn token_failure(err: TokenError) -> AuthError {
    error!(error = %err, "Token issuance failed");
    AuthError::internal(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MockUserRepository, Role};
    use crate::domain::SharedClaims;
    use crate::infrastructure::auth::jwt::{RsaTokenService, TokenSettings};
    use crate::infrastructure::auth::keys::test_support::test_keys;
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository};
    use chrono::{Duration, Utc};

    type TestService = AuthService<InMemoryUserRepository, Argon2Hasher, RsaTokenService>;

    fn token_service() -> RsaTokenService {
        RsaTokenService::new(TokenSettings::new("identity-api", 3600, 1_296_000), test_keys())
    }

    fn create_service() -> (TestService, Arc<InMemoryUserRepository>) {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = AuthService::new(
            repository.clone(),
            Arc::new(Argon2Hasher::new()),
            Arc::new(token_service()),
        );
        (service, repository)
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_me() {
        let (service, _) = create_service();

        let response = service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap();

        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
        assert_eq!(response.access_token_expires_in, 3600);
        assert_eq!(response.refresh_token_expires_in, 1_296_000);
        assert_eq!(response.user.role, "user");

        let claims = token_service()
            .validate_access_token(&response.access_token)
            .unwrap();
        assert_eq!(claims.subject(), response.user.id);

        let me = service.me(claims.subject()).await.unwrap();
        assert_eq!(me.email, "a@b.com");

        let json = serde_json::to_value(&me).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login() {
        let (service, _) = create_service();
        service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap();

        let response = service.login(login_request("A@B.com ", "s3cret1")).await.unwrap();
        assert_eq!(response.user.email, "a@b.com");
        assert!(token_service()
            .validate_refresh_token(&response.refresh_token)
            .is_ok());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _) = create_service();
        service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap();

        let wrong_password = service
            .login(login_request("a@b.com", "wrong-secret"))
            .await
            .unwrap_err();
        let unknown_email = service
            .login(login_request("nobody@b.com", "s3cret1"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_request_validation() {
        let (service, repository) = create_service();

        let cases = [
            ("", "s3cret1"),
            ("not-an-email", "s3cret1"),
            ("a@b.com", ""),
            ("a@b.com", "   "),
            ("a@b.com", "12345"),
        ];

        for (email, password) in cases {
            let result = service.register(register_request(email, password)).await;
            assert!(
                matches!(result, Err(AuthError::Validation(_))),
                "register({:?}, {:?})",
                email,
                password
            );

            let result = service.login(login_request(email, password)).await;
            assert!(matches!(result, Err(AuthError::Validation(_))));
        }

        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, repository) = create_service();
        service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap();

        let result = service
            .register(register_request("A@b.COM", "another1"))
            .await;

        assert!(matches!(result, Err(AuthError::AlreadyExists)));
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let (service, repository) = create_service();
        let registered = service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap();

        // Promote the user; the refreshed access token must carry the new role
        let user_id = UserId::new(registered.user.id.clone()).unwrap();
        let mut user = repository.get(&user_id).await.unwrap().unwrap();
        user.set_role(Role::Admin);
        repository.update(&user).await.unwrap();

        let refreshed = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: registered.refresh_token,
            })
            .await
            .unwrap();

        assert_eq!(refreshed.user.id, registered.user.id);
        assert_eq!(refreshed.user.role, "admin");

        let claims: SharedClaims = token_service()
            .validate_access_token(&refreshed.access_token)
            .unwrap();
        assert_eq!(claims.role(), Role::Admin);
    }

    #[tokio::test]
    async fn test_refresh_with_expired_token() {
        let (service, repository) = create_service();
        let user = repository
            .create(NewUser::new("a@b.com", "hash"))
            .await
            .unwrap();

        let expired = token_service()
            .issue_refresh_token_at(&user, Utc::now() - Duration::days(16))
            .unwrap();

        let result = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: expired,
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user() {
        let (service, repository) = create_service();
        let registered = service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap();

        let user_id = UserId::new(registered.user.id).unwrap();
        repository.delete(&user_id).await.unwrap();

        let result = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: registered.refresh_token,
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_requires_token() {
        let (service, _) = create_service();

        let result = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: "  ".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let (service, _) = create_service();
        let registered = service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap();

        let result = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: registered.access_token,
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_me_not_found() {
        let (service, _) = create_service();

        let result = service.me(UserId::generate().as_str()).await;
        assert!(matches!(result, Err(AuthError::NotFound)));

        let result = service.me("").await;
        assert!(matches!(result, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn test_directory_failure_is_internal() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_by_email()
            .returning(|_| Err(DomainError::storage("connection refused on 10.0.0.3")));

        let service = AuthService::new(
            Arc::new(repository),
            Arc::new(Argon2Hasher::new()),
            Arc::new(token_service()),
        );

        let err = service
            .login(login_request("a@b.com", "s3cret1"))
            .await
            .unwrap_err();

        assert!(err.is_internal());
        assert!(!err.to_string().contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn test_register_conflict_on_insert() {
        let mut repository = MockUserRepository::new();
        repository.expect_get_by_email().returning(|_| Ok(None));
        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(DomainError::conflict("Email 'a@b.com' already registered")));

        let service = AuthService::new(
            Arc::new(repository),
            Arc::new(Argon2Hasher::new()),
            Arc::new(token_service()),
        );

        let result = service.register(register_request("a@b.com", "s3cret1")).await;
        assert!(matches!(result, Err(AuthError::AlreadyExists)));
    }

    #[derive(Debug)]
    struct BrokenSigner;

    impl TokenService for BrokenSigner {
        fn issue_access_token(&self, _user: &User) -> Result<String, TokenError> {
            Err(TokenError::Signing("key unavailable".to_string()))
        }

        fn issue_refresh_token(&self, _user: &User) -> Result<String, TokenError> {
            Err(TokenError::Signing("key unavailable".to_string()))
        }

        fn validate_access_token(&self, _token: &str) -> Result<SharedClaims, TokenError> {
            Err(TokenError::Malformed)
        }

        fn validate_refresh_token(&self, _token: &str) -> Result<String, TokenError> {
            Err(TokenError::Malformed)
        }

        fn access_token_ttl(&self) -> u64 {
            3600
        }

        fn refresh_token_ttl(&self) -> u64 {
            7200
        }
    }

    #[tokio::test]
    async fn test_register_rolls_back_when_signing_fails() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = AuthService::new(
            repository.clone(),
            Arc::new(Argon2Hasher::new()),
            Arc::new(BrokenSigner),
        );

        let err = service
            .register(register_request("a@b.com", "s3cret1"))
            .await
            .unwrap_err();

        assert!(err.is_internal());
        assert!(repository.is_empty().await);
    }
}
