//! Identity API
//!
//! User directory and authentication service:
//! - Email/password registration and login
//! - RS256-signed access and refresh tokens with independent key pairs
//! - Bearer token verification for protected routes
//! - PostgreSQL or in-memory user storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use api::state::AppState;
use domain::UserRepository;
use infrastructure::{
    auth::{AuthService, RsaTokenService, TokenKeys, TokenService, TokenSettings},
    storage::{user_migrations, PostgresConfig, PostgresMigrator},
    user::{Argon2Hasher, InMemoryUserRepository, PasswordHasher, PostgresUserRepository, UserService},
};

/// Create the application state, loading token keys from the configured PEM files
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.jwt.validate().context("invalid jwt settings")?;

    let keys = TokenKeys::load(&config.jwt).context("failed to load token key material")?;

    create_app_state_with_keys(config, keys).await
}

/// Create the application state with already-loaded token keys
pub async fn create_app_state_with_keys(
    config: &AppConfig,
    keys: TokenKeys,
) -> anyhow::Result<AppState> {
    let tokens = Arc::new(RsaTokenService::new(
        TokenSettings::from(&config.jwt),
        keys,
    ));
    let hasher = Arc::new(Argon2Hasher::new());

    match PostgresConfig::from_database_config(&config.database) {
        Some(pg_config) => {
            let pool = pg_config
                .connect()
                .await
                .context("failed to connect to the user database")?;

            PostgresMigrator::new(pool.clone())
                .run(&user_migrations())
                .await
                .context("failed to run user migrations")?;

            info!("Using PostgreSQL user directory");

            let repository = Arc::new(PostgresUserRepository::new(
                pool,
                Duration::from_secs(config.database.query_timeout_secs),
            ));

            Ok(build_app_state(repository, hasher, tokens))
        }
        None => {
            warn!("No database.url configured, users are kept in memory and lost on restart");

            Ok(build_app_state(
                Arc::new(InMemoryUserRepository::new()),
                hasher,
                tokens,
            ))
        }
    }
}

/// Wire services over a user repository, password hasher and token service
pub fn build_app_state<R, H, T>(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> AppState
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenService + 'static,
{
    let auth_service = Arc::new(AuthService::new(
        repository.clone(),
        hasher,
        tokens.clone(),
    ));
    let user_service = Arc::new(UserService::new(repository));

    AppState::new(auth_service, user_service, tokens)
}
