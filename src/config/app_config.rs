use serde::Deserialize;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub jwt: JwtSettings,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Grace period for in-flight requests after a shutdown signal
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token issuance settings and key file locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    pub issuer: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub access_token_private_key_file: String,
    pub access_token_public_key_file: String,
    pub refresh_token_private_key_file: String,
    pub refresh_token_public_key_file: String,
}

/// User directory storage; without a URL the in-memory directory is used
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Deadline for a single datastore round trip
    pub query_timeout_secs: u64,
}

/// Rejected JWT settings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtSettingsError {
    #[error("jwt.issuer cannot be empty")]
    EmptyIssuer,

    #[error("jwt.{0} must be greater than zero")]
    ZeroLifetime(&'static str),

    #[error("jwt.refresh_token_ttl_secs must be longer than jwt.access_token_ttl_secs")]
    RefreshNotLonger,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            issuer: "identity-api".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 15 * 24 * 3600,
            access_token_private_key_file: "/etc/certs/access-token-private.pem".to_string(),
            access_token_public_key_file: "/etc/certs/access-token-public.pem".to_string(),
            refresh_token_private_key_file: "/etc/certs/refresh-token-private.pem".to_string(),
            refresh_token_public_key_file: "/etc/certs/refresh-token-public.pem".to_string(),
        }
    }
}

impl JwtSettings {
    pub fn validate(&self) -> Result<(), JwtSettingsError> {
        if self.issuer.trim().is_empty() {
            return Err(JwtSettingsError::EmptyIssuer);
        }

        if self.access_token_ttl_secs == 0 {
            return Err(JwtSettingsError::ZeroLifetime("access_token_ttl_secs"));
        }

        if self.refresh_token_ttl_secs == 0 {
            return Err(JwtSettingsError::ZeroLifetime("refresh_token_ttl_secs"));
        }

        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(JwtSettingsError::RefreshNotLonger);
        }

        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connect_timeout_secs: 3,
            query_timeout_secs: 3,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
