//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, JwtSettings, JwtSettingsError, LogFormat, LoggingConfig,
    ServerConfig,
};
