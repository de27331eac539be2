//! Storage plumbing for the PostgreSQL user directory

pub mod migrations;
mod postgres;

pub use migrations::{user_migrations, Migration, PostgresMigrator};
pub use postgres::PostgresConfig;
