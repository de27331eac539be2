//! CLI module for the identity API
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API
//! - `keygen`: write the RSA key pairs used to sign tokens

pub mod keygen;
pub mod serve;

use clap::{Parser, Subcommand};

/// Identity API - user authentication and signed token issuance
#[derive(Parser)]
#[command(name = "identity-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Generate access and refresh token key pairs
    Keygen(keygen::KeygenArgs),
}
