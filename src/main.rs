use clap::Parser;
use identity_api::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Keygen(args) => cli::keygen::run(args).await,
    }
}
