//! Keygen command - writes the four PEM files the server loads at startup

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::auth::{PemKeyPair, MIN_RSA_BITS};
use crate::infrastructure::logging;

pub const ACCESS_PRIVATE_KEY_FILE: &str = "access-token-private.pem";
pub const ACCESS_PUBLIC_KEY_FILE: &str = "access-token-public.pem";
pub const REFRESH_PRIVATE_KEY_FILE: &str = "refresh-token-private.pem";
pub const REFRESH_PUBLIC_KEY_FILE: &str = "refresh-token-public.pem";

#[derive(Debug, Args)]
pub struct KeygenArgs {
    /// Directory to write the PEM files to
    #[arg(long, default_value = "/etc/certs")]
    pub out_dir: PathBuf,

    /// RSA modulus size in bits
    #[arg(long, default_value_t = MIN_RSA_BITS)]
    pub bits: usize,

    /// Overwrite existing key files
    #[arg(long)]
    pub force: bool,
}

pub async fn run(args: KeygenArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init_logging(&config.logging);

    tokio::task::spawn_blocking(move || generate_keys(&args)).await??;
    Ok(())
}

/// Generate independent access and refresh key pairs into `args.out_dir`
pub fn generate_keys(args: &KeygenArgs) -> anyhow::Result<()> {
    let files = [
        ACCESS_PRIVATE_KEY_FILE,
        ACCESS_PUBLIC_KEY_FILE,
        REFRESH_PRIVATE_KEY_FILE,
        REFRESH_PUBLIC_KEY_FILE,
    ];

    if !args.force {
        if let Some(existing) = files.iter().map(|f| args.out_dir.join(f)).find(|p| p.exists()) {
            bail!(
                "{} already exists; pass --force to overwrite",
                existing.display()
            );
        }
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let access = PemKeyPair::generate(args.bits)?;
    let refresh = PemKeyPair::generate(args.bits)?;

    write_key(&args.out_dir.join(ACCESS_PRIVATE_KEY_FILE), &access.private_pem, true)?;
    write_key(&args.out_dir.join(ACCESS_PUBLIC_KEY_FILE), &access.public_pem, false)?;
    write_key(&args.out_dir.join(REFRESH_PRIVATE_KEY_FILE), &refresh.private_pem, true)?;
    write_key(&args.out_dir.join(REFRESH_PUBLIC_KEY_FILE), &refresh.public_pem, false)?;

    info!(dir = %args.out_dir.display(), bits = args.bits, "Wrote token key pairs");

    Ok(())
}

/// Private keys are owner-only before any key material reaches the file
fn write_key(path: &Path, pem: &str, private: bool) -> anyhow::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    if private {
        use std::os::unix::fs::OpenOptionsExt;

        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    // `mode` only applies on creation; an overwritten file keeps its old bits
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::PermissionsExt;

        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict {}", path.display()))?;
    }

    #[cfg(not(unix))]
    let _ = private;

    file.write_all(pem.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
