//! Keygate key issuance and validation service.
//!
//! Issues time-limited keys, binds each key to the first device that
//! validates it, and exposes admin endpoints guarded by a shared secret.
//!
//! Usage:
//!   keygate-server --port 3000 --data-dir ./data
//!
//! Every option can also be set through the environment variable shown
//! in `--help`.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use keygate_blobstore::FsBlobStore;
use keygate_license::{KeyLifecycle, KeyStore, KeygateConfig};
use keygate_server::{build_router, spawn_sweeper};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "keygate-server")]
#[command(about = "Keygate key issuance and validation service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Directory holding the key store document
    #[arg(long, env = "KEYGATE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Display name of the gated script
    #[arg(long, env = "SCRIPT_NAME")]
    script_name: Option<String>,

    /// Lifetime of issued keys, in hours
    #[arg(long, env = "KEY_EXPIRY_HOURS")]
    key_expiry_hours: Option<u32>,

    /// Shared secret for admin endpoints
    #[arg(long, env = "ADMIN_KEY", hide_env_values = true)]
    admin_key: Option<String>,

    /// Partner link users are redirected to from /getkey
    #[arg(long, env = "LOOTLABS_LINK")]
    redirect_link: Option<String>,

    /// Community invite link
    #[arg(long, env = "DISCORD_LINK")]
    community_link: Option<String>,

    /// Also sweep expired keys on this interval (seconds); 0 disables
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value = "0")]
    sweep_interval_secs: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> KeygateConfig {
        let defaults = KeygateConfig::default();
        KeygateConfig {
            script_name: self.script_name.clone().unwrap_or(defaults.script_name),
            key_expiry_hours: self
                .key_expiry_hours
                .filter(|h| *h > 0)
                .unwrap_or(defaults.key_expiry_hours),
            admin_secret: self.admin_key.clone().unwrap_or(defaults.admin_secret),
            redirect_link: self.redirect_link.clone().unwrap_or(defaults.redirect_link),
            community_link: self.community_link.clone().unwrap_or(defaults.community_link),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let config = args.config();
    info!("Keygate starting...");
    info!("Script: {}", config.script_name);
    info!("Key duration: {} hours", config.key_expiry_hours);
    if args.admin_key.is_none() {
        warn!("ADMIN_KEY not set, using the built-in default secret");
    }
    if config.is_demo_redirect() {
        warn!("Redirect link not configured, /getkey issues keys directly");
    }

    let blobs = FsBlobStore::new(&args.data_dir);
    info!("Key store directory: {:?}", blobs.root());
    let lifecycle = Arc::new(KeyLifecycle::new(KeyStore::new(Arc::new(blobs)), config));

    if args.sweep_interval_secs > 0 {
        spawn_sweeper(
            lifecycle.clone(),
            Duration::from_secs(args.sweep_interval_secs),
        );
        info!("Periodic sweep every {}s", args.sweep_interval_secs);
    }

    let app = build_router(lifecycle);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("failed to bind port {}", args.port))?;
    info!("Server running on port {}", args.port);

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;
    Ok(())
}
