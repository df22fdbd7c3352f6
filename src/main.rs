//! mocktree - HTTP mock server driven by a directory tree
//!
//! # Usage
//!
//! ```bash
//! # Serve ./mock on the configured port (default 3000)
//! mocktree
//!
//! # Serve a different tree on a different port
//! mocktree --mock-root ./fixtures/mock --port 8080
//! ```

use anyhow::Context;
use clap::Parser;
use mocktree::constants::{
    DEFAULT_MOCK_ROOT, DEFAULT_SERVER_SETTINGS_PATH, DEFAULT_USER_SETTINGS_PATH,
};
use mocktree::dispatcher::MockDispatcher;
use mocktree::registry;
use mocktree::server::MockServer;
use mocktree::settings::{ServerSettings, UserSettingsStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "mocktree")]
#[command(author, version, about = "HTTP mock server driven by a directory tree")]
struct Args {
    /// Directory holding the mock tree
    #[arg(short, long, default_value = DEFAULT_MOCK_ROOT, env = "MOCKTREE_ROOT")]
    mock_root: PathBuf,

    /// Server settings file
    #[arg(long, default_value = DEFAULT_SERVER_SETTINGS_PATH)]
    server_settings: PathBuf,

    /// Per-mock overrides file
    #[arg(long, default_value = DEFAULT_USER_SETTINGS_PATH)]
    user_settings: PathBuf,

    /// Listen port, overriding the settings file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut settings = ServerSettings::from_file(&args.server_settings)
        .with_context(|| format!("Failed to load {}", args.server_settings.display()))?;
    if let Some(port) = args.port {
        settings.http.port = port;
    }

    let routes = registry::discover(&args.mock_root);
    let user_settings = Arc::new(UserSettingsStore::load(&args.user_settings));
    let dispatcher = MockDispatcher::new(routes, user_settings);

    MockServer::new(settings, dispatcher).run().await
}
