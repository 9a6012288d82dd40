//! karmad - Karaoke madlib tools
//!
//! Startup order:
//! 1. Parse arguments and load the TOML config (defaults if missing)
//! 2. Initialize logging from `RUST_LOG` or the configured level
//! 3. Resolve the root folder and create its directory layout
//! 4. Run the requested command

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use karmad_cli::{commands, AppContext, Args};
use karmad_common::config::{self, LoggingConfig, Paths, RootFolderResolver};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = config::load_or_default(args.config.as_deref());

    init_tracing(&toml_config.logging)?;

    info!(
        "karmad v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new()
        .with_toml_config(&toml_config)
        .with_cli_arg(args.root_folder.clone())
        .resolve();
    let paths = Paths::resolve(&root_folder, &toml_config);
    let ctx = Arc::new(AppContext::new(paths)?);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(ctx, args.command, &mut out).await
}

/// Log to stderr, or to the configured file, filtered by `RUST_LOG` when set
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}
