//! File-based logging kept off the terminal so it cannot disturb the TUI.
//!
//! Writes to daily-rotated files under the XDG state directory. The filter
//! comes from `RUST_LOG` and defaults to "info".

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Result, anyhow};
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

// Keeps the non-blocking appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

pub fn init() -> Result<()> {
    let dir = log_dir()?;
    let appender = rolling::daily(&dir, "pulseviz.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow!("logging already initialized"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("logging to {}", dir.display());
    Ok(())
}

fn log_dir() -> Result<PathBuf> {
    let dir = if let Ok(state) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(state).join("pulseviz")
    } else {
        dirs::home_dir()
            .ok_or_else(|| anyhow!("could not determine home directory"))?
            .join(".local/state/pulseviz")
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
