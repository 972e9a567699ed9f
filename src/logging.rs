//! File-backed logging. The terminal belongs to the interface, so log records
//! go to `~/.config/m1ddctui/m1ddctui.log` (or `--log-file`) instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// `RUST_LOG` wins over `default_level`, which falls back to `info`.
pub fn init(path: &Path, default_level: Option<&str>) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or(default_level.unwrap_or("info")))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("installing logger")?;

    log::info!("m1ddctui {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
