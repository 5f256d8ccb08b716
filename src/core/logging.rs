use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::config::MonitoringConfig;

/// Installs the global subscriber: console output plus a plain-text copy in
/// the configured log file. `RUST_LOG` wins over `LOG_LEVEL` when set.
pub fn init_logging(config: &MonitoringConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let (directory, file_name) = split_log_path(&config.log_file)?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("Logging initialized at level: {}", config.log_level);
    Ok(())
}

/// Renames `log_file` to `<log_file>_<timestamp>.bak` once it reaches
/// `max_size_bytes`, then prunes backups down to the newest `max_files`.
///
/// Runs once at startup, before the subscriber opens the file. Returns the
/// backups that were removed.
pub fn rotate_log_file(
    log_file: &Path,
    max_size_bytes: u64,
    max_files: usize,
) -> io::Result<Vec<PathBuf>> {
    let size = match fs::metadata(log_file) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    if size < max_size_bytes {
        return Ok(Vec::new());
    }

    let rotated = backup_path(log_file, &Local::now().format("%Y%m%d%H%M%S").to_string());
    fs::rename(log_file, &rotated)?;

    // Timestamps are fixed-width, so lexical order is chronological.
    let mut backups = list_backups(log_file)?;
    backups.sort();

    let mut removed = Vec::new();
    if backups.len() > max_files {
        let excess = backups.len() - max_files;
        for old in backups.into_iter().take(excess) {
            fs::remove_file(&old)?;
            removed.push(old);
        }
    }

    Ok(removed)
}

fn backup_path(log_file: &Path, stamp: &str) -> PathBuf {
    let mut name = log_file.as_os_str().to_owned();
    name.push(format!("_{stamp}.bak"));
    PathBuf::from(name)
}

fn list_backups(log_file: &Path) -> io::Result<Vec<PathBuf>> {
    let directory = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = match log_file.file_name().and_then(|n| n.to_str()) {
        Some(name) => format!("{name}_"),
        None => return Ok(Vec::new()),
    };

    let mut backups = Vec::new();
    for entry in fs::read_dir(&directory)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(&prefix) && n.ends_with(".bak"))
            .unwrap_or(false);
        if matches {
            backups.push(path);
        }
    }
    Ok(backups)
}

fn split_log_path(log_file: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = log_file
        .file_name()
        .with_context(|| format!("LOG_FILE has no file name: {}", log_file.display()))?;
    let directory = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, PathBuf::from(file_name)))
}
