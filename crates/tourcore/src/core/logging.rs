//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A summary of the runtime configuration logged once at startup

use anyhow::Result;
use simplelog::*;
use std::path::Path;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// HTTP client internals are filtered out; every Bot API call would otherwise
/// be logged twice at `Info`.
///
/// # Arguments
/// * `log_file_path` - Path to the log file; missing parent directories are created
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    let log_file = fs_err::File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    let log_config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            log_config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, log_config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// Warns about settings that leave the bot half-functional: no admins means
/// nobody can edit content, a missing media root is created on first upload.
pub fn log_startup_configuration() {
    log::info!("Database: {}", *config::DATABASE_PATH);
    log::info!("Media root: {}", *config::MEDIA_ROOT);

    if !Path::new(config::MEDIA_ROOT.as_str()).exists() {
        log::warn!("Media root {} does not exist yet, it will be created on first upload", *config::MEDIA_ROOT);
    }

    if config::admin::ADMIN_IDS.is_empty() {
        log::warn!("ADMIN_IDS is empty: content editing is disabled for everyone");
    } else {
        log::info!("Admins: {:?}", *config::admin::ADMIN_IDS);
    }

    match config::editor::idle_timeout() {
        Some(timeout) => log::info!("Abandoned edits expire after {}s", timeout.as_secs()),
        None => log::info!("Abandoned edits never expire"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn init_logger_creates_nested_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("bot.log");

        // A global logger may already be installed by another test; only the
        // file side effect is asserted.
        let _ = init_logger(path.to_str().unwrap());

        assert!(path.exists());
    }
}
