use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: excursions.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "excursions.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Root directory of the local media store (photos, audio guides, location shots)
/// Read from MEDIA_ROOT environment variable
/// Default: media
pub static MEDIA_ROOT: Lazy<String> = Lazy::new(|| env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()));

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub(crate) fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });
}

/// Editing workflow configuration
pub mod editor {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Default idle time after which an abandoned edit is discarded (1 hour)
    pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 3600;

    /// Read from EDITOR_IDLE_TIMEOUT_SECS environment variable; `0` disables expiry
    pub static IDLE_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("EDITOR_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS)
    });

    /// Returns the idle timeout, or `None` when expiry is disabled
    pub fn idle_timeout() -> Option<Duration> {
        match *IDLE_TIMEOUT_SECS {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Media storage configuration
pub mod media {
    /// Largest inbound file the bot will pull from Telegram (20 MB, the Bot API download cap)
    pub const MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;

    /// Longest file name kept when storing an upload (after sanitising)
    pub const MAX_FILE_NAME_LEN: usize = 64;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for Bot API requests and media downloads (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Local Bot API server support
pub mod bot_api {
    /// Returns the BOT_API_URL environment variable if set.
    pub fn get_url() -> Option<String> {
        std::env::var("BOT_API_URL").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_ids_with_mixed_separators() {
        assert_eq!(admin::parse_admin_ids("1, 2\n3\tx,,-4"), vec![1, 2, 3, -4]);
        assert!(admin::parse_admin_ids("").is_empty());
    }

    #[test]
    fn network_timeout_matches_constant() {
        assert_eq!(network::timeout(), Duration::from_secs(network::REQUEST_TIMEOUT_SECS));
    }
}
