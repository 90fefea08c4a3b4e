//! Pulls photos and audio admins send in chat out of Telegram.

use async_trait::async_trait;
use bytes::Bytes;
use teloxide::prelude::*;
use teloxide::types::FileId;
use url::Url;

use tourcore::config;
use tourcore::storage::{IncomingFile, MediaSource};
use tourcore::{AppError, AppResult};

/// Where a local Bot API server keeps downloaded files inside its container.
const LOCAL_API_FILE_PREFIX: &str = "/var/lib/telegram-bot-api/";

/// Builds the download URL of a file resolved with `getFile`.
///
/// A local Bot API server reports absolute paths inside its container; only
/// the part below its data directory is addressable over HTTP.
pub fn build_file_url(base: &Url, token: &str, file_path: &str) -> AppResult<Url> {
    let mut url = base.clone();

    let normalized_path = if base.host_str() != Some("api.telegram.org") {
        file_path.strip_prefix(LOCAL_API_FILE_PREFIX).unwrap_or(file_path)
    } else {
        file_path
    };

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| AppError::Validation("BOT_API_URL cannot be a base URL".to_string()))?;
        segments.pop_if_empty();
        segments.push("file");
        segments.push(&format!("bot{token}"));
        for seg in normalized_path.split('/') {
            if !seg.is_empty() {
                segments.push(seg);
            }
        }
    }

    Ok(url)
}

/// `MediaSource` backed by the Bot API `getFile` method.
#[derive(Clone)]
pub struct TelegramMediaSource {
    bot: Bot,
    client: reqwest::Client,
}

impl TelegramMediaSource {
    pub fn new(bot: Bot) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config::network::timeout())
            .build()?;
        Ok(Self { bot, client })
    }
}

fn too_large(size: u64) -> AppError {
    AppError::Validation(format!(
        "file is {} bytes, the limit is {}",
        size,
        config::media::MAX_DOWNLOAD_BYTES
    ))
}

#[async_trait]
impl MediaSource for TelegramMediaSource {
    async fn download(&self, file: &IncomingFile) -> AppResult<Bytes> {
        if let Some(size) = file.size.filter(|size| *size > config::media::MAX_DOWNLOAD_BYTES) {
            return Err(too_large(size));
        }

        let tg_file = self.bot.get_file(FileId(file.handle.clone())).await?;
        let url = build_file_url(&self.bot.api_url(), self.bot.token(), &tg_file.path)?;

        let mut resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            log::warn!("Telegram file download failed: path={}, status={}", tg_file.path, status);
            return Err(AppError::HttpStatus(status));
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            body.extend_from_slice(&chunk);
            let received = body.len() as u64;
            if received > config::media::MAX_DOWNLOAD_BYTES {
                return Err(too_large(received));
            }
        }

        log::info!("Downloaded {} ({} bytes)", tg_file.path, body.len());
        Ok(Bytes::from(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_api_keeps_relative_path() {
        let base = Url::parse("https://api.telegram.org").unwrap();
        let url = build_file_url(&base, "123:abc", "photos/file_7.jpg").unwrap();
        assert_eq!(url.as_str(), "https://api.telegram.org/file/bot123:abc/photos/file_7.jpg");
    }

    #[test]
    fn local_api_strips_container_prefix() {
        let base = Url::parse("http://bot-api:8081/").unwrap();
        let url = build_file_url(&base, "123:abc", "/var/lib/telegram-bot-api/123:abc/music/file_1.mp3").unwrap();
        assert_eq!(url.as_str(), "http://bot-api:8081/file/bot123:abc/123:abc/music/file_1.mp3");
    }

    #[test]
    fn cannot_be_a_base_urls_are_rejected() {
        let base = Url::parse("mailto:bot@example.org").unwrap();
        assert!(build_file_url(&base, "t", "a.jpg").is_err());
    }

    #[tokio::test]
    async fn oversized_files_are_refused_before_any_request() {
        let source = TelegramMediaSource::new(Bot::new("123:abc")).unwrap();
        let mut file = IncomingFile::new("AgADBAAD");
        file.size = Some(config::media::MAX_DOWNLOAD_BYTES + 1);

        let err = source.download(&file).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
