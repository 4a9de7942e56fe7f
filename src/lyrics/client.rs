//! Lyric text fetcher
//!
//! A lyric source is either an `http(s)://` URL or a local path (a `file://`
//! prefix is accepted). Raw text is kept in a small in-memory LRU so that
//! switching back and forth between tracks does not hit the network again.

use anyhow::Context;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use crate::config::LyricsConfig;

/// Where a lyric source points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricSource<'a> {
    Remote(&'a str),
    Local(&'a str),
}

impl<'a> LyricSource<'a> {
    pub fn classify(source: &'a str) -> Self {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Remote(source)
        } else {
            Self::Local(source.strip_prefix("file://").unwrap_or(source))
        }
    }

    pub fn is_remote(self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

#[derive(Debug, Clone)]
pub struct LyricsClient {
    client: reqwest::Client,
    memory: Arc<Mutex<LruCache<String, String>>>,
}

impl LyricsClient {
    pub fn new(cfg: &LyricsConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .context("build http client")?;
        let capacity = NonZeroUsize::new(cfg.memory_cache_entries).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            client,
            memory: Arc::new(Mutex::new(LruCache::new(capacity))),
        })
    }

    /// Fetch the raw text behind a lyric source
    pub async fn fetch_text(&self, source: &str) -> anyhow::Result<String> {
        if let Some(hit) = self.cached(source) {
            debug!(source, "lyrics memory cache hit");
            return Ok(hit);
        }

        let text = match LyricSource::classify(source) {
            LyricSource::Remote(url) => self.fetch_remote(url).await?,
            LyricSource::Local(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("read lyrics file {path}"))?,
        };

        if let Ok(mut memory) = self.memory.lock() {
            memory.put(source.to_string(), text.clone());
        }
        Ok(text)
    }

    fn cached(&self, source: &str) -> Option<String> {
        self.memory.lock().ok()?.get(source).cloned()
    }

    async fn fetch_remote(&self, url: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("lyrics request failed: {status}");
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            && !is_text_content_type(content_type)
        {
            anyhow::bail!("lyrics response is not text ({content_type})");
        }

        response.text().await.context("read lyrics body")
    }
}

/// Media payloads are rejected; anything else may be LRC
fn is_text_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    !["image/", "audio/", "video/", "font/"]
        .iter()
        .any(|prefix| essence.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_sources() {
        assert_eq!(
            LyricSource::classify("https://example.com/a.lrc"),
            LyricSource::Remote("https://example.com/a.lrc")
        );
        assert_eq!(
            LyricSource::classify("file:///music/a.lrc"),
            LyricSource::Local("/music/a.lrc")
        );
        assert_eq!(LyricSource::classify(" a.lrc "), LyricSource::Local("a.lrc"));
        assert!(!LyricSource::classify("http.lrc").is_remote());
    }

    #[test]
    fn content_types() {
        assert!(is_text_content_type("text/plain; charset=utf-8"));
        assert!(is_text_content_type("application/octet-stream"));
        assert!(is_text_content_type("application/x-lrc"));
        assert!(!is_text_content_type("image/png"));
        assert!(!is_text_content_type("Audio/MPEG"));
    }

    #[tokio::test]
    async fn reads_local_files_through_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.lrc");
        std::fs::write(&path, "[00:01.00]hi").unwrap();
        let source = format!("file://{}", path.display());

        let client = LyricsClient::new(&LyricsConfig::default()).unwrap();
        assert_eq!(client.fetch_text(&source).await.unwrap(), "[00:01.00]hi");

        // Served from memory once the file is gone
        std::fs::remove_file(&path).unwrap();
        assert_eq!(client.fetch_text(&source).await.unwrap(), "[00:01.00]hi");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let client = LyricsClient::new(&LyricsConfig::default()).unwrap();
        assert!(client.fetch_text("/definitely/not/here.lrc").await.is_err());
    }
}
