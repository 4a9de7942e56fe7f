//! Synchronized lyrics
//!
//! This module provides:
//! - LRC format parser
//! - Resolver mapping playback time to the active line
//! - Fetcher for remote and local lyric files, with memory and sqlite caches

pub mod client;
pub mod parser;
pub mod resolver;

pub use client::{LyricSource, LyricsClient};
pub use parser::{EntryKind, LyricDocument, LyricEntry, MetadataTag};
pub use resolver::{LyricCursor, LyricResolver};

use crate::queue::Track;
use crate::storage::StorageHandle;
use tracing::{debug, warn};

/// Fetch and parse the lyrics of a track.
///
/// Remote sources are looked up in the sqlite cache first and stored there
/// after a successful download. A track without a lyric source yields an
/// empty document.
pub async fn load_document(
    client: &LyricsClient,
    cache: Option<StorageHandle>,
    track: &Track,
) -> anyhow::Result<LyricDocument> {
    let Some(source) = track.lyrics_url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    else {
        return Ok(LyricDocument::default());
    };
    let cache = cache.filter(|_| LyricSource::classify(source).is_remote());

    if let Some(storage) = cache.clone()
        && let Ok(Ok(Some(raw))) = tokio::task::spawn_blocking({
            let source = source.to_string();
            move || storage.get_lyrics(&source)
        })
        .await
    {
        debug!(source, "lyrics cache hit");
        return Ok(document_for(track, &raw));
    }

    let raw = client.fetch_text(source).await?;

    if let Some(storage) = cache {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let stored = tokio::task::spawn_blocking({
            let source = source.to_string();
            let raw = raw.clone();
            move || storage.cache_lyrics(&source, &raw, now)
        })
        .await;
        if let Ok(Err(e)) = stored {
            warn!(source, "failed to cache lyrics: {e:#}");
        }
    }

    Ok(document_for(track, &raw))
}

fn document_for(track: &Track, raw: &str) -> LyricDocument {
    LyricDocument::parse(raw).with_track_metadata(track.name.as_deref(), track.author.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LyricsConfig;

    #[tokio::test]
    async fn local_file_gets_track_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.lrc");
        std::fs::write(&path, "[00:05.00]Hello").unwrap();

        let track = Track {
            name: Some("Song".into()),
            author: Some("Band".into()),
            lyrics_url: Some(path.display().to_string()),
            ..Track::new("a.mp3")
        };
        let client = LyricsClient::new(&LyricsConfig::default()).unwrap();
        let doc = load_document(&client, None, &track).await.unwrap();

        let texts: Vec<_> = doc.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Song", "Band", "Hello"]);
    }

    #[tokio::test]
    async fn missing_source_is_empty() {
        let client = LyricsClient::new(&LyricsConfig::default()).unwrap();
        let doc = load_document(&client, None, &Track::new("a.mp3")).await.unwrap();
        assert!(doc.is_empty());
    }

    #[tokio::test]
    async fn remote_source_served_from_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageHandle::new(dir.path().join("cache.sqlite3"));
        let url = "https://lyrics.invalid/song.lrc";
        storage.cache_lyrics(url, "[ti:Cached]\n[00:01.00]line", 1).unwrap();

        let track = Track {
            lyrics_url: Some(url.into()),
            ..Track::new("song.mp3")
        };
        let client = LyricsClient::new(&LyricsConfig::default()).unwrap();
        let doc = load_document(&client, Some(storage), &track).await.unwrap();
        assert_eq!(doc.entries()[0].text, "Cached");
        assert_eq!(doc.len(), 2);
    }
}
