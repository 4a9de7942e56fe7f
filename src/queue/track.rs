use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One playable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Audio URL or local path handed to the media backend
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    /// LRC source (URL or path)
    #[serde(default, alias = "lyrics", skip_serializing_if = "Option::is_none")]
    pub lyrics_url: Option<String>,
}

impl Track {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            author: None,
            poster: None,
            lyrics_url: None,
        }
    }

    /// Name for display, falling back to the last path segment of the url
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name;
        }
        let trimmed = self.url.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistFile {
    #[serde(default, rename = "track")]
    tracks: Vec<Track>,
}

/// Parse a TOML playlist made of `[[track]]` tables
pub fn parse_playlist(raw: &str) -> anyhow::Result<Vec<Track>> {
    let file: PlaylistFile = toml::from_str(raw).context("parse playlist")?;
    Ok(file.tracks)
}

pub fn load_playlist(path: &Path) -> anyhow::Result<Vec<Track>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_playlist(&raw).with_context(|| format!("load playlist {}", path.display()))
}
