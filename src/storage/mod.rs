use anyhow::Context;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS lyrics_cache (
  url TEXT PRIMARY KEY,
  content TEXT NOT NULL,
  fetched_at INTEGER NOT NULL
);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    /// Cache the raw lyric text fetched from `url`
    pub fn cache_lyrics(&self, url: &str, content: &str, now_unix: i64) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
INSERT INTO lyrics_cache(url, content, fetched_at)
VALUES(?1, ?2, ?3)
ON CONFLICT(url) DO UPDATE SET
  content=excluded.content,
  fetched_at=excluded.fetched_at
"#,
                params![url, content, now_unix],
            )
            .context("cache lyrics")?;
        Ok(())
    }

    /// Get cached lyrics
    pub fn get_lyrics(&self, url: &str) -> anyhow::Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT content FROM lyrics_cache WHERE url=?1")
            .context("prepare lyrics cache")?;
        let mut rows = stmt.query(params![url]).context("query lyrics cache")?;
        if let Some(row) = rows.next().context("read lyrics cache row")? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    /// Drop every cached document, returns how many were removed
    pub fn clear_lyrics(&self) -> anyhow::Result<usize> {
        self.conn
            .execute("DELETE FROM lyrics_cache", [])
            .context("clear lyrics cache")
    }
}

/// Cloneable handle to the database file. Every call opens its own
/// connection and blocks, so call it from `spawn_blocking`.
#[derive(Clone, Debug)]
pub struct StorageHandle {
    path: PathBuf,
}

impl StorageHandle {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_lyrics(&self, url: &str) -> anyhow::Result<Option<String>> {
        Storage::open(&self.path)?.get_lyrics(url)
    }

    pub fn cache_lyrics(&self, url: &str, content: &str, now_unix: i64) -> anyhow::Result<()> {
        Storage::open(&self.path)?.cache_lyrics(url, content, now_unix)
    }

    pub fn clear_lyrics(&self) -> anyhow::Result<usize> {
        Storage::open(&self.path)?.clear_lyrics()
    }
}
