use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::queue::LoopMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub player: PlayerConfig,
    pub lyrics: LyricsConfig,
    pub ui: UiConfig,
    pub paths: PathsConfig,
    /// Deprecation notices from parsing, logged once logging is up
    #[serde(skip)]
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// mpv audio device name (see `mpv --audio-device=help`)
    pub audio_device: Option<String>,
    /// Volume level (0-100)
    pub volume: u8,
    pub muted: bool,
    /// `none`, `single` or `list`
    #[serde(alias = "loop")]
    pub loop_mode: LoopMode,
    /// Whether `single` still wraps around the ends of a multi-track playlist
    /// when skipping with next/previous.
    pub single_loop_wraps: bool,
    /// Start playing as soon as the playlist is loaded
    pub autoplay: bool,
    pub ready_timeout_ms: u64,
    pub seek_settle_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Raw documents kept in memory
    pub memory_cache_entries: usize,
    /// Keep downloaded lyrics in the sqlite cache
    pub persist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub mouse: bool,
    pub auto_hide_ms: u64,
    /// Animation frames per second
    pub frame_rate: u32,
    /// Start with the lyrics taking the whole screen
    pub fullpage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            audio_device: None,
            volume: 80,
            muted: false,
            loop_mode: LoopMode::Off,
            single_loop_wraps: true,
            autoplay: true,
            ready_timeout_ms: 5000,
            seek_settle_ms: 300,
        }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("aurora/{}", env!("CARGO_PKG_VERSION")),
            memory_cache_entries: 32,
            persist: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mouse: true,
            auto_hide_ms: 1000,
            frame_rate: 30,
            fullpage: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "aurora", "aurora");
        let data_dir = proj
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("aurora"));
        Self { data_dir }
    }
}

impl PathsConfig {
    pub fn cache_db(&self) -> PathBuf {
        self.data_dir.join("cache.sqlite3")
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("aurora.log")
    }

    pub fn mpv_log(&self) -> PathBuf {
        self.data_dir.join("mpv.log")
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    write_config(cfg, &path)
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "aurora", "aurora").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = Config::default();
        write_config(&cfg, &path)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    parse(&raw).with_context(|| format!("parse {}", path.display()))
}

pub fn parse(raw: &str) -> anyhow::Result<Config> {
    let mut cfg = toml::from_str::<Config>(raw)?;
    cfg.notices = deprecations(raw);
    Ok(cfg)
}

fn deprecations(raw: &str) -> Vec<String> {
    let Ok(table) = raw.parse::<toml::Table>() else {
        return Vec::new();
    };
    let Some(player) = table.get("player").and_then(|p| p.as_table()) else {
        return Vec::new();
    };
    ["loop", "loop_mode"]
        .into_iter()
        .filter(|key| player.get(*key).is_some_and(toml::Value::is_bool))
        .map(|key| format!("player.{key} as a boolean is deprecated, use \"none\", \"single\" or \"list\""))
        .collect()
}

fn write_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}
