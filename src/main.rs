use std::path::PathBuf;

use anyhow::Context;
use aurora::{app, config, lyrics, player, queue, storage::StorageHandle, tui};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aurora", version, about = "Terminal audio player with synchronized lyrics")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a playlist in the interactive TUI (default).
    Play(PlayArgs),

    /// Parse a lyric file or URL and print it (headless).
    Lyrics {
        /// Local path, file:// URL or http(s) URL.
        source: String,
        /// Only print the line active at this time (seconds).
        #[arg(long)]
        at: Option<f64>,
    },

    /// Audio output device management (mpv).
    Audio {
        #[command(subcommand)]
        cmd: AudioCommand,
    },

    /// Drop every cached lyric download.
    ClearCache,
}

#[derive(Debug, Default, clap::Args)]
struct PlayArgs {
    /// TOML playlist with [[track]] entries.
    playlist: Option<PathBuf>,
    /// Play a single URL instead of a playlist.
    #[arg(long, conflicts_with = "playlist")]
    url: Option<String>,
    /// Track name for --url.
    #[arg(long, requires = "url")]
    name: Option<String>,
    /// Track author for --url.
    #[arg(long, requires = "url")]
    author: Option<String>,
    /// Lyric source for --url.
    #[arg(long, requires = "url")]
    lyrics: Option<String>,
    /// Loop mode: none, single or list.
    #[arg(long)]
    loop_mode: Option<queue::LoopMode>,
}

#[derive(Debug, Subcommand)]
enum AudioCommand {
    /// List mpv audio devices.
    List,
    /// Set mpv audio device (name as shown in list).
    Set { device: String },
    /// Clear mpv audio device override.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command.unwrap_or(Command::Play(PlayArgs::default())) {
        Command::Play(args) => {
            // The terminal belongs to the UI, so logs go to a file
            init_file_logging(&cfg.paths.log_file())?;
            log_notices(&cfg);
            let tracks = collect_tracks(&args)?;
            tracing::info!(tracks = tracks.len(), "aurora starting");

            let mut app = app::App::new(cfg.clone(), tracks, args.loop_mode)?;
            let mut terminal = tui::TerminalGuard::enter(cfg.ui.mouse).context("init terminal")?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Lyrics { source, at } => {
            init_stderr_logging();
            log_notices(&cfg);
            let client = lyrics::LyricsClient::new(&cfg.lyrics)?;
            let cache = cfg
                .lyrics
                .persist
                .then(|| StorageHandle::new(cfg.paths.cache_db()));
            let mut track = queue::Track::new(source.clone());
            track.lyrics_url = Some(source);
            let doc = lyrics::load_document(&client, cache, &track).await?;

            match at {
                Some(time) => {
                    match lyrics::resolver::active_index(time, doc.entries())
                        .and_then(|i| doc.get(i))
                    {
                        Some(entry) => println!("{}", entry_line(entry)),
                        None => println!("(no line active at {time}s)"),
                    }
                }
                None => {
                    for entry in doc.entries() {
                        println!("{}", entry_line(entry));
                    }
                    eprintln!("{} lines, {} lyrics", doc.len(), doc.lyric_count());
                }
            }
        }
        Command::Audio { cmd } => {
            init_stderr_logging();
            log_notices(&cfg);
            match cmd {
                AudioCommand::List => {
                    let devices = player::mpv::list_audio_devices().await?;
                    if devices.is_empty() {
                        println!("No audio devices reported by mpv.");
                    }
                    for (name, desc) in devices {
                        println!("{name}  ({desc})");
                    }
                }
                AudioCommand::Set { device } => {
                    let mut cfg = cfg;
                    cfg.player.audio_device = Some(device);
                    config::save(&cfg, cli.config.as_deref()).context("save config")?;
                    println!("Updated audio device in config.");
                }
                AudioCommand::Clear => {
                    let mut cfg = cfg;
                    cfg.player.audio_device = None;
                    config::save(&cfg, cli.config.as_deref()).context("save config")?;
                    println!("Cleared audio device override.");
                }
            }
        }
        Command::ClearCache => {
            init_stderr_logging();
            log_notices(&cfg);
            let storage = StorageHandle::new(cfg.paths.cache_db());
            let removed = tokio::task::spawn_blocking(move || storage.clear_lyrics()).await??;
            println!("Removed {removed} cached lyric files.");
        }
    }

    Ok(())
}

fn collect_tracks(args: &PlayArgs) -> anyhow::Result<Vec<queue::Track>> {
    if let Some(url) = &args.url {
        let mut track = queue::Track::new(url.clone());
        track.name = args.name.clone();
        track.author = args.author.clone();
        track.lyrics_url = args.lyrics.clone();
        return Ok(vec![track]);
    }
    match &args.playlist {
        Some(path) => queue::load_playlist(path),
        None => Ok(Vec::new()),
    }
}

fn entry_line(entry: &lyrics::LyricEntry) -> String {
    let tag = entry.lrc_tag();
    match entry.kind {
        lyrics::EntryKind::Lyric => format!("{tag} {}", entry.text),
        lyrics::EntryKind::Metadata(meta) => format!("{tag} {}: {}", meta.label(), entry.text),
    }
}

/// Config parsing runs before a subscriber exists, so its notices wait until here
fn log_notices(cfg: &config::Config) {
    for notice in &cfg.notices {
        tracing::warn!(%notice, "deprecated config");
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aurora=info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn init_file_logging(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}
