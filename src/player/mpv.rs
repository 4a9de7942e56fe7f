use crate::app::events::{Event, PlayerEvent};
use crate::player::MediaCommand;
use anyhow::Context;
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};
use tracing::{debug, warn};

/// `loadfile` requests carry `LOAD_REQUEST_BASE + generation` as their id
const LOAD_REQUEST_BASE: u64 = 1 << 32;

#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    writer: tokio::sync::Mutex<tokio::io::WriteHalf<UnixStream>>,
    request_id: AtomicU64,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("aurora-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args([
            "--no-video",
            "--idle=yes",
            "--input-terminal=no",
            "--really-quiet",
        ]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn mpv")?;

        // mpv creates the socket shortly after starting
        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        tokio::spawn(read_events_loop(reader, event_tx));

        let this = Self {
            child,
            socket_path,
            writer: tokio::sync::Mutex::new(writer),
            request_id: AtomicU64::new(1),
        };

        this.command(json!({"command":["request_log_messages", "warn"]}))
            .await?;
        this.command(json!({"command":["observe_property", 1, "time-pos"]}))
            .await?;
        this.command(json!({"command":["observe_property", 2, "duration"]}))
            .await?;

        Ok(this)
    }

    /// Run a media command against the mpv instance
    pub async fn execute(&self, cmd: &MediaCommand) -> anyhow::Result<()> {
        debug!(?cmd, "mpv command");
        let v = match cmd {
            MediaCommand::Load { url, generation } => json!({
                "command": ["loadfile", url, "replace"],
                "request_id": LOAD_REQUEST_BASE + generation,
            }),
            MediaCommand::Play => json!({"command":["set_property", "pause", false]}),
            MediaCommand::Pause => json!({"command":["set_property", "pause", true]}),
            MediaCommand::Seek { seconds } => {
                json!({"command":["seek", seconds, "absolute"]})
            }
            MediaCommand::SetVolume { volume } => {
                json!({"command":["set_property", "volume", (volume * 100.0).round()]})
            }
            MediaCommand::SetLoop { enabled } => {
                let value = if *enabled { "inf" } else { "no" };
                json!({"command":["set_property", "loop-file", value]})
            }
        };
        self.command(v).await
    }

    async fn command(&self, mut v: serde_json::Value) -> anyhow::Result<()> {
        // Tag requests so errors come back as structured replies
        if v.get("request_id").is_none() {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            if let serde_json::Value::Object(ref mut o) = v {
                o.insert("request_id".to_string(), serde_json::Value::from(id));
            }
        }
        let mut w = self.writer.lock().await;
        let mut line = serde_json::to_vec(&v).context("encode mpv json")?;
        line.push(b'\n');
        w.write_all(&line).await.context("write mpv ipc")?;
        w.flush().await.context("flush mpv ipc")?;
        Ok(())
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &Path) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e)
                        .with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn read_events_loop(reader: tokio::io::ReadHalf<UnixStream>, event_tx: mpsc::Sender<Event>) {
    let mut lines = BufReader::new(reader).lines();
    let mut loads = LoadTracker::default();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        // Command replies: {"request_id":..., "error":"..."}
        if let (Some(rid), Some(err)) = (v.get("request_id"), v.get("error"))
            && let Some(err_s) = err.as_str()
            && err_s != "success"
        {
            warn!(request_id = %rid, error = err_s, "mpv command failed");
        }
        if let Some(pe) = loads.observe(&v)
            && event_tx.send(Event::Player(pe)).await.is_err()
        {
            break;
        }
    }
    debug!("mpv event stream closed");
}

/// Ties `file-loaded` back to the load that started it.
///
/// The `loadfile` reply names the playlist entry mpv created for a request,
/// `start-file` names the entry being opened, and `file-loaded` (which carries
/// nothing) belongs to the last `start-file`.
#[derive(Debug, Default)]
struct LoadTracker {
    generations: HashMap<i64, u64>,
    loading_entry: Option<i64>,
}

impl LoadTracker {
    fn observe(&mut self, v: &serde_json::Value) -> Option<PlayerEvent> {
        if let Some(rid) = v.get("request_id").and_then(|x| x.as_u64())
            && let Some(generation) = rid.checked_sub(LOAD_REQUEST_BASE)
        {
            if let Some(entry) = v
                .get("data")
                .and_then(|d| d.get("playlist_entry_id"))
                .and_then(|x| x.as_i64())
            {
                self.generations.insert(entry, generation);
            }
            return None;
        }
        match v.get("event").and_then(|x| x.as_str()) {
            Some("start-file") => {
                self.loading_entry = v.get("playlist_entry_id").and_then(|x| x.as_i64());
                None
            }
            Some("file-loaded") => {
                let generation = self.loading_entry.take().and_then(|entry| {
                    let generation = self.generations.remove(&entry);
                    // Entries that never loaded are older than this one
                    self.generations.retain(|&id, _| id > entry);
                    generation
                });
                Some(PlayerEvent::Ready { generation })
            }
            _ => map_mpv_event(v),
        }
    }
}

fn map_mpv_event(v: &serde_json::Value) -> Option<PlayerEvent> {
    match v.get("event")?.as_str()? {
        "property-change" => {
            // `data` is absent while a property is unavailable
            let seconds = v.get("data")?.as_f64()?;
            match v.get("name")?.as_str()? {
                "time-pos" => Some(PlayerEvent::Position { seconds }),
                "duration" => Some(PlayerEvent::Duration { seconds }),
                _ => None,
            }
        }
        "file-loaded" => Some(PlayerEvent::Ready { generation: None }),
        "end-file" => match v.get("reason").and_then(|x| x.as_str()).unwrap_or("") {
            "eof" => Some(PlayerEvent::Ended),
            "error" => {
                let err = v.get("error").and_then(|x| x.as_str()).unwrap_or("unknown");
                Some(PlayerEvent::Error(format!("mpv end-file error: {err}")))
            }
            // stop/quit/redirect happen when we replace the file ourselves
            _ => None,
        },
        "log-message" => {
            let level = v.get("level")?.as_str().unwrap_or("info");
            let text = v.get("text")?.as_str().unwrap_or("").trim();
            if (level == "warn" || level == "error") && !text.is_empty() {
                Some(PlayerEvent::Warning(format!("mpv {level}: {text}")))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Output devices as reported by `mpv --audio-device=help`
pub async fn list_audio_devices() -> anyhow::Result<Vec<(String, String)>> {
    let output = Command::new("mpv")
        .arg("--audio-device=help")
        .output()
        .await
        .context("run mpv --audio-device=help")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_audio_devices(&stdout))
}

fn parse_audio_devices(raw: &str) -> Vec<(String, String)> {
    // Lines look like:  'coreaudio/AppleUSBAudioEngine:...' (USB DAC)
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix('\'')?;
            let (name, tail) = rest.split_once('\'')?;
            let desc = tail.trim().trim_start_matches('(').trim_end_matches(')');
            Some((name.to_string(), desc.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_property_changes() {
        let v = json!({"event":"property-change","id":1,"name":"time-pos","data":12.5});
        assert_eq!(map_mpv_event(&v), Some(PlayerEvent::Position { seconds: 12.5 }));

        let v = json!({"event":"property-change","id":2,"name":"duration","data":180.0});
        assert_eq!(map_mpv_event(&v), Some(PlayerEvent::Duration { seconds: 180.0 }));

        let v = json!({"event":"property-change","id":1,"name":"time-pos"});
        assert_eq!(map_mpv_event(&v), None);
    }

    #[test]
    fn maps_file_lifecycle() {
        assert_eq!(
            map_mpv_event(&json!({"event":"file-loaded"})),
            Some(PlayerEvent::Ready { generation: None })
        );
        assert_eq!(
            map_mpv_event(&json!({"event":"end-file","reason":"eof"})),
            Some(PlayerEvent::Ended)
        );
        assert_eq!(map_mpv_event(&json!({"event":"end-file","reason":"stop"})), None);
        assert!(matches!(
            map_mpv_event(&json!({"event":"end-file","reason":"error","error":"loading failed"})),
            Some(PlayerEvent::Error(msg)) if msg.contains("loading failed")
        ));
    }

    #[test]
    fn maps_log_messages() {
        let v = json!({"event":"log-message","level":"warn","prefix":"ffmpeg","text":"bad frame\n"});
        assert_eq!(
            map_mpv_event(&v),
            Some(PlayerEvent::Warning("mpv warn: bad frame".into()))
        );
        let v = json!({"event":"log-message","level":"info","prefix":"cplayer","text":"hi"});
        assert_eq!(map_mpv_event(&v), None);
        assert_eq!(map_mpv_event(&json!({"request_id":3,"error":"success"})), None);
    }

    #[test]
    fn file_loaded_carries_load_generation() {
        let mut loads = LoadTracker::default();
        let reply = |generation: u64, entry: i64| {
            json!({
                "request_id": LOAD_REQUEST_BASE + generation,
                "error": "success",
                "data": {"playlist_entry_id": entry},
            })
        };

        assert_eq!(loads.observe(&reply(1, 10)), None);
        assert_eq!(loads.observe(&reply(2, 11)), None);
        loads.observe(&json!({"event":"start-file","playlist_entry_id":10}));
        assert_eq!(
            loads.observe(&json!({"event":"file-loaded"})),
            Some(PlayerEvent::Ready { generation: Some(1) })
        );
        loads.observe(&json!({"event":"start-file","playlist_entry_id":11}));
        assert_eq!(
            loads.observe(&json!({"event":"file-loaded"})),
            Some(PlayerEvent::Ready { generation: Some(2) })
        );
        assert!(loads.generations.is_empty());
    }

    #[test]
    fn untagged_file_loaded_without_entry_ids() {
        let mut loads = LoadTracker::default();
        // Older mpv replies to loadfile without data
        assert_eq!(
            loads.observe(&json!({"request_id": LOAD_REQUEST_BASE + 1, "error": "success"})),
            None
        );
        loads.observe(&json!({"event":"start-file"}));
        assert_eq!(
            loads.observe(&json!({"event":"file-loaded"})),
            Some(PlayerEvent::Ready { generation: None })
        );
        assert_eq!(
            loads.observe(&json!({"event":"end-file","reason":"eof"})),
            Some(PlayerEvent::Ended)
        );
    }

    #[test]
    fn parses_device_listing() {
        let raw = "List of detected audio devices:\n  'auto' (Autoselect device)\n  'pulse/sink' (Speakers)\n";
        let devices = parse_audio_devices(raw);
        assert_eq!(
            devices,
            vec![
                ("auto".to_string(), "Autoselect device".to_string()),
                ("pulse/sink".to_string(), "Speakers".to_string()),
            ]
        );
    }
}
