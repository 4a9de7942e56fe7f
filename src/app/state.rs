use std::collections::HashMap;
use std::time::Duration;

use super::actions::TimerKind;
use crate::config::Config;
use crate::gesture::{Bounds, GestureTracker};
use crate::lyrics::{LyricCursor, LyricDocument, LyricResolver};
use crate::player::PlaybackClock;
use crate::presentation::{
    ControlsVisibility, LyricLine, Orientation, Rotation, Snapshot, format_time, poster_label,
};
use crate::queue::Transport;

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

/// Delays the reducer schedules timers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub seek_settle: Duration,
    pub auto_hide: Duration,
    pub ready_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            seek_settle: Duration::from_millis(300),
            auto_hide: Duration::from_millis(1000),
            ready_timeout: Duration::from_millis(5000),
        }
    }
}

/// Document of the current track and the request that produced it
#[derive(Debug, Clone, Default)]
pub struct LyricsState {
    pub(super) document: LyricDocument,
    pub(super) resolver: LyricResolver,
    /// Id of the latest fetch; results tagged otherwise are stale
    pub(super) request: u64,
    pub(super) loading: bool,
}

impl LyricsState {
    pub fn document(&self) -> &LyricDocument {
        &self.document
    }

    pub fn cursor(&self) -> LyricCursor {
        self.resolver.cursor()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Tokens of the timers currently armed
#[derive(Debug, Clone, Default)]
pub(super) struct ArmedTimers {
    next_token: u64,
    armed: HashMap<TimerKind, u64>,
}

impl ArmedTimers {
    pub(super) fn arm(&mut self, timer: TimerKind) -> u64 {
        self.next_token += 1;
        self.armed.insert(timer, self.next_token);
        self.next_token
    }

    pub(super) fn disarm(&mut self, timer: TimerKind) -> bool {
        self.armed.remove(&timer).is_some()
    }

    /// Consumes the timer when `token` is the armed one
    pub(super) fn fire(&mut self, timer: TimerKind, token: u64) -> bool {
        if self.armed.get(&timer) == Some(&token) {
            self.armed.remove(&timer);
            true
        } else {
            false
        }
    }
}

/// The whole player state. Only changed through [`AppState::reduce`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub should_quit: bool,
    pub(super) fullpage: bool,
    pub(super) transport: Transport,
    pub(super) clock: PlaybackClock,
    /// Issue `Play` once the loading track is ready
    pub(super) resume_on_ready: bool,
    pub(super) lyrics: LyricsState,
    pub(super) gestures: GestureTracker,
    /// Player area for hover tracking
    pub(super) player_bounds: Option<Bounds>,
    pub(super) rotation: Rotation,
    pub(super) orientation: Orientation,
    pub(super) controls: ControlsVisibility,
    pub(super) timers: ArmedTimers,
    pub(super) timings: Timings,
    pub toast: Option<Toast>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Transport::default(), PlaybackClock::default(), Timings::default())
    }
}

impl AppState {
    pub fn new(transport: Transport, clock: PlaybackClock, timings: Timings) -> Self {
        Self {
            should_quit: false,
            fullpage: false,
            transport,
            clock,
            resume_on_ready: false,
            lyrics: LyricsState::default(),
            gestures: GestureTracker::new(),
            player_bounds: None,
            rotation: Rotation::default(),
            orientation: Orientation::default(),
            controls: ControlsVisibility::default(),
            timers: ArmedTimers::default(),
            timings,
            toast: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let transport = Transport::new(cfg.player.loop_mode, cfg.player.single_loop_wraps);
        let volume = f64::from(cfg.player.volume.min(100)) / 100.0;
        let clock = PlaybackClock::new(volume, cfg.player.muted);
        let timings = Timings {
            seek_settle: Duration::from_millis(cfg.player.seek_settle_ms),
            auto_hide: Duration::from_millis(cfg.ui.auto_hide_ms),
            ready_timeout: Duration::from_millis(cfg.player.ready_timeout_ms),
        };
        let mut state = Self::new(transport, clock, timings);
        state.fullpage = cfg.ui.fullpage;
        state
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn lyrics(&self) -> &LyricsState {
        &self.lyrics
    }

    pub fn fullpage(&self) -> bool {
        self.fullpage
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.visible()
    }

    pub fn snapshot(&self) -> Snapshot {
        let track = self.transport.current_track();
        let duration = self.clock.duration().unwrap_or(0.0);
        let cursor = self.lyrics.cursor();
        let line = |index: Option<usize>| {
            index
                .and_then(|i| self.lyrics.document.get(i))
                .map(|e| LyricLine {
                    text: e.text.clone(),
                    kind: e.kind,
                })
        };

        Snapshot {
            track_name: track.map(|t| t.display_name().to_string()),
            track_author: track.and_then(|t| t.author.clone()),
            poster: track.and_then(|t| t.poster.as_deref()).and_then(poster_label),
            track_position: self
                .transport
                .current_index()
                .map(|i| (i + 1, self.transport.len())),
            progress: self.clock.progress(),
            current_label: format_time(self.clock.current_time(), duration),
            duration_label: format_time(duration, duration),
            active_index: cursor.active,
            active_lyric: line(cursor.active),
            previous_lyric: line(cursor.previous),
            lyrics_loading: self.lyrics.loading,
            loading: self.clock.is_loading(),
            is_playing: self.clock.is_playing(),
            volume_percent: self.clock.volume_percent(),
            muted: self.clock.muted(),
            loop_mode: self.transport.loop_mode(),
            can_next: self.transport.can_next(),
            can_previous: self.transport.can_previous(),
            orientation: self.orientation,
            rotation: self.rotation.degrees(),
            controls_visible: self.controls.visible(),
            fullpage: self.fullpage,
            notice: self.toast.as_ref().map(|t| t.message.clone()),
        }
    }
}
