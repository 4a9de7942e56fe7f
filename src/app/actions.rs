use std::time::Duration;

use crate::gesture::Bounds;
use crate::lyrics::LyricDocument;
use crate::player::{MediaCommand, SeekTarget};
use crate::queue::{LoopMode, Track};

/// Inputs to [`AppState::reduce`](super::state::AppState::reduce)
#[derive(Debug, Clone)]
pub enum Action {
    Quit,

    // Playlist / transport
    SetPlaylist(Vec<Track>),
    LoadTrack(usize),
    Next,
    Previous,
    Play,
    Pause,
    TogglePlay,
    SetLoopMode(LoopMode),
    CycleLoopMode,

    // Media element reports
    /// `generation` is the tag of the load that became ready, when known
    MediaReady {
        generation: Option<u64>,
        duration: Option<f64>,
    },
    TimeUpdate { seconds: f64 },
    DurationChanged { seconds: f64 },
    Ended,
    MediaError(String),
    MediaWarning(String),

    // Seek / volume
    Seek(SeekTarget),
    SeekBy(f64),
    SetVolume(f64),
    VolumeBy(f64),
    SetMuted(bool),
    ToggleMute,

    // Pointer
    Layout(LayoutBounds),
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// The pointer is back over the player (terminal focus gained)
    PointerEnter,
    PointerLeave,

    // Lyrics
    LyricsLoaded { request: u64, document: LyricDocument },
    LyricsFailed { request: u64, error: String },

    TimerFired { timer: TimerKind, token: u64 },
    AnimationFrame,

    // Host
    Resize { width: f64, height: f64 },
    SetFullpage(bool),
    Escape,
    DismissToast,
}

/// Where the interactive parts of the player ended up on screen
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutBounds {
    /// Whole player area, used for hover tracking
    pub player: Option<Bounds>,
    pub progress: Option<Bounds>,
    pub volume: Option<Bounds>,
}

/// Side effects requested by the reducer, executed by the host
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Media(MediaCommand),
    FetchLyrics { request: u64, track: Track },
    StartTimer { timer: TimerKind, token: u64, after: Duration },
    CancelTimer(TimerKind),
    /// Ask the host to leave (or enter) full page mode
    FullpageChange(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Clears the loading flag after a seek
    SeekSettle,
    /// Hides the controls after the pointer left
    AutoHide,
    /// Gives up on a track that never became ready
    ReadyTimeout,
}
