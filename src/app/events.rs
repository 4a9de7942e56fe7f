use super::actions::TimerKind;
use crate::lyrics::LyricDocument;

/// Everything that reaches the app loop from spawned tasks
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Player(PlayerEvent),
    Network(NetworkEvent),
    Timer { timer: TimerKind, token: u64 },
    Frame,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize { width: u16, height: u16 },
    Focus(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Current file can play
    /// A file finished loading; `generation` matches the `MediaCommand::Load` tag
    Ready { generation: Option<u64> },
    Position { seconds: f64 },
    Duration { seconds: f64 },
    Ended,
    Error(String),
    /// Non-fatal backend message
    Warning(String),
}

#[derive(Debug, Clone)]
pub enum NetworkEvent {
    LyricsLoaded { request: u64, document: LyricDocument },
    LyricsFailed { request: u64, error: String },
}
