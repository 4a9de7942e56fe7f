mod track;

pub use track::{Track, load_playlist, parse_playlist};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// How playback continues past the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    #[default]
    #[serde(rename = "none")]
    Off,
    /// Repeat the current track
    Single,
    /// Repeat the whole playlist
    List,
}

impl LoopMode {
    /// Cycle through loop modes: Off -> List -> Single -> Off
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::List,
            Self::List => Self::Single,
            Self::Single => Self::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "none",
            Self::Single => "single",
            Self::List => "list",
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoopMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::Off),
            "single" | "one" => Ok(Self::Single),
            "list" | "all" => Ok(Self::List),
            other => Err(format!("unknown loop mode `{other}` (expected none, single or list)")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLoopMode {
    Flag(bool),
    Named(String),
}

impl<'de> Deserialize<'de> for LoopMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawLoopMode::deserialize(deserializer)? {
            RawLoopMode::Flag(false) => Ok(Self::Off),
            RawLoopMode::Flag(true) => Ok(Self::Single),
            RawLoopMode::Named(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// What happens when the media element reports the end of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    /// Single-track repeat, the backend loops natively
    Stay,
    /// Moved to another track
    Advanced(usize),
    /// Wrapped onto the same track (one-track playlist in list mode)
    Restart,
    /// End of playlist
    Stop,
}

/// Playlist position and loop policy
#[derive(Debug, Clone)]
pub struct Transport {
    tracks: Vec<Track>,
    current_index: Option<usize>,
    loop_mode: LoopMode,
    single_loop_wraps: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(LoopMode::Off, true)
    }
}

impl Transport {
    pub fn new(loop_mode: LoopMode, single_loop_wraps: bool) -> Self {
        Self {
            tracks: Vec::new(),
            current_index: None,
            loop_mode,
            single_loop_wraps,
        }
    }

    /// Replace the entire playlist and start from the beginning
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.current_index = if self.tracks.is_empty() { None } else { Some(0) };
    }

    /// Set the current index, returns false when out of range
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current_index = Some(index);
            true
        } else {
            false
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Whether moving past either end wraps around
    pub fn wraps(&self) -> bool {
        match self.loop_mode {
            LoopMode::List => true,
            LoopMode::Single => self.single_loop_wraps && self.tracks.len() > 1,
            LoopMode::Off => false,
        }
    }

    pub fn can_next(&self) -> bool {
        self.current_index
            .and_then(|current| self.next_index(current))
            .is_some_and(|next| Some(next) != self.current_index)
    }

    pub fn can_previous(&self) -> bool {
        self.current_index
            .and_then(|current| self.prev_index(current))
            .is_some_and(|prev| Some(prev) != self.current_index)
    }

    /// Move forward, returns the new index when it changed
    pub fn next(&mut self) -> Option<usize> {
        let current = self.current_index?;
        let next = self.next_index(current).filter(|&i| i != current)?;
        self.current_index = Some(next);
        Some(next)
    }

    /// Move back, returns the new index when it changed
    pub fn previous(&mut self) -> Option<usize> {
        let current = self.current_index?;
        let prev = self.prev_index(current).filter(|&i| i != current)?;
        self.current_index = Some(prev);
        Some(prev)
    }

    pub fn on_track_ended(&mut self) -> EndOutcome {
        let Some(current) = self.current_index else {
            return EndOutcome::Stop;
        };
        if self.loop_mode == LoopMode::Single {
            return EndOutcome::Stay;
        }

        let next = if current + 1 < self.tracks.len() {
            Some(current + 1)
        } else if self.loop_mode == LoopMode::List {
            Some(0)
        } else {
            None
        };

        match next {
            Some(index) if index == current => EndOutcome::Restart,
            Some(index) => {
                self.current_index = Some(index);
                EndOutcome::Advanced(index)
            }
            None => EndOutcome::Stop,
        }
    }

    fn next_index(&self, current: usize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        if current + 1 < self.tracks.len() {
            Some(current + 1)
        } else if self.wraps() {
            Some(0)
        } else {
            None // End of playlist
        }
    }

    fn prev_index(&self, current: usize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        if current > 0 {
            Some(current - 1)
        } else if self.wraps() {
            Some(self.tracks.len() - 1)
        } else {
            None // Start of playlist
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_track(id: &str) -> Track {
        Track {
            name: Some(format!("Track {}", id)),
            author: Some("Artist".to_string()),
            ..Track::new(format!("https://cdn.example/{id}.mp3"))
        }
    }

    fn transport(n: usize, mode: LoopMode) -> Transport {
        let mut t = Transport::new(mode, true);
        t.replace((0..n).map(|i| make_track(&i.to_string())).collect());
        t
    }

    #[test]
    fn test_replace() {
        let mut t = transport(3, LoopMode::Off);
        t.set_current(2);

        t.replace(vec![make_track("a"), make_track("b")]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.current_index(), Some(0));

        t.replace(Vec::new());
        assert_eq!(t.current_index(), None);
        assert!(t.is_empty());
    }

    #[test]
    fn next_stops_at_end_without_loop() {
        let mut t = transport(3, LoopMode::Off);
        t.set_current(2);
        assert_eq!(t.next(), None);
        assert_eq!(t.current_index(), Some(2));
        assert!(!t.can_next());
        assert!(t.can_previous());
    }

    #[test]
    fn next_wraps_in_list_mode() {
        let mut t = transport(3, LoopMode::List);
        t.set_current(2);
        assert_eq!(t.next(), Some(0));
        assert_eq!(t.previous(), Some(2));
    }

    #[test]
    fn previous_stops_at_start() {
        let mut t = transport(3, LoopMode::Off);
        assert_eq!(t.previous(), None);
        assert!(!t.can_previous());
    }

    #[test]
    fn single_mode_wrapping_policy() {
        let mut t = transport(3, LoopMode::Single);
        t.set_current(2);
        assert!(t.wraps());
        assert_eq!(t.next(), Some(0));

        let mut strict = Transport::new(LoopMode::Single, false);
        strict.replace(vec![make_track("a"), make_track("b")]);
        strict.set_current(1);
        assert!(!strict.wraps());
        assert_eq!(strict.next(), None);

        let one = transport(1, LoopMode::Single);
        assert!(!one.wraps());
        assert!(!one.can_next());
    }

    #[test]
    fn track_end_outcomes() {
        let mut t = transport(2, LoopMode::Off);
        assert_eq!(t.on_track_ended(), EndOutcome::Advanced(1));
        assert_eq!(t.on_track_ended(), EndOutcome::Stop);
        assert_eq!(t.current_index(), Some(1));

        t.set_loop_mode(LoopMode::List);
        assert_eq!(t.on_track_ended(), EndOutcome::Advanced(0));

        t.set_loop_mode(LoopMode::Single);
        assert_eq!(t.on_track_ended(), EndOutcome::Stay);
        assert_eq!(t.current_index(), Some(0));

        let mut one = transport(1, LoopMode::List);
        assert_eq!(one.on_track_ended(), EndOutcome::Restart);

        let mut empty = Transport::default();
        assert_eq!(empty.on_track_ended(), EndOutcome::Stop);
    }

    #[test]
    fn set_current_rejects_out_of_range() {
        let mut t = transport(2, LoopMode::Off);
        assert!(!t.set_current(5));
        assert_eq!(t.current_index(), Some(0));
    }

    #[test]
    fn loop_mode_cycle_and_parse() {
        assert_eq!(LoopMode::Off.next(), LoopMode::List);
        assert_eq!(LoopMode::List.next(), LoopMode::Single);
        assert_eq!(LoopMode::Single.next(), LoopMode::Off);
        assert_eq!("LIST".parse::<LoopMode>(), Ok(LoopMode::List));
        assert!("sometimes".parse::<LoopMode>().is_err());
    }

    #[test]
    fn loop_mode_accepts_boolean_alias() {
        #[derive(Deserialize)]
        struct Holder {
            mode: LoopMode,
        }
        let parse = |raw: &str| toml::from_str::<Holder>(raw).map(|h| h.mode);

        assert_eq!(parse("mode = true").unwrap(), LoopMode::Single);
        assert_eq!(parse("mode = false").unwrap(), LoopMode::Off);
        assert_eq!(parse("mode = \"list\"").unwrap(), LoopMode::List);
        assert!(parse("mode = \"bogus\"").is_err());
    }

    #[test]
    fn loop_mode_serializes_lowercase() {
        #[derive(Serialize)]
        struct Holder {
            mode: LoopMode,
        }
        let raw = toml::to_string(&Holder { mode: LoopMode::Off }).unwrap();
        assert_eq!(raw.trim(), "mode = \"none\"");
    }
}
