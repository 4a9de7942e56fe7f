//! Maps playback time to the active lyric line

use super::parser::{LyricDocument, LyricEntry};

/// Active line and the one shown before it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LyricCursor {
    pub active: Option<usize>,
    pub previous: Option<usize>,
}

/// Tracks the active entry across time ticks.
///
/// `previous` only moves when `active` changes, so resolving the same time
/// twice leaves the cursor untouched.
#[derive(Debug, Clone, Default)]
pub struct LyricResolver {
    cursor: LyricCursor,
}

impl LyricResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> LyricCursor {
        self.cursor
    }

    pub fn resolve(&mut self, time: f64, document: &LyricDocument) -> LyricCursor {
        let active = active_index(time, document.entries());
        if active != self.cursor.active {
            self.cursor.previous = self.cursor.active;
            self.cursor.active = active;
        }
        self.cursor
    }

    /// Forget the cursor, used when the document is swapped out
    pub fn reset(&mut self) {
        self.cursor = LyricCursor::default();
    }
}

/// Index of the last entry whose time is `<= time`
pub fn active_index(time: f64, entries: &[LyricEntry]) -> Option<usize> {
    if time.is_nan() {
        return None;
    }
    entries.partition_point(|e| e.time <= time).checked_sub(1)
}
