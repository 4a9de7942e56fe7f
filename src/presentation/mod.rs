//! State derived for whoever renders the player

use crate::lyrics::parser::EntryKind;
use crate::queue::LoopMode;

/// Degrees added per animation frame
pub const ROTATION_STEP: f64 = 0.2;
const ROTATION_WRAP: f64 = 3600.0;

/// Cover rotation angle in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation(f64);

impl Rotation {
    pub fn degrees(self) -> f64 {
        self.0
    }

    /// Advance one frame. Frozen while paused or loading.
    pub fn advance(&mut self, playing: bool, loading: bool) -> bool {
        if !playing || loading {
            return false;
        }
        self.0 += ROTATION_STEP;
        if self.0 > ROTATION_WRAP {
            self.0 -= ROTATION_WRAP;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn from_size(width: f64, height: f64) -> Self {
        if width >= height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    pub fn is_landscape(self) -> bool {
        self == Self::Landscape
    }
}

/// Whether transport controls are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlsVisibility {
    visible: bool,
    pointer_inside: bool,
}

impl Default for ControlsVisibility {
    fn default() -> Self {
        Self {
            visible: true,
            pointer_inside: false,
        }
    }
}

impl ControlsVisibility {
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    /// Returns true when a pending auto-hide must be cancelled
    pub fn pointer_enter(&mut self) -> bool {
        let was_inside = self.pointer_inside;
        self.pointer_inside = true;
        self.visible = true;
        !was_inside
    }

    /// Returns true when the auto-hide timer should start
    pub fn pointer_leave(&mut self, playing: bool) -> bool {
        let was_inside = self.pointer_inside;
        self.pointer_inside = false;
        was_inside && playing
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Auto-hide timer fired
    pub fn auto_hide(&mut self) {
        if !self.pointer_inside {
            self.visible = false;
        }
    }
}

/// `MM:SS`, or `HH:MM:SS` once the track is longer than an hour
pub fn format_time(seconds: f64, duration: f64) -> String {
    if !seconds.is_finite() {
        return "00:00".into();
    }
    let long = duration.is_finite() && duration > 3600.0;

    let total = seconds.max(0.0).floor() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if long {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{:02}:{s:02}", total / 60)
    }
}

/// Short name for a poster reference: its last path segment
pub fn poster_label(poster: &str) -> Option<String> {
    let path = poster.split(['?', '#']).next().unwrap_or_default();
    let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    (!name.trim().is_empty()).then(|| name.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    pub text: String,
    pub kind: EntryKind,
}

/// Everything the view needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub track_name: Option<String>,
    pub track_author: Option<String>,
    pub poster: Option<String>,
    pub track_position: Option<(usize, usize)>,
    /// 0-100
    pub progress: f64,
    pub current_label: String,
    pub duration_label: String,
    pub active_index: Option<usize>,
    pub active_lyric: Option<LyricLine>,
    pub previous_lyric: Option<LyricLine>,
    pub lyrics_loading: bool,
    pub loading: bool,
    pub is_playing: bool,
    pub volume_percent: u8,
    pub muted: bool,
    pub loop_mode: LoopMode,
    pub can_next: bool,
    pub can_previous: bool,
    pub orientation: Orientation,
    pub rotation: f64,
    pub controls_visible: bool,
    pub fullpage: bool,
    pub notice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_and_freezes() {
        let mut r = Rotation(3599.9);
        assert!(r.advance(true, false));
        assert!((r.degrees() - 0.1).abs() < 1e-6);

        let before = r;
        assert!(!r.advance(false, false));
        assert!(!r.advance(true, true));
        assert_eq!(r, before);
    }

    #[test]
    fn rotation_accumulates() {
        let mut r = Rotation::default();
        for _ in 0..10 {
            r.advance(true, false);
        }
        assert!((r.degrees() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_from_size() {
        assert_eq!(Orientation::from_size(100.0, 100.0), Orientation::Landscape);
        assert_eq!(Orientation::from_size(80.0, 120.0), Orientation::Portrait);
    }

    #[test]
    fn controls_hide_only_when_pointer_left() {
        let mut c = ControlsVisibility::default();
        assert!(c.pointer_enter());
        assert!(!c.pointer_enter());
        assert!(c.pointer_leave(true));
        c.auto_hide();
        assert!(!c.visible());

        assert!(c.pointer_enter());
        assert!(c.visible());
        c.auto_hide();
        assert!(c.visible());

        assert!(!c.pointer_leave(false));
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(0.0, 200.0), "00:00");
        assert_eq!(format_time(75.9, 200.0), "01:15");
        assert_eq!(format_time(3725.0, 4000.0), "01:02:05");
        assert_eq!(format_time(65.0, 4000.0), "00:01:05");
        assert_eq!(format_time(f64::NAN, 200.0), "00:00");
        assert_eq!(format_time(f64::INFINITY, f64::NAN), "00:00");
        assert_eq!(format_time(-3.0, 10.0), "00:00");
    }

    #[test]
    fn poster_label_is_last_segment() {
        assert_eq!(
            poster_label("https://cdn.example/art/cover.jpg?size=512").as_deref(),
            Some("cover.jpg")
        );
        assert_eq!(poster_label("/music/album/front.png").as_deref(), Some("front.png"));
        assert_eq!(poster_label("art/").as_deref(), Some("art"));
        assert_eq!(poster_label(""), None);
    }
}
