//! Nerd Font icons for TUI display
//! Requires a Nerd Font to be installed (https://www.nerdfonts.com)

/// Icon set using Nerd Font glyphs
#[derive(Debug, Clone)]
pub struct Icons {
    // Playback controls
    pub play: &'static str,
    pub pause: &'static str,
    pub next: &'static str,
    pub prev: &'static str,

    // Volume
    pub volume_mute: &'static str,
    pub volume_low: &'static str,
    pub volume_high: &'static str,

    // Loop modes
    pub repeat: &'static str,
    pub repeat_one: &'static str,
    pub repeat_off: &'static str,

    // Status
    pub success: &'static str,
    pub error: &'static str,
    pub loading: &'static str,

    pub music: &'static str,
    pub lyrics: &'static str,

    // Progress / volume bars
    pub progress_full: &'static str,
    pub progress_empty: &'static str,
    pub progress_head: &'static str,
    pub level_full: &'static str,
    pub level_empty: &'static str,
}

impl Icons {
    /// Nerd Font icon set
    pub const fn nerd() -> Self {
        Self {
            play: "\u{f04b}",        // nf-fa-play
            pause: "\u{f04c}",       // nf-fa-pause
            next: "\u{f051}",        // nf-fa-step_forward
            prev: "\u{f048}",        // nf-fa-step_backward

            volume_mute: "\u{f026}", // nf-fa-volume_off
            volume_low: "\u{f027}",  // nf-fa-volume_down
            volume_high: "\u{f028}", // nf-fa-volume_up

            repeat: "\u{f456}",      // nf-md-repeat
            repeat_one: "\u{f458}",  // nf-md-repeat_once
            repeat_off: "\u{f457}",  // nf-md-repeat_off

            success: "\u{f00c}",     // nf-fa-check
            error: "\u{f00d}",       // nf-fa-times
            loading: "\u{f110}",     // nf-fa-spinner

            music: "\u{f001}",       // nf-fa-music
            lyrics: "\u{f15c}",      // nf-fa-file_text_o

            progress_full: "━",
            progress_empty: "─",
            progress_head: "●",
            level_full: "█",
            level_empty: "░",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::nerd()
    }
}

/// Spinning disc shown next to the track title
pub struct Disc;

impl Disc {
    pub const FRAMES: [&'static str; 8] = ["◐", "◓", "◑", "◒", "◐", "◓", "◑", "◒"];

    /// Frame for a rotation angle in degrees
    pub fn frame(degrees: f64) -> &'static str {
        let step = 360.0 / Self::FRAMES.len() as f64;
        let idx = (degrees.rem_euclid(360.0) / step) as usize % Self::FRAMES.len();
        Self::FRAMES[idx]
    }
}
