//! Color palette

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_dim: Color,
    pub accent: Color,
    pub accent_alt: Color,
    pub border: Color,
    pub error: Color,
}

impl Palette {
    /// Cool night-sky tones
    pub const AURORA: Self = Self {
        fg_primary: Color::Rgb(236, 239, 244),   // #eceff4
        fg_secondary: Color::Rgb(143, 155, 179), // #8f9bb3
        fg_dim: Color::Rgb(76, 86, 106),         // #4c566a
        accent: Color::Rgb(136, 232, 196),       // #88e8c4 aurora green
        accent_alt: Color::Rgb(180, 142, 240),   // #b48ef0 violet
        border: Color::Rgb(59, 66, 82),          // #3b4252
        error: Color::Rgb(235, 111, 146),        // #eb6f92
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::AURORA
    }
}
