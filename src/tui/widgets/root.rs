//! Root layout widget - orchestrates main layout structure

use crate::app::actions::LayoutBounds;
use crate::app::state::AppState;
use crate::presentation::Orientation;
use crate::tui::cell_bounds;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use super::{lyrics, player};

/// Rows the player panel needs, borders included
const PLAYER_HEIGHT: u16 = 10;

/// Landscape:
/// ┌──────────────┬──────────────────────────────┐
/// │   Player     │            Lyrics            │
/// └──────────────┴──────────────────────────────┘
///
/// Portrait: player on top, lyrics below.
///
/// Full page: lyrics fill the screen above a one-line progress footer.
pub fn render(frame: &mut Frame, state: &AppState) -> LayoutBounds {
    let root = frame.area();
    let snap = state.snapshot();
    let doc = state.lyrics().document();

    if snap.fullpage {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(root);

        lyrics::render(frame, doc, &snap, rows[0]);
        let progress = player::render_compact(frame, &snap, rows[1]);
        return LayoutBounds {
            player: cell_bounds(rows[1]),
            progress: progress.and_then(cell_bounds),
            volume: None,
        };
    }

    let (player_area, lyrics_area) = split(root, snap.orientation);
    let toast = state.toast.as_ref().map(|t| t.kind);
    let areas = player::render(frame, &snap, toast, player_area);
    lyrics::render(frame, doc, &snap, lyrics_area);

    LayoutBounds {
        player: cell_bounds(player_area),
        progress: areas.progress.and_then(cell_bounds),
        volume: areas.volume.and_then(cell_bounds),
    }
}

fn split(area: Rect, orientation: Orientation) -> (Rect, Rect) {
    let chunks = match orientation {
        Orientation::Landscape => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area),
        Orientation::Portrait => Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(PLAYER_HEIGHT), Constraint::Min(3)])
            .split(area),
    };
    (chunks[0], chunks[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_puts_player_left() {
        let (player, lyrics) = split(Rect::new(0, 0, 100, 30), Orientation::Landscape);
        assert_eq!(player.x, 0);
        assert_eq!(player.width, 40);
        assert_eq!(lyrics.x, 40);
        assert_eq!(lyrics.height, 30);
    }

    #[test]
    fn portrait_stacks_player_on_top() {
        let (player, lyrics) = split(Rect::new(0, 0, 40, 60), Orientation::Portrait);
        assert_eq!(player.height, PLAYER_HEIGHT);
        assert_eq!(lyrics.y, PLAYER_HEIGHT);
        assert_eq!(lyrics.width, 40);
    }
}
