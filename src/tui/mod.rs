use crate::app::actions::LayoutBounds;
use crate::app::state::AppState;
use crate::gesture::Bounds;
use anyhow::Context;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{self, Stdout};

pub mod theme;
pub mod widgets;

pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

pub struct TerminalGuard {
    terminal: TuiTerminal,
    mouse: bool,
}

impl TerminalGuard {
    pub fn enter(mouse: bool) -> anyhow::Result<Self> {
        enable_raw_mode().context("enable raw mode")?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange).context("enter alt screen")?;
        if mouse {
            execute!(stdout, EnableMouseCapture).context("enable mouse capture")?;
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("create terminal")?;

        Ok(Self { terminal, mouse })
    }

    pub fn terminal_mut(&mut self) -> &mut TuiTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; don't panic in Drop.
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        if self.mouse {
            let _ = execute!(stdout, DisableMouseCapture);
        }
        let _ = execute!(stdout, DisableFocusChange, LeaveAlternateScreen);
    }
}

/// Render one frame and report where the interactive parts ended up
pub fn draw(terminal: &mut TuiTerminal, state: &AppState) -> anyhow::Result<LayoutBounds> {
    let mut layout = LayoutBounds::default();
    terminal
        .draw(|f| {
            layout = widgets::root::render(f, state);
        })
        .context("terminal draw")?;
    Ok(layout)
}

/// Cell rectangle to gesture bounds. The last column maps to fraction 1.0.
pub(crate) fn cell_bounds(rect: Rect) -> Option<Bounds> {
    if rect.width == 0 || rect.height == 0 {
        return None;
    }
    Some(Bounds::new(
        f64::from(rect.x),
        f64::from(rect.y),
        f64::from(rect.width.saturating_sub(1).max(1)),
        f64::from(rect.height - 1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_bounds_span_first_to_last_column() {
        let b = cell_bounds(Rect::new(10, 4, 21, 1)).unwrap();
        assert_eq!(b.fraction_at(10.0), 0.0);
        assert_eq!(b.fraction_at(30.0), 1.0);
        assert_eq!(b.fraction_at(20.0), 0.5);
        assert!(b.contains(30.0, 4.0));
        assert!(!b.contains(30.0, 5.0));
        assert!(cell_bounds(Rect::new(0, 0, 0, 1)).is_none());
    }
}
