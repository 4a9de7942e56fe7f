//! Player panel - track info, progress, transport controls and volume

use crate::app::state::ToastKind;
use crate::presentation::Snapshot;
use crate::queue::LoopMode;
use crate::tui::theme::{Disc, Icons, get_theme};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::truncate_str;

/// Screen areas of the interactive bars
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerAreas {
    pub progress: Option<Rect>,
    pub volume: Option<Rect>,
}

/// Layout (inside the border):
///   ◐ Title                      2/5
///   Author
///   cover front.jpg
///   ━━━━━━━━━━━━━━━●──────────────────
///   01:02                        03:45
///    <   ||   >   (repeat)
///   vol █████░░░░░  50%
///   toast
pub fn render(
    frame: &mut Frame,
    snap: &Snapshot,
    toast: Option<ToastKind>,
    area: Rect,
) -> PlayerAreas {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} aurora ", icons.music))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(1), // Author
            Constraint::Length(1), // Poster
            Constraint::Length(1), // Progress bar
            Constraint::Length(1), // Time labels
            Constraint::Length(1), // Controls
            Constraint::Length(1), // Volume
            Constraint::Length(1), // Toast
            Constraint::Min(0),
        ])
        .split(padded);

    let width = padded.width as usize;

    // Title line with the spinning disc and playlist position
    let position = snap
        .track_position
        .map(|(i, n)| format!("{i}/{n}"))
        .unwrap_or_default();
    let disc = if snap.loading { icons.loading } else { Disc::frame(snap.rotation) };
    let title = snap.track_name.as_deref().unwrap_or("Nothing loaded");
    let title_width = width.saturating_sub(position.chars().count() + 3);
    let title_text = truncate_str(title, title_width);
    let gap = width.saturating_sub(title_text.chars().count() + position.chars().count() + 2);
    let title_line = Line::from(vec![
        Span::styled(format!("{disc} "), Style::default().fg(theme.palette.accent_alt)),
        Span::styled(
            title_text,
            Style::default()
                .fg(theme.palette.fg_primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(gap)),
        Span::styled(position, Style::default().fg(theme.palette.fg_dim)),
    ]);
    frame.render_widget(Paragraph::new(title_line), rows[0]);

    let author = snap.track_author.as_deref().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            truncate_str(author, width),
            Style::default().fg(theme.palette.fg_secondary),
        ))),
        rows[1],
    );

    if let Some(poster) = &snap.poster {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                truncate_str(&format!("cover {poster}"), width),
                Style::default().fg(theme.palette.fg_dim),
            ))),
            rows[2],
        );
    }

    let mut areas = PlayerAreas::default();

    let bar = render_progress_bar(rows[3].width as usize, snap.progress / 100.0, icons);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            bar,
            Style::default().fg(theme.palette.accent),
        ))),
        rows[3],
    );
    areas.progress = Some(rows[3]);

    let times_gap = width
        .saturating_sub(snap.current_label.chars().count() + snap.duration_label.chars().count());
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                snap.current_label.clone(),
                Style::default().fg(theme.palette.fg_secondary),
            ),
            Span::raw(" ".repeat(times_gap)),
            Span::styled(
                snap.duration_label.clone(),
                Style::default().fg(theme.palette.fg_secondary),
            ),
        ])),
        rows[4],
    );

    if snap.controls_visible {
        frame.render_widget(Paragraph::new(controls_line(snap, icons)), rows[5]);
        areas.volume = render_volume(frame, snap, icons, rows[6]);
    }

    if let (Some(kind), Some(message)) = (toast, snap.notice.as_deref()) {
        let (prefix, color) = match kind {
            ToastKind::Success => (icons.success, theme.palette.accent),
            ToastKind::Error => (icons.error, theme.palette.error),
        };
        let toast_line = Line::from(vec![
            Span::styled(format!("{} ", prefix), Style::default().fg(color)),
            Span::styled(
                truncate_str(message, width.saturating_sub(3)),
                Style::default().fg(color),
            ),
        ]);
        frame.render_widget(Paragraph::new(toast_line), rows[7]);
    }

    areas
}

/// One-line footer for full page mode: time, progress bar, duration
pub fn render_compact(frame: &mut Frame, snap: &Snapshot, area: Rect) -> Option<Rect> {
    let theme = get_theme();
    let icons = &theme.icons;
    let play_icon = if snap.is_playing { icons.pause } else { icons.play };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(snap.current_label.chars().count() as u16 + 1),
            Constraint::Min(3),
            Constraint::Length(snap.duration_label.chars().count() as u16 + 1),
        ])
        .split(area);

    let dim = Style::default().fg(theme.palette.fg_secondary);
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {play_icon}"), Style::default().fg(theme.palette.accent))),
        cols[0],
    );
    frame.render_widget(Paragraph::new(Span::styled(snap.current_label.clone(), dim)), cols[1]);
    frame.render_widget(
        Paragraph::new(Span::styled(
            render_progress_bar(cols[2].width as usize, snap.progress / 100.0, icons),
            Style::default().fg(theme.palette.accent),
        )),
        cols[2],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", snap.duration_label), dim)),
        cols[3],
    );
    Some(cols[2])
}

fn controls_line(snap: &Snapshot, icons: &Icons) -> Line<'static> {
    let theme = get_theme();
    let enabled = Style::default().fg(theme.palette.fg_primary);
    let disabled = Style::default().fg(theme.palette.fg_dim);

    let play_icon = if snap.is_playing { icons.pause } else { icons.play };
    let loop_icon = match snap.loop_mode {
        LoopMode::Off => icons.repeat_off,
        LoopMode::Single => icons.repeat_one,
        LoopMode::List => icons.repeat,
    };
    let loop_style = if snap.loop_mode == LoopMode::Off { disabled } else { Style::default().fg(theme.palette.accent_alt) };

    Line::from(vec![
        Span::styled(icons.prev, if snap.can_previous { enabled } else { disabled }),
        Span::raw("   "),
        Span::styled(play_icon, Style::default().fg(theme.palette.accent)),
        Span::raw("   "),
        Span::styled(icons.next, if snap.can_next { enabled } else { disabled }),
        Span::raw("     "),
        Span::styled(format!("{loop_icon} {}", snap.loop_mode), loop_style),
    ])
}

/// Returns the area of the level bar itself
fn render_volume(frame: &mut Frame, snap: &Snapshot, icons: &Icons, area: Rect) -> Option<Rect> {
    let theme = get_theme();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(3),
            Constraint::Max(20),
            Constraint::Length(6),
            Constraint::Min(0),
        ])
        .split(area);

    let vol_icon = if snap.muted || snap.volume_percent == 0 {
        icons.volume_mute
    } else if snap.volume_percent < 50 {
        icons.volume_low
    } else {
        icons.volume_high
    };
    let dim = Style::default().fg(theme.palette.fg_secondary);

    frame.render_widget(Paragraph::new(Span::styled(vol_icon, dim)), cols[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(
            render_level(cols[1].width as usize, f64::from(snap.volume_percent) / 100.0, icons),
            Style::default().fg(theme.palette.accent_alt),
        )),
        cols[1],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {:>3}%", snap.volume_percent), dim)),
        cols[2],
    );
    (cols[1].width > 0).then_some(cols[1])
}

/// Renders a modern progress bar
fn render_progress_bar(width: usize, ratio: f64, icons: &Icons) -> String {
    if width < 3 {
        return String::new();
    }

    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }
    bar.push_str(icons.progress_head);
    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }
    bar
}

fn render_level(width: usize, ratio: f64, icons: &Icons) -> String {
    let filled = (width as f64 * ratio.clamp(0.0, 1.0)).round() as usize;
    let mut bar = icons.level_full.repeat(filled.min(width));
    bar.push_str(&icons.level_empty.repeat(width.saturating_sub(filled)));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_has_head_at_ratio() {
        let icons = Icons::nerd();
        assert_eq!(render_progress_bar(5, 0.0, &icons), "●────");
        assert_eq!(render_progress_bar(5, 1.0, &icons), "━━━━●");
        assert_eq!(render_progress_bar(5, 0.5, &icons), "━━●──");
        assert_eq!(render_progress_bar(2, 0.5, &icons), "");
        assert_eq!(render_progress_bar(3, f64::NAN, &icons), "●──");
    }

    #[test]
    fn level_bar_fills_proportionally() {
        let icons = Icons::nerd();
        assert_eq!(render_level(4, 0.5, &icons), "██░░");
        assert_eq!(render_level(4, 0.0, &icons), "░░░░");
        assert_eq!(render_level(4, 1.0, &icons), "████");
    }
}
