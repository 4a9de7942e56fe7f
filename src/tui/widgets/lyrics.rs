//! Lyrics panel - scrolling view centered on the active line

use std::ops::Range;

use crate::lyrics::parser::{EntryKind, LyricDocument, LyricEntry};
use crate::presentation::Snapshot;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::truncate_str;

pub fn render(frame: &mut Frame, doc: &LyricDocument, snap: &Snapshot, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Lyrics ", icons.lyrics))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Add horizontal padding
    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    if doc.is_empty() {
        let message = if snap.lyrics_loading {
            "Loading..."
        } else {
            "No lyrics available"
        };
        let top = padded.height.saturating_sub(1) / 2;
        let mut lines = vec![Line::default(); top as usize];
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(theme.palette.fg_secondary),
        )));
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), padded);
        return;
    }

    let height = padded.height as usize;
    let max_width = padded.width.saturating_sub(2) as usize;
    let window = visible_window(snap.active_index, doc.len(), height);

    let mut display_lines: Vec<Line> = Vec::with_capacity(height);
    // Keep the active line on the middle row even near the top of the document
    let anchor = snap.active_index.unwrap_or(0).min(doc.len() - 1);
    let lead = (height / 2).saturating_sub(anchor - window.start);
    display_lines.extend(std::iter::repeat_n(Line::default(), lead));

    for (i, entry) in doc.entries()[window.clone()].iter().enumerate() {
        let index = window.start + i;
        let is_current = snap.active_index == Some(index);
        let is_past = snap.active_index.is_some_and(|a| index < a);

        let style = if is_current {
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else if is_past {
            Style::default().fg(theme.palette.fg_dim)
        } else {
            Style::default().fg(theme.palette.fg_secondary)
        };

        display_lines.push(Line::from(Span::styled(
            truncate_str(&entry_text(entry), max_width),
            style,
        )));
    }

    frame.render_widget(
        Paragraph::new(display_lines).alignment(Alignment::Center),
        padded,
    );
}

fn entry_text(entry: &LyricEntry) -> String {
    match entry.kind {
        EntryKind::Lyric => entry.text.clone(),
        EntryKind::Metadata(tag) => format!("{}: {}", tag.label(), entry.text),
    }
}

/// Entries that fit in `height` rows with the active one in the middle
fn visible_window(active: Option<usize>, len: usize, height: usize) -> Range<usize> {
    if len == 0 || height == 0 {
        return 0..0;
    }
    let anchor = active.unwrap_or(0).min(len - 1);
    let start = anchor.saturating_sub(height / 2);
    let end = (start + height).min(len);
    let lead = (height / 2).saturating_sub(anchor - start);
    // Rows used as top padding are not available for entries
    start..end.min(start + height - lead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parser::MetadataTag;

    #[test]
    fn window_centers_active_line() {
        assert_eq!(visible_window(Some(10), 30, 5), 8..13);
        assert_eq!(visible_window(Some(29), 30, 5), 27..30);
    }

    #[test]
    fn window_near_start_leaves_room_for_padding() {
        // Active line 0 sits on row 2 of 5, so only 3 entries fit
        assert_eq!(visible_window(Some(0), 30, 5), 0..3);
        assert_eq!(visible_window(None, 30, 5), 0..3);
        assert_eq!(visible_window(Some(1), 30, 5), 0..4);
    }

    #[test]
    fn window_handles_empty_input() {
        assert_eq!(visible_window(Some(3), 0, 5), 0..0);
        assert_eq!(visible_window(Some(3), 10, 0), 0..0);
    }

    #[test]
    fn metadata_entries_carry_their_label() {
        let entry = LyricEntry::metadata(0.0, MetadataTag::Artist, "Someone");
        assert_eq!(entry_text(&entry), "Artist: Someone");
        assert_eq!(entry_text(&LyricEntry::lyric(1.0, "la la")), "la la");
    }
}
