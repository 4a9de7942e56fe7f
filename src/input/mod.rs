use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::AppState;
use crate::player::SeekTarget;
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};
use tokio::sync::mpsc;

/// Terminal cells are about twice as tall as they are wide
pub const CELL_ASPECT: f64 = 2.0;

const SEEK_STEP_SECS: f64 = 5.0;
const VOLUME_STEP: f64 = 0.05;

pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if tx.is_closed() {
                break;
            }
            if !event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                continue;
            }
            let ev = match event::read() {
                Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                Ok(CtEvent::Mouse(m)) if mouse_enabled => InputEvent::Mouse(m),
                Ok(CtEvent::Resize(width, height)) => InputEvent::Resize { width, height },
                Ok(CtEvent::FocusGained) => InputEvent::Focus(true),
                Ok(CtEvent::FocusLost) => InputEvent::Focus(false),
                _ => continue,
            };
            if tx.blocking_send(Event::Input(ev)).is_err() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize { width, height } => Some(resize_action(width, height)),
        InputEvent::Mouse(m) => map_mouse(m),
        InputEvent::Key(k) => map_key(state, k),
        // A focused terminal counts as the pointer being over the player
        InputEvent::Focus(true) => Some(Action::PointerEnter),
        InputEvent::Focus(false) => Some(Action::PointerLeave),
    }
}

/// Terminal size in cells to an aspect-corrected resize
pub fn resize_action(width: u16, height: u16) -> Action {
    Action::Resize {
        width: f64::from(width),
        height: f64::from(height) * CELL_ASPECT,
    }
}

fn map_key(state: &AppState, k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Escape),

        KeyCode::Char(' ') | KeyCode::Char('k') => Some(Action::TogglePlay),
        KeyCode::Char('n') => Some(Action::Next),
        KeyCode::Char('p') => Some(Action::Previous),

        KeyCode::Right | KeyCode::Char(']') | KeyCode::Char('l') => {
            Some(Action::SeekBy(SEEK_STEP_SECS))
        }
        KeyCode::Left | KeyCode::Char('[') | KeyCode::Char('j') => {
            Some(Action::SeekBy(-SEEK_STEP_SECS))
        }
        KeyCode::Home | KeyCode::Char('0') => Some(Action::Seek(SeekTarget::Fraction(0.0))),
        KeyCode::Char(c @ '1'..='9') => {
            let tenth = f64::from(c.to_digit(10)?) / 10.0;
            Some(Action::Seek(SeekTarget::Fraction(tenth)))
        }

        KeyCode::Up | KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::VolumeBy(VOLUME_STEP)),
        KeyCode::Down | KeyCode::Char('-') | KeyCode::Char('_') => {
            Some(Action::VolumeBy(-VOLUME_STEP))
        }
        KeyCode::Char('m') => Some(Action::ToggleMute),

        KeyCode::Char('r') => Some(Action::CycleLoopMode),
        KeyCode::Char('f') => Some(Action::SetFullpage(!state.fullpage())),
        _ => None,
    }
}

fn map_mouse(m: MouseEvent) -> Option<Action> {
    let (x, y) = (f64::from(m.column), f64::from(m.row));
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::PointerDown { x, y }),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(Action::PointerMove { x, y })
        }
        MouseEventKind::Up(MouseButton::Left) => Some(Action::PointerUp),
        MouseEventKind::ScrollUp => Some(Action::VolumeBy(VOLUME_STEP)),
        MouseEventKind::ScrollDown => Some(Action::VolumeBy(-VOLUME_STEP)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> InputEvent {
        InputEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn transport_keys() {
        let s = AppState::default();
        assert!(matches!(map_input_to_action(&s, key(KeyCode::Char(' '))), Some(Action::TogglePlay)));
        assert!(matches!(map_input_to_action(&s, key(KeyCode::Char('n'))), Some(Action::Next)));
        assert!(matches!(map_input_to_action(&s, key(KeyCode::Esc)), Some(Action::Escape)));
        assert!(matches!(
            map_input_to_action(&s, key(KeyCode::Char(']'))),
            Some(Action::SeekBy(d)) if d == SEEK_STEP_SECS
        ));
        assert!(matches!(
            map_input_to_action(&s, key(KeyCode::Char('5'))),
            Some(Action::Seek(SeekTarget::Fraction(f))) if (f - 0.5).abs() < 1e-9
        ));
        assert!(map_input_to_action(&s, key(KeyCode::Char('z'))).is_none());
    }

    #[test]
    fn fullpage_key_toggles() {
        let mut s = AppState::default();
        assert!(matches!(
            map_input_to_action(&s, key(KeyCode::Char('f'))),
            Some(Action::SetFullpage(true))
        ));
        s.reduce(Action::SetFullpage(true));
        assert!(matches!(
            map_input_to_action(&s, key(KeyCode::Char('f'))),
            Some(Action::SetFullpage(false))
        ));
    }

    #[test]
    fn mouse_becomes_pointer_actions() {
        let s = AppState::default();
        assert!(matches!(
            map_input_to_action(&s, mouse(MouseEventKind::Down(MouseButton::Left), 4, 7)),
            Some(Action::PointerDown { x, y }) if x == 4.0 && y == 7.0
        ));
        assert!(matches!(
            map_input_to_action(&s, mouse(MouseEventKind::Drag(MouseButton::Left), 9, 7)),
            Some(Action::PointerMove { .. })
        ));
        assert!(matches!(
            map_input_to_action(&s, mouse(MouseEventKind::Up(MouseButton::Left), 9, 7)),
            Some(Action::PointerUp)
        ));
        assert!(map_input_to_action(&s, mouse(MouseEventKind::Down(MouseButton::Right), 1, 1)).is_none());
    }

    #[test]
    fn resize_corrects_for_cell_aspect() {
        let s = AppState::default();
        assert!(matches!(
            map_input_to_action(&s, InputEvent::Resize { width: 100, height: 40 }),
            Some(Action::Resize { width, height }) if width == 100.0 && height == 80.0
        ));
    }

    #[test]
    fn focus_maps_to_pointer_enter_and_leave() {
        let s = AppState::default();
        assert!(matches!(
            map_input_to_action(&s, InputEvent::Focus(true)),
            Some(Action::PointerEnter)
        ));
        assert!(matches!(
            map_input_to_action(&s, InputEvent::Focus(false)),
            Some(Action::PointerLeave)
        ));
    }
}
