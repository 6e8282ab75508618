/// Keyboard input.
///
/// Every key-down (initial press or OS auto-repeat) is one discrete intent,
/// so holding an arrow walks the corridor at the terminal's repeat rate.
/// Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::domain::entity::MoveDir;

/// What the player asked for, independent of the device.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Move(MoveDir),
    Confirm,
    Quit,
}

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// Map one key to an intent.
pub fn intent_for_key(code: KeyCode) -> Option<Intent> {
    if KEYS_UP.contains(&code) {
        Some(Intent::Move(MoveDir::Up))
    } else if KEYS_DOWN.contains(&code) {
        Some(Intent::Move(MoveDir::Down))
    } else if KEYS_LEFT.contains(&code) {
        Some(Intent::Move(MoveDir::Left))
    } else if KEYS_RIGHT.contains(&code) {
        Some(Intent::Move(MoveDir::Right))
    } else if KEYS_CONFIRM.contains(&code) {
        Some(Intent::Confirm)
    } else if KEYS_QUIT.contains(&code) {
        Some(Intent::Quit)
    } else {
        None
    }
}

pub struct InputState {
    /// Key-down events from the most recent drain, in arrival order.
    key_downs: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { key_downs: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.key_downs.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.key_downs.push(key);
                }
            }
        }
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.key_downs.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Intents for this frame, in the order the keys arrived.
    /// Chords with Ctrl or Alt are not game input.
    pub fn intents(&self) -> Vec<Intent> {
        self.key_downs.iter()
            .filter(|k| !k.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT))
            .filter_map(|k| intent_for_key(k.code))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_share_directions() {
        assert_eq!(intent_for_key(KeyCode::Up), Some(Intent::Move(MoveDir::Up)));
        assert_eq!(intent_for_key(KeyCode::Char('w')), Some(Intent::Move(MoveDir::Up)));
        assert_eq!(intent_for_key(KeyCode::Down), intent_for_key(KeyCode::Char('S')));
        assert_eq!(intent_for_key(KeyCode::Left), intent_for_key(KeyCode::Char('a')));
        assert_eq!(intent_for_key(KeyCode::Right), intent_for_key(KeyCode::Char('D')));
    }

    #[test]
    fn confirm_and_quit_keys() {
        assert_eq!(intent_for_key(KeyCode::Enter), Some(Intent::Confirm));
        assert_eq!(intent_for_key(KeyCode::Char(' ')), Some(Intent::Confirm));
        assert_eq!(intent_for_key(KeyCode::Esc), Some(Intent::Quit));
        assert_eq!(intent_for_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn ctrl_chords_are_not_intents() {
        let mut kb = InputState::new();
        kb.key_downs.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        kb.key_downs.push(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE));
        assert!(kb.ctrl_c_pressed());
        assert_eq!(kb.intents(), vec![Intent::Move(MoveDir::Right)]);
    }
}
