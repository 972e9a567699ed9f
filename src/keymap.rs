//! Raw key events to panel actions, in dispatch priority order.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::params::KeyOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `Down`/`Left` step backwards through values and forwards through the list.
    pub fn is_decrease(self) -> bool {
        matches!(self, Direction::Down | Direction::Left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Move(Direction),
    OpenPresets,
    Confirm,
    /// Digit key, 1-based preset number; `0` never names a preset.
    PresetNumber(usize),
    Shortcut(char),
}

/// First match wins: quit, directions, preset list, confirm, digits, shortcuts.
pub fn action_for(k: &KeyEvent, opts: &KeyOptions) -> Option<Action> {
    if k.modifiers.contains(KeyModifiers::CONTROL) {
        return match k.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }

    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        KeyCode::Up => Some(Action::Move(Direction::Up)),
        KeyCode::Down => Some(Action::Move(Direction::Down)),
        KeyCode::Left => Some(Action::Move(Direction::Left)),
        KeyCode::Right => Some(Action::Move(Direction::Right)),
        KeyCode::Char(c) if opts.vi_keys && vi_direction(c).is_some() => {
            vi_direction(c).map(Action::Move)
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::OpenPresets),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Char(c) if opts.digit_presets && c.is_ascii_digit() => {
            c.to_digit(10).map(|d| Action::PresetNumber(d as usize))
        }
        KeyCode::Char(c) => Some(Action::Shortcut(c)),
        _ => None,
    }
}

fn vi_direction(c: char) -> Option<Direction> {
    match c.to_ascii_lowercase() {
        'h' => Some(Direction::Left),
        'j' => Some(Direction::Down),
        'k' => Some(Direction::Up),
        'l' => Some(Direction::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: KeyOptions = KeyOptions {
        vi_keys: true,
        digit_presets: true,
    };
    const PLAIN: KeyOptions = KeyOptions {
        vi_keys: false,
        digit_presets: false,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys() {
        assert_eq!(action_for(&key(KeyCode::Char('q')), &PLAIN), Some(Action::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(&ctrl_c, &PLAIN), Some(Action::Quit));
        let ctrl_b = KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL);
        assert_eq!(action_for(&ctrl_b, &PLAIN), None);
    }

    #[test]
    fn vi_keys_only_when_enabled() {
        assert_eq!(
            action_for(&key(KeyCode::Char('J')), &CLASSIC),
            Some(Action::Move(Direction::Down))
        );
        assert_eq!(
            action_for(&key(KeyCode::Char('l')), &CLASSIC),
            Some(Action::Move(Direction::Right))
        );
        assert_eq!(
            action_for(&key(KeyCode::Char('j')), &PLAIN),
            Some(Action::Shortcut('j'))
        );
    }

    #[test]
    fn digits_only_when_enabled() {
        assert_eq!(
            action_for(&key(KeyCode::Char('2')), &CLASSIC),
            Some(Action::PresetNumber(2))
        );
        assert_eq!(
            action_for(&key(KeyCode::Char('0')), &CLASSIC),
            Some(Action::PresetNumber(0))
        );
        assert_eq!(
            action_for(&key(KeyCode::Char('2')), &PLAIN),
            Some(Action::Shortcut('2'))
        );
    }

    #[test]
    fn named_keys() {
        assert_eq!(action_for(&key(KeyCode::Enter), &PLAIN), Some(Action::Confirm));
        assert_eq!(action_for(&key(KeyCode::Char('P')), &PLAIN), Some(Action::OpenPresets));
        assert_eq!(
            action_for(&key(KeyCode::Up), &PLAIN),
            Some(Action::Move(Direction::Up))
        );
        assert_eq!(action_for(&key(KeyCode::Esc), &PLAIN), None);
        assert_eq!(action_for(&key(KeyCode::Char('b')), &PLAIN), Some(Action::Shortcut('b')));
    }

    #[test]
    fn decrease_directions() {
        assert!(Direction::Down.is_decrease());
        assert!(Direction::Left.is_decrease());
        assert!(!Direction::Up.is_decrease());
        assert!(!Direction::Right.is_decrease());
    }
}
