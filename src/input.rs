//! Key bindings for two players sharing one keyboard.

use crate::board::Shift;
use crate::matchup::Command;
use crate::piece::Rotation;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press. Board commands carry the player (0 left, 1 right) whose keys were used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Command(usize, Command),
    Pause,
    Restart,
    Quit,
    None,
}

/// Map a key event to an action. Letters are case-insensitive so Caps Lock does not lock anyone out.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c' | 'C') => Action::Quit,
            _ => Action::None,
        };
    }
    if modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER) {
        return Action::None;
    }
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Char('a') => Action::Command(0, Command::Move(Shift::Left)),
        KeyCode::Char('d') => Action::Command(0, Command::Move(Shift::Right)),
        KeyCode::Char('s') => Action::Command(0, Command::SoftDrop),
        KeyCode::Char('w') => Action::Command(0, Command::Rotate(Rotation::Clockwise)),
        KeyCode::Char('e') => Action::Command(0, Command::Rotate(Rotation::CounterClockwise)),
        KeyCode::Char(' ') => Action::Command(0, Command::HardDrop),
        KeyCode::Left => Action::Command(1, Command::Move(Shift::Left)),
        KeyCode::Right => Action::Command(1, Command::Move(Shift::Right)),
        KeyCode::Down => Action::Command(1, Command::SoftDrop),
        KeyCode::Up => Action::Command(1, Command::Rotate(Rotation::Clockwise)),
        KeyCode::Char('/') => Action::Command(1, Command::Rotate(Rotation::CounterClockwise)),
        KeyCode::Enter => Action::Command(1, Command::HardDrop),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Action {
        key_to_action(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn player_one_uses_letters() {
        assert_eq!(press(KeyCode::Char('a')), Action::Command(0, Command::Move(Shift::Left)));
        assert_eq!(press(KeyCode::Char('D')), Action::Command(0, Command::Move(Shift::Right)));
        assert_eq!(press(KeyCode::Char('s')), Action::Command(0, Command::SoftDrop));
        assert_eq!(press(KeyCode::Char(' ')), Action::Command(0, Command::HardDrop));
        assert_eq!(
            press(KeyCode::Char('e')),
            Action::Command(0, Command::Rotate(Rotation::CounterClockwise))
        );
    }

    #[test]
    fn player_two_uses_arrows() {
        assert_eq!(press(KeyCode::Left), Action::Command(1, Command::Move(Shift::Left)));
        assert_eq!(press(KeyCode::Up), Action::Command(1, Command::Rotate(Rotation::Clockwise)));
        assert_eq!(press(KeyCode::Enter), Action::Command(1, Command::HardDrop));
        assert_eq!(
            press(KeyCode::Char('/')),
            Action::Command(1, Command::Rotate(Rotation::CounterClockwise))
        );
    }

    #[test]
    fn global_keys() {
        assert_eq!(press(KeyCode::Char('p')), Action::Pause);
        assert_eq!(press(KeyCode::Char('R')), Action::Restart);
        assert_eq!(press(KeyCode::Esc), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn modified_keys_are_ignored() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT)),
            Action::None
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Action::None
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Action::Command(0, Command::Move(Shift::Left))
        );
        assert_eq!(press(KeyCode::F(1)), Action::None);
    }
}
