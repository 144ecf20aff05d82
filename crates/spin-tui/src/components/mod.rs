pub mod catalog_grid;
pub mod debug_overlay;
pub mod full_player;
pub mod help_overlay;
pub mod mini_player;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use spin_core::playback::PlayerVariant;

use crate::action::Action;

/// Transport keys shared by both players.
pub fn player_key(key: KeyEvent, variant: PlayerVariant) -> Option<Action> {
    if key.kind == KeyEventKind::Release || key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') => Some(Action::TogglePlay),
        KeyCode::Char('m') => Some(Action::ToggleMute),
        KeyCode::Char('v') | KeyCode::Char('+') => Some(Action::IncreaseVolume),
        KeyCode::Char('r') if variant.has_loop_control() => Some(Action::ToggleLoop),
        KeyCode::Char('b') if variant.has_debug_overlay() => Some(Action::ToggleDebug),
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0);
            Some(Action::Seek(f64::from(tenth) / 10.0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_player_keys_follow_variant() {
        assert_eq!(player_key(key('r'), PlayerVariant::Mini), Some(Action::ToggleLoop));
        assert_eq!(player_key(key('r'), PlayerVariant::Full), None);
        assert_eq!(player_key(key('b'), PlayerVariant::Full), Some(Action::ToggleDebug));
        assert_eq!(player_key(key('b'), PlayerVariant::Mini), None);
        assert_eq!(player_key(key('5'), PlayerVariant::Mini), Some(Action::Seek(0.5)));
        assert_eq!(player_key(key('+'), PlayerVariant::Full), Some(Action::IncreaseVolume));
    }
}
