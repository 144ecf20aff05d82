//! FullPlayer component: the `/media/<id>` page.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use spin_core::duration::format_duration;
use spin_core::playback::VolumeIcon;

use crate::{
    action::Action,
    app_state::{AppState, NowPlaying},
    component::Component,
    components::player_key,
    theme::{style_muted, style_playing, style_secondary, C_PRIMARY},
    widgets::{
        controls::{contains, draw_controls, hit_action, play_glyph, volume_glyph, Control, HitArea},
        progress_bar::{draw_progress, fraction_at},
    },
};

const DISC_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

#[derive(Default)]
pub struct FullPlayer {
    disc_frame: usize,
    bar: Rect,
    hits: Vec<HitArea>,
}

impl FullPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The full page only distinguishes muted from not muted.
pub fn full_volume_icon(icon: VolumeIcon) -> VolumeIcon {
    match icon {
        VolumeIcon::Off => VolumeIcon::Off,
        _ => VolumeIcon::Low,
    }
}

fn controls(np: &NowPlaying) -> Vec<Control> {
    vec![
        Control::new(play_glyph(np.is_playing), Action::TogglePlay).active(np.is_playing),
        Control::new(volume_glyph(full_volume_icon(np.volume_icon)), Action::ToggleMute),
        Control::new(format!("{}%", np.volume.percent()), Action::IncreaseVolume),
        Control::new("debug", Action::ToggleDebug).active(np.debug_visible),
    ]
}

impl Component for FullPlayer {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind != KeyEventKind::Release && key.code == KeyCode::Esc {
            return vec![Action::Back];
        }
        match &state.now_playing {
            Some(np) => player_key(key, np.variant).into_iter().collect(),
            None => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        if state.now_playing.is_none() || !matches!(event.kind, MouseEventKind::Down(_)) {
            return vec![];
        }
        if contains(self.bar, event.column, event.row) {
            return fraction_at(self.bar, event.column)
                .map(Action::Seek)
                .into_iter()
                .collect();
        }
        hit_action(&self.hits, event.column, event.row)
            .into_iter()
            .collect()
    }

    fn tick(&mut self, state: &AppState) {
        if state.now_playing.as_ref().is_some_and(|np| np.is_playing) {
            self.disc_frame = (self.disc_frame + 1) % DISC_FRAMES.len();
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        self.hits.clear();
        self.bar = Rect::default();
        let Some(np) = &state.now_playing else {
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1), // disc
                Constraint::Length(1), // name
                Constraint::Length(1), // album
                Constraint::Length(1),
                Constraint::Length(1), // time
                Constraint::Length(1), // bar
                Constraint::Length(1),
                Constraint::Length(1), // controls
                Constraint::Min(0),
            ])
            .split(area);

        let disc = if np.is_playing {
            Span::styled(DISC_FRAMES[self.disc_frame], style_playing())
        } else {
            Span::styled("◎", style_muted())
        };
        centered(frame, rows[1], Line::from(disc));
        centered(
            frame,
            rows[2],
            Line::from(Span::styled(
                np.track.name.as_str(),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
        );
        centered(
            frame,
            rows[3],
            Line::from(Span::styled(np.track.album.as_str(), style_secondary())),
        );
        centered(
            frame,
            rows[5],
            Line::from(Span::styled(
                format!(
                    "{} / {}",
                    format_duration(np.progress_secs),
                    format_duration(np.track.duration_secs)
                ),
                style_secondary(),
            )),
        );

        let margin = (rows[6].width / 8).min(12);
        let bar = Rect {
            x: rows[6].x + margin,
            width: rows[6].width.saturating_sub(margin * 2),
            ..rows[6]
        };
        draw_progress(frame, bar, np.progress_ratio);
        self.bar = bar;

        self.hits = draw_controls(frame, rows[8], &controls(np));
    }
}

fn centered(frame: &mut Frame, area: Rect, line: Line) {
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::KeyModifiers;

    use super::*;

    #[test]
    fn test_full_icon_is_off_or_low() {
        assert_eq!(full_volume_icon(VolumeIcon::High), VolumeIcon::Low);
        assert_eq!(full_volume_icon(VolumeIcon::Medium), VolumeIcon::Low);
        assert_eq!(full_volume_icon(VolumeIcon::Off), VolumeIcon::Off);
    }

    #[test]
    fn test_esc_goes_back_without_player() {
        let state = AppState::new(
            spin_core::catalog::Catalog::builtin(),
            crate::action::Route::Media(99),
            true,
        );
        let mut full = FullPlayer::new();
        assert_eq!(
            full.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &state),
            vec![Action::Back]
        );
        assert!(full
            .handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE), &state)
            .is_empty());
    }
}
