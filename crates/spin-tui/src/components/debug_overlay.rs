//! DebugOverlay component: live internal state of the full player.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::{
    action::Action,
    app_state::{AppState, NowPlaying},
    component::Component,
    theme::{
        style_default, style_secondary, C_ACCENT, C_LABEL, C_OVERLAY_BG, C_OVERLAY_BORDER,
        C_PRIMARY,
    },
    widgets::controls::contains,
};

pub const DEBUG_OVERLAY_WIDTH: u16 = 64;

#[derive(Default)]
pub struct DebugOverlay {
    close: Rect,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The `[x]` button sitting on the top border, right-aligned.
fn close_button(area: Rect) -> Rect {
    if area.width < 6 || area.height == 0 {
        return Rect::default();
    }
    Rect::new(area.x + area.width - 4, area.y, 3, 1)
}

/// Label/value pairs shown in the table.
pub fn debug_rows(np: &NowPlaying) -> Vec<(&'static str, String)> {
    vec![
        ("Debug", "On".to_string()),
        (
            "Playing",
            if np.is_playing { "Yes" } else { "No" }.to_string(),
        ),
        ("Volume", format!("{}%", np.volume.percent())),
        ("Thumbnail", np.track.thumbnail_url.clone()),
        ("Source", np.track.source_url.clone()),
        ("Length", format!("{} seconds", np.track.duration_secs)),
        ("Progress", format!("{} seconds", np.progress_secs)),
        ("Date", np.clock.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]
}

impl Component for DebugOverlay {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let Some(np) = state.now_playing.as_ref().filter(|np| np.debug_visible) else {
            return vec![];
        };
        match key.code {
            KeyCode::Char('y') => vec![Action::CopyToClipboard(np.track.source_url.clone())],
            KeyCode::Char('Y') => vec![Action::CopyToClipboard(np.track.thumbnail_url.clone())],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        let visible = state.now_playing.as_ref().is_some_and(|np| np.debug_visible);
        if visible
            && matches!(event.kind, MouseEventKind::Down(_))
            && contains(self.close, event.column, event.row)
        {
            return vec![Action::ToggleDebug];
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        self.close = Rect::default();
        let Some(np) = state.now_playing.as_ref().filter(|np| np.debug_visible) else {
            return;
        };
        let rows: Vec<Row> = debug_rows(np)
            .into_iter()
            .map(|(label, value)| {
                Row::new(vec![
                    Cell::from(Span::styled(label, style_secondary())),
                    Cell::from(Span::styled(value, style_default())),
                ])
            })
            .collect();

        frame.render_widget(Clear, area);
        frame.render_widget(
            Table::new(rows, [Constraint::Length(10), Constraint::Min(0)])
                .header(
                    Row::new(vec!["debug", "y copy source · Y copy thumbnail"])
                        .style(Style::default().fg(C_LABEL).add_modifier(Modifier::BOLD)),
                )
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_OVERLAY_BORDER))
                        .style(Style::default().bg(C_OVERLAY_BG).fg(C_PRIMARY)),
                ),
            area,
        );

        self.close = close_button(area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "[x]",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            )),
            self.close,
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use ratatui::crossterm::event::{KeyModifiers, MouseButton};
    use spin_core::catalog::Catalog;
    use spin_core::playback::{PlayerVariant, Volume, VolumeIcon};

    use super::*;
    use crate::action::Route;

    fn now_playing(debug_visible: bool) -> NowPlaying {
        let track = Catalog::builtin().tracks()[1].clone();
        NowPlaying {
            progress_ratio: 12.0 / f64::from(track.duration_secs),
            track,
            variant: PlayerVariant::Full,
            is_playing: true,
            is_muted: false,
            is_looping: false,
            volume: Volume::from_tenths(5),
            volume_icon: VolumeIcon::Medium,
            progress_secs: 12,
            debug_visible,
            clock: Local
                .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
                .single()
                .unwrap_or_else(Local::now),
        }
    }

    #[test]
    fn test_rows_show_live_state() {
        let np = now_playing(true);
        let rows = debug_rows(&np);
        let get = |label: &str| {
            rows.iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("Playing"), "Yes");
        assert_eq!(get("Volume"), "50%");
        assert_eq!(get("Progress"), "12 seconds");
        assert_eq!(get("Source"), np.track.source_url);
        assert_eq!(get("Date"), "2024-03-09 14:05:07");
    }

    #[test]
    fn test_copy_only_when_visible() {
        let key = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE);
        let mut overlay = DebugOverlay::new();

        let mut state = AppState::new(Catalog::builtin(), Route::Media(2), true);
        state.now_playing = Some(now_playing(false));
        assert!(overlay.handle_key(key, &state).is_empty());

        let np = now_playing(true);
        let source = np.track.source_url.clone();
        state.now_playing = Some(np);
        assert_eq!(
            overlay.handle_key(key, &state),
            vec![Action::CopyToClipboard(source)]
        );
    }

    #[test]
    fn test_click_on_close_button_hides_overlay() {
        let area = Rect::new(16, 0, DEBUG_OVERLAY_WIDTH, 11);
        let mut overlay = DebugOverlay::new();
        overlay.close = close_button(area);
        assert_eq!(overlay.close, Rect::new(76, 0, 3, 1));

        let mut state = AppState::new(Catalog::builtin(), Route::Media(2), true);
        state.now_playing = Some(now_playing(true));
        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            overlay.handle_mouse(click(77, 0), area, &state),
            vec![Action::ToggleDebug]
        );
        assert!(overlay.handle_mouse(click(30, 4), area, &state).is_empty());

        state.now_playing = Some(now_playing(false));
        assert!(overlay.handle_mouse(click(77, 0), area, &state).is_empty());
    }
}
