//! Keyboard shortcut popup shown with `?`.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_OVERLAY_BG, C_OVERLAY_BORDER, C_PRIMARY, C_SECONDARY},
};

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HelpOverlay {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !state.show_help {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            // Consume all keys while overlay is open
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !state.show_help {
            return;
        }

        let mut lines = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
        ];
        for (title, rows) in SHORTCUTS {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" {}", title),
                Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
            )));
            lines.extend(rows.iter().map(|&(key, desc)| shortcut_row(key, desc)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " press ? or esc to close",
            Style::default().fg(C_MUTED),
        )));

        let popup = centered_rect(60, lines.len() as u16 + 2, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_OVERLAY_BORDER))
                        .style(Style::default().bg(C_OVERLAY_BG)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}

type Section = (&'static str, &'static [(&'static str, &'static str)]);

const SHORTCUTS: &[Section] = &[
    (
        "catalog",
        &[
            ("← ↓ ↑ →  or  h j k l", "move highlight"),
            ("enter / click", "play in the mini player"),
            ("o", "open the full-page player"),
        ],
    ),
    (
        "playback",
        &[
            ("space", "play / pause"),
            ("m", "mute (unmute restores the default volume)"),
            ("v / +", "step volume, wraps 100% → 10%"),
            ("r", "loop (mini player)"),
            ("0 … 9", "seek to 0% … 90%"),
            ("click bar", "seek to that point"),
        ],
    ),
    (
        "full player",
        &[
            ("b", "toggle debug overlay"),
            ("y / Y", "copy source / thumbnail url (debug)"),
            ("esc", "back to catalog"),
        ],
    ),
    (
        "ui",
        &[
            ("K", "toggle keys bar"),
            ("?", "toggle this help overlay"),
            ("q / Ctrl+C", "quit"),
        ],
    ),
];

fn shortcut_row(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {:<22}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

/// `percent_x` of the width and `height` rows, centered in `r` and clipped to it.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = (u32::from(r.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::KeyModifiers;
    use spin_core::catalog::Catalog;

    use super::*;
    use crate::action::Route;

    #[test]
    fn test_closes_on_esc_and_swallows_others() {
        let mut state = AppState::new(Catalog::builtin(), Route::Index, true);
        state.show_help = true;
        let mut help = HelpOverlay::new();
        assert_eq!(
            help.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &state),
            vec![Action::ToggleHelp]
        );
        assert!(help
            .handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE), &state)
            .is_empty());
    }

    #[test]
    fn test_centered_rect_fits() {
        let r = centered_rect(50, 10, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 15, 50, 10));
        let clipped = centered_rect(60, 40, Rect::new(0, 0, 80, 20));
        assert_eq!(clipped.height, 20);
        assert_eq!(clipped.y, 0);
    }
}
