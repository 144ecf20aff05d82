//! CatalogGrid component: responsive grid of track cards on the index page.
//!
//! Column count follows the terminal width.  Each card shows a disc glyph,
//! the caption clamped to one line, and the formatted duration.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use spin_core::duration::format_duration;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_card_border, style_card_selected, style_playing, style_secondary, C_LABEL, C_PRIMARY},
    widgets::controls::contains,
};

const CARD_WIDTH: u16 = 32;
const CARD_HEIGHT: u16 = 4;

pub struct CatalogGrid {
    selected: usize,
    columns: usize,
    /// First visible row of cards.
    scroll_row: usize,
    /// Card rects from the last draw, paired with catalog indices.
    cards: Vec<(usize, Rect)>,
}

impl CatalogGrid {
    pub fn new() -> Self {
        Self {
            selected: 0,
            columns: 1,
            scroll_row: 0,
            cards: Vec::new(),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Highlight the card for `id`, if it is in the catalog.
    pub fn select_id(&mut self, id: u32, state: &AppState) {
        if let Some(i) = state.catalog.position_of(id) {
            self.selected = i;
        }
    }

    fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let next = self.selected as isize + delta;
        if (0..len as isize).contains(&next) {
            self.selected = next as usize;
        }
    }

    fn selected_id(&self, state: &AppState) -> Option<u32> {
        state.catalog.get(self.selected).map(|t| t.id)
    }

    fn keep_selection_visible(&mut self, visible_rows: usize) {
        let row = self.selected / self.columns.max(1);
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if visible_rows > 0 && row >= self.scroll_row + visible_rows {
            self.scroll_row = row + 1 - visible_rows;
        }
    }
}

impl Default for CatalogGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of card columns that fit in `width`.
pub fn column_count(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

/// Clamp `text` to `max` display columns, ending with `…` when cut.
pub fn clamp_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

impl Component for CatalogGrid {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let len = state.catalog.len();
        let cols = self.columns.max(1) as isize;
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_by(-1, len),
            KeyCode::Right | KeyCode::Char('l') => self.move_by(1, len),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-cols, len),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(cols, len),
            KeyCode::Enter => {
                return self.selected_id(state).map(Action::Select).into_iter().collect();
            }
            KeyCode::Char('o') => {
                return self
                    .selected_id(state)
                    .map(Action::OpenMedia)
                    .into_iter()
                    .collect();
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        if !matches!(event.kind, MouseEventKind::Down(_)) {
            return vec![];
        }
        let hit = self
            .cards
            .iter()
            .find(|(_, r)| contains(*r, event.column, event.row))
            .map(|(i, _)| *i);
        match hit.and_then(|i| state.catalog.get(i).map(|t| (i, t.id))) {
            Some((i, id)) => {
                self.selected = i;
                vec![Action::Select(id)]
            }
            None => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.cards.clear();
        if state.catalog.is_empty() || area.width == 0 || area.height < CARD_HEIGHT {
            return;
        }
        self.columns = column_count(area.width);
        self.selected = self.selected.min(state.catalog.len() - 1);
        let visible_rows = (area.height / CARD_HEIGHT) as usize;
        self.keep_selection_visible(visible_rows);

        let card_w = area.width / self.columns as u16;
        let playing = state.playing_id();

        for (i, track) in state.catalog.tracks().iter().enumerate() {
            let row = i / self.columns;
            if row < self.scroll_row || row >= self.scroll_row + visible_rows {
                continue;
            }
            let col = (i % self.columns) as u16;
            let rect = Rect::new(
                area.x + col * card_w,
                area.y + (row - self.scroll_row) as u16 * CARD_HEIGHT,
                card_w,
                CARD_HEIGHT,
            );

            let is_selected = i == self.selected;
            let is_playing = playing == Some(track.id);
            let highlighted = is_selected && focused;
            let border = style_card_border(highlighted);
            let body = if highlighted {
                style_card_selected()
            } else {
                Style::default().fg(C_PRIMARY)
            };
            let disc = if is_playing {
                Span::styled("◉ ", style_playing())
            } else {
                Span::styled("◎ ", Style::default().fg(C_LABEL))
            };

            let inner_w = card_w.saturating_sub(2) as usize;
            let caption = clamp_to_width(&track.caption(), inner_w.saturating_sub(2));
            let lines = vec![
                Line::from(vec![disc, Span::styled(caption, body.add_modifier(Modifier::BOLD))]),
                Line::from(Span::styled(
                    format!("  {}", format_duration(track.duration_secs)),
                    style_secondary(),
                )),
            ];
            frame.render_widget(
                Paragraph::new(lines).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border),
                ),
                rect,
            );
            self.cards.push((i, rect));
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::{KeyModifiers, MouseButton};
    use spin_core::catalog::Catalog;

    use super::*;
    use crate::action::Route;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        AppState::new(Catalog::builtin(), Route::Index, true)
    }

    #[test]
    fn test_column_count() {
        assert_eq!(column_count(10), 1);
        assert_eq!(column_count(64), 2);
        assert_eq!(column_count(100), 3);
    }

    #[test]
    fn test_clamp_to_width() {
        assert_eq!(clamp_to_width("short", 10), "short");
        assert_eq!(clamp_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(clamp_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(clamp_to_width("abc", 0), "");
    }

    #[test]
    fn test_enter_selects_highlighted_track() {
        let s = state();
        let mut grid = CatalogGrid::new();
        grid.columns = 3;
        assert!(grid.handle_key(key(KeyCode::Right), &s).is_empty());
        let second = s.catalog.get(1).map(|t| t.id);
        assert_eq!(
            grid.handle_key(key(KeyCode::Enter), &s),
            second.map(Action::Select).into_iter().collect::<Vec<_>>()
        );
        assert_eq!(
            grid.handle_key(key(KeyCode::Char('o')), &s),
            second.map(Action::OpenMedia).into_iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_movement_stays_in_bounds() {
        let s = state();
        let mut grid = CatalogGrid::new();
        grid.columns = 2;
        grid.handle_key(key(KeyCode::Up), &s);
        grid.handle_key(key(KeyCode::Left), &s);
        assert_eq!(grid.selected(), 0);
        grid.handle_key(key(KeyCode::Down), &s);
        assert_eq!(grid.selected(), 2);
        grid.handle_key(key(KeyCode::Down), &s);
        assert_eq!(grid.selected(), 2);
    }

    #[test]
    fn test_click_on_card_selects() {
        let s = state();
        let mut grid = CatalogGrid::new();
        grid.cards = vec![(0, Rect::new(0, 0, 30, 4)), (1, Rect::new(30, 0, 30, 4))];
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 35,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        let id = s.catalog.get(1).map(|t| t.id);
        assert_eq!(
            grid.handle_mouse(click, Rect::default(), &s),
            id.map(Action::Select).into_iter().collect::<Vec<_>>()
        );
        assert_eq!(grid.selected(), 1);
    }
}
