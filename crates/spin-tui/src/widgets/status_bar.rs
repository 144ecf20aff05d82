//! Status bar: bottom line with the current page and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Route;
use crate::theme::{C_MUTED, C_SECONDARY, C_SEPARATOR};

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

pub fn keys_hint(route: Route, player_mounted: bool) -> &'static str {
    match (route, player_mounted) {
        (Route::Index, false) => " ←↓↑→/hjkl move  Enter play  o open  K keys  ? help  q quit",
        (Route::Index, true) => {
            " ←↓↑→/hjkl move  Enter play  o open  Space pause  m mute  v vol  r loop  0-9 seek  K keys  ? help  q quit"
        }
        (Route::Media(_), _) => {
            " Space pause  m mute  v vol  0-9 seek  b debug  y copy  Esc back  K keys  ? help  q quit"
        }
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, route: Route, player_mounted: bool) {
    let label = match route {
        Route::Index => "CATALOG",
        Route::Media(_) => "PLAYER",
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default()
                .fg(C_SECONDARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys_hint(route, player_mounted), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
