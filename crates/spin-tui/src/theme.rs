//! Palette for the catalog, players and overlays.

use ratatui::style::{Color, Modifier, Style};

pub const C_BG: Color = Color::Rgb(14, 15, 20);
pub const C_ACCENT: Color = Color::Rgb(236, 112, 99);
pub const C_PLAYING: Color = Color::Rgb(111, 207, 151);
pub const C_MUTED: Color = Color::Rgb(78, 82, 98);
pub const C_SEPARATOR: Color = Color::Rgb(44, 47, 60);
pub const C_SECONDARY: Color = Color::Rgb(130, 134, 156);
pub const C_PRIMARY: Color = Color::Rgb(222, 224, 236);
pub const C_OVERLAY_BG: Color = Color::Rgb(20, 22, 30);
pub const C_OVERLAY_BORDER: Color = Color::Rgb(58, 62, 80);
/// Album names and table headers.
pub const C_LABEL: Color = Color::Rgb(97, 152, 214);

const C_CARD_SELECTED_BG: Color = Color::Rgb(32, 35, 50);
const C_CARD_BORDER: Color = Color::Rgb(44, 47, 60);
const C_CARD_BORDER_SELECTED: Color = Color::Rgb(143, 118, 226);

pub const C_TOAST_OK: Color = C_PLAYING;
pub const C_TOAST_FAIL: Color = C_ACCENT;

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_playing() -> Style {
    Style::default().fg(C_PLAYING)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_card_selected() -> Style {
    Style::default()
        .bg(C_CARD_SELECTED_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_card_border(selected: bool) -> Style {
    if selected {
        Style::default().fg(C_CARD_BORDER_SELECTED)
    } else {
        Style::default().fg(C_CARD_BORDER)
    }
}
