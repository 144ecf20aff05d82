//! Transport buttons and volume glyphs shared by both players.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use spin_core::playback::VolumeIcon;
use unicode_width::UnicodeWidthStr;

use crate::action::Action;
use crate::theme::{C_ACCENT, C_MUTED, C_PLAYING, C_PRIMARY, C_SEPARATOR};

pub struct Control {
    pub label: String,
    /// `None` draws the button disabled.
    pub action: Option<Action>,
    pub active: bool,
}

impl Control {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action: Some(action),
            active: false,
        }
    }

    pub fn disabled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: None,
            active: false,
        }
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    fn width(&self) -> u16 {
        self.label.width() as u16 + 2
    }
}

/// A drawn button's hit area and the action it triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct HitArea {
    pub rect: Rect,
    pub action: Action,
}

/// Draw `controls` centered on `area`'s first row and return the clickable
/// areas of the enabled ones.
pub fn draw_controls(frame: &mut Frame, area: Rect, controls: &[Control]) -> Vec<HitArea> {
    if area.width == 0 || area.height == 0 {
        return Vec::new();
    }
    let gap = 1u16;
    let total: u16 = controls.iter().map(|c| c.width() + gap).sum::<u16>().saturating_sub(gap);
    let mut x = area.x + area.width.saturating_sub(total) / 2;
    let right = area.x + area.width;

    let mut hits = Vec::new();
    for control in controls {
        let w = control.width();
        if x + w > right {
            break;
        }
        let rect = Rect::new(x, area.y, w, 1);
        let style = match (&control.action, control.active) {
            (None, _) => Style::default().fg(C_MUTED),
            (Some(_), true) => Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD),
            (Some(_), false) => Style::default().fg(C_PRIMARY),
        };
        let span = Span::styled(format!(" {} ", control.label), style.bg(C_SEPARATOR));
        frame.render_widget(Paragraph::new(Line::from(span)), rect);
        if let Some(action) = &control.action {
            hits.push(HitArea {
                rect,
                action: action.clone(),
            });
        }
        x += w + gap;
    }
    hits
}

/// Action of the hit area under (`col`, `row`).
pub fn hit_action(hits: &[HitArea], col: u16, row: u16) -> Option<Action> {
    hits.iter()
        .find(|h| contains(h.rect, col, row))
        .map(|h| h.action.clone())
}

pub fn contains(r: Rect, col: u16, row: u16) -> bool {
    r.width > 0
        && r.height > 0
        && col >= r.x
        && col < r.x + r.width
        && row >= r.y
        && row < r.y + r.height
}

pub fn play_glyph(is_playing: bool) -> &'static str {
    if is_playing {
        "❚❚"
    } else {
        "▶"
    }
}

pub fn volume_glyph(icon: VolumeIcon) -> &'static str {
    match icon {
        VolumeIcon::Off => "🔇",
        VolumeIcon::Low => "🔈",
        VolumeIcon::Medium => "🔉",
        VolumeIcon::High => "🔊",
    }
}

pub fn volume_style(icon: VolumeIcon) -> Style {
    match icon {
        VolumeIcon::Off => Style::default().fg(C_ACCENT),
        _ => Style::default().fg(C_PRIMARY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_action_picks_enabled_button() {
        let hits = vec![
            HitArea {
                rect: Rect::new(2, 5, 4, 1),
                action: Action::ToggleLoop,
            },
            HitArea {
                rect: Rect::new(7, 5, 4, 1),
                action: Action::TogglePlay,
            },
        ];
        assert_eq!(hit_action(&hits, 3, 5), Some(Action::ToggleLoop));
        assert_eq!(hit_action(&hits, 10, 5), Some(Action::TogglePlay));
        assert_eq!(hit_action(&hits, 6, 5), None);
        assert_eq!(hit_action(&hits, 3, 6), None);
    }
}
