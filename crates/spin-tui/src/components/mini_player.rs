//! MiniPlayer component: bottom bar under the catalog.
//!
//! Row 1: progress bar (click to seek).
//! Row 2: thumbnail glyph, name, album | `progress / duration`, volume icon, volume %.
//! Row 3: loop, skip-back, play/pause, skip-forward, shuffle.  Skip and
//!        shuffle are drawn disabled.

use ratatui::crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use spin_core::duration::format_duration;
use unicode_width::UnicodeWidthStr;

use crate::{
    action::Action,
    app_state::{AppState, NowPlaying},
    component::Component,
    components::{catalog_grid::clamp_to_width, player_key},
    theme::{style_secondary, C_PRIMARY, C_LABEL},
    widgets::{
        controls::{
            contains, draw_controls, hit_action, play_glyph, volume_glyph, volume_style, Control,
            HitArea,
        },
        progress_bar::{draw_progress, fraction_at},
    },
};

pub const MINI_PLAYER_HEIGHT: u16 = 3;

#[derive(Default)]
pub struct MiniPlayer {
    bar: Rect,
    hits: Vec<HitArea>,
}

impl MiniPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn transport(np: &NowPlaying) -> Vec<Control> {
    vec![
        Control::new("⟳", Action::ToggleLoop).active(np.is_looping),
        Control::disabled("⏮"),
        Control::new(play_glyph(np.is_playing), Action::TogglePlay).active(np.is_playing),
        Control::disabled("⏭"),
        Control::disabled("⤨"),
    ]
}

impl Component for MiniPlayer {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
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

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        self.hits.clear();
        self.bar = Rect::default();
        let Some(np) = &state.now_playing else {
            return;
        };
        if area.height < MINI_PLAYER_HEIGHT || area.width < 8 {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.bar = rows[0];
        draw_progress(frame, rows[0], np.progress_ratio);

        // ── info row: left = track, right = time + volume ─────────────────────
        let time = format!(
            "{} / {} ",
            format_duration(np.progress_secs),
            format_duration(np.track.duration_secs)
        );
        let icon = volume_glyph(np.volume_icon);
        let pct = format!(" {:>3}% ", np.volume.percent());
        let right_w = (time.width() + icon.width() + pct.width()) as u16;
        let info = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(right_w)])
            .split(rows[1]);

        let left_w = info[0].width.saturating_sub(3) as usize;
        let title = clamp_to_width(
            &format!("{}  {}", np.track.name, np.track.album),
            left_w,
        );
        let name_w = np.track.name.width().min(title.width());
        let (name, album) = split_at_width(&title, name_w);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" ♪ ", Style::default().fg(C_LABEL)),
                Span::styled(
                    name,
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                ),
                Span::styled(album, style_secondary()),
            ])),
            info[0],
        );

        let r = info[1];
        let icon_x = r.x + time.width() as u16;
        let icon_rect = Rect::new(icon_x, r.y, icon.width() as u16, 1);
        let pct_rect = Rect::new(icon_x + icon_rect.width, r.y, pct.width() as u16, 1);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(time, style_secondary()),
                Span::styled(icon, volume_style(np.volume_icon)),
                Span::styled(pct, Style::default().fg(C_PRIMARY)),
            ])),
            r,
        );
        self.hits.push(HitArea {
            rect: icon_rect,
            action: Action::ToggleMute,
        });
        self.hits.push(HitArea {
            rect: pct_rect,
            action: Action::IncreaseVolume,
        });

        self.hits
            .extend(draw_controls(frame, rows[2], &transport(np)));
    }
}

/// Split `s` after its first `width` display columns.
fn split_at_width(s: &str, width: usize) -> (String, String) {
    let mut used = 0;
    for (i, ch) in s.char_indices() {
        if used >= width {
            return (s[..i].to_string(), s[i..].to_string());
        }
        used += unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
    }
    (s.to_string(), String::new())
}
