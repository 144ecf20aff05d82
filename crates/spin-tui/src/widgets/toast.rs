//! Short-lived notices drawn over the top-right corner: clipboard results
//! and playback errors.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_TOAST_FAIL, C_TOAST_OK};

const OK_TTL: Duration = Duration::from_secs(3);
const FAIL_TTL: Duration = Duration::from_secs(5);
const VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Success,
    Error,
}

struct Toast {
    message: String,
    severity: Severity,
    repeats: u32,
    expires: Instant,
}

impl Toast {
    fn text(&self) -> String {
        let icon = match self.severity {
            Severity::Success => "✓",
            Severity::Error => "✗",
        };
        if self.repeats > 1 {
            format!(" {} {} ×{} ", icon, self.message, self.repeats)
        } else {
            format!(" {} {} ", icon, self.message)
        }
    }
}

#[derive(Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A message equal to a live one refreshes it and bumps its repeat count.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity, ttl: Duration) {
        let message = message.into();
        let expires = Instant::now() + ttl;
        let repeats = match self.toasts.iter().position(|t| t.message == message) {
            Some(i) => self.toasts.remove(i).map_or(1, |old| old.repeats + 1),
            None => 1,
        };
        self.toasts.push_back(Toast {
            message,
            severity,
            repeats,
            expires,
        });
        if self.toasts.len() > VISIBLE {
            self.toasts.pop_front();
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, OK_TTL);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, FAIL_TTL);
    }

    /// Drops expired notices; true when the screen needs a redraw.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires > now);
        before != self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let max_w = (area.width / 2).clamp(24, 60).min(area.width);
        let rows = area.height.saturating_sub(1) as usize;
        for (row, toast) in self.toasts.iter().rev().take(rows).enumerate() {
            let text = toast.text();
            let w = (text.width() as u16).min(max_w);
            let rect = Rect::new(
                area.x + area.width.saturating_sub(w + 1),
                area.y + 1 + row as u16,
                w,
                1,
            );
            let color = match toast.severity {
                Severity::Success => C_TOAST_OK,
                Severity::Error => C_TOAST_FAIL,
            };
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))),
                rect,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_error_counts_instead_of_stacking() {
        let mut t = ToastManager::new();
        t.error("mpv not found");
        t.error("mpv not found");
        t.error("mpv not found");
        assert_eq!(t.len(), 1);
        assert_eq!(t.toasts[0].repeats, 3);
        assert!(t.toasts[0].text().ends_with("×3 "));
    }

    #[test]
    fn test_oldest_dropped_past_visible_limit() {
        let mut t = ToastManager::new();
        for i in 0..6 {
            t.success(format!("copied {}", i));
        }
        assert_eq!(t.len(), VISIBLE);
        assert_eq!(t.toasts[0].message, "copied 2");
    }

    #[test]
    fn test_expired_toasts_removed() {
        let mut t = ToastManager::new();
        t.push("gone", Severity::Success, Duration::ZERO);
        t.success("stays");
        assert!(t.tick());
        assert_eq!(t.len(), 1);
        assert!(!t.tick());
    }
}
