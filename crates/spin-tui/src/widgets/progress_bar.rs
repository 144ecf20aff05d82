//! Smooth Unicode progress bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_PLAYING, C_SEPARATOR};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render a smooth progress bar filling `area`'s first row.
/// `progress` is 0.0..=1.0.
pub fn draw_progress(frame: &mut Frame, area: Rect, progress: f64) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let bar = bar_string(progress, area.width as usize);
    let spans = vec![Span::styled(
        bar,
        Style::default().fg(C_PLAYING).bg(C_SEPARATOR),
    )];
    let row = Rect { height: 1, ..area };
    frame.render_widget(Paragraph::new(Line::from(spans)), row);
}

/// `width` cells with 8 eighths per cell.
pub fn bar_string(progress: f64, width: usize) -> String {
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let eighths = (progress * width as f64 * 8.0) as usize;
    let full_blocks = (eighths / 8).min(width);
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full_blocks {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

/// Seek fraction for a click at `column` on a bar drawn in `area`.
///
/// The first cell maps to 0.0 and the last cell to 1.0.  Clicks outside the
/// bar's columns give `None`.
pub fn fraction_at(area: Rect, column: u16) -> Option<f64> {
    if area.width == 0 || column < area.x || column >= area.x + area.width {
        return None;
    }
    if area.width == 1 {
        return Some(0.0);
    }
    let offset = f64::from(column - area.x);
    Some(offset / f64::from(area.width - 1))
}
