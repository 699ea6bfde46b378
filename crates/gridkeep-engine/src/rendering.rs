//! Scrollable message log rendering.
//!
//! [`LogRenderer`] keeps only the viewport size and a scroll offset. The log
//! itself is passed in on every call and its wrapped height is recomputed
//! each time, so the renderer never holds a stale view of the messages.

use crate::components::Rgb;
use crate::console::{get_height_rect, Console};
use crate::message::Message;

/// Viewport over the wrapped message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRenderer {
    width: usize,
    height: usize,
    y_position: usize,
}

impl LogRenderer {
    /// A renderer scrolled to the newest messages.
    pub fn new(log: &[Message], width: usize, height: usize) -> Self {
        let mut renderer = Self {
            width,
            height,
            y_position: 0,
        };
        renderer.y_position = renderer.max_y_position(log);
        renderer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Index of the first visible wrapped line.
    pub fn y_position(&self) -> usize {
        self.y_position
    }

    /// Total wrapped height of `log` at this renderer's width.
    pub fn log_height(&self, log: &[Message]) -> usize {
        log.iter()
            .map(|message| get_height_rect(self.width, &message.text()))
            .sum()
    }

    /// Largest offset that still fills the viewport; 0 for short logs.
    pub fn max_y_position(&self, log: &[Message]) -> usize {
        self.log_height(log).saturating_sub(self.height)
    }

    /// Scroll by `dy` lines, clamped to `[0, max_y_position]`.
    pub fn scroll(&mut self, log: &[Message], dy: i64) {
        let max = self.max_y_position(log);
        let target = i64::try_from(self.y_position)
            .unwrap_or(i64::MAX)
            .saturating_add(dy)
            .max(0);
        self.y_position = usize::try_from(target).unwrap_or(max).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.y_position = 0;
    }

    pub fn scroll_to_end(&mut self, log: &[Message]) {
        self.y_position = self.max_y_position(log);
    }

    /// Draw the visible part of `log` into a fresh console of the viewport
    /// size.
    pub fn render(&self, log: &[Message]) -> Console {
        let mut console = Console::new(self.width, self.height);
        let offset = self.y_position.min(self.max_y_position(log));
        let mut y = -i64::try_from(offset).unwrap_or(0);
        let bottom = i64::try_from(self.height).unwrap_or(i64::MAX);
        for message in log {
            if y >= bottom {
                break;
            }
            let Ok(row) = i32::try_from(y) else {
                break;
            };
            let used = console.print_box(0, row, self.width, 0, &message.text(), Rgb::WHITE);
            y += i64::try_from(used).unwrap_or(0);
        }
        console
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
