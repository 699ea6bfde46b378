//! In-memory character console and the display surface contract.
//!
//! A [`Console`] is a grid of [`Cell`]s (glyph, foreground, background).
//! States draw into one console per frame; the interpreter then hands the
//! finished frame to a [`DisplaySurface`] to present it.
//!
//! Every write is an overwrite (no blending). Writes that fall outside the
//! console are clipped, so callers may draw partially off-screen text.

use std::io::{self, Write};

use crate::components::Rgb;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::WHITE,
            bg: Rgb::BLACK,
        }
    }
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// A fixed-size grid of cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Console {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Console {
    /// A blank console of `width` x `height` cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Whether `(x, y)` lies inside the console.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.get(self.index(x, y)?)
    }

    /// Overwrite one cell's glyph and foreground. `bg` is kept unless given.
    pub fn put(&mut self, x: i32, y: i32, ch: char, fg: Rgb, bg: Option<Rgb>) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let cell = &mut self.cells[i];
        cell.ch = ch;
        cell.fg = fg;
        if let Some(bg) = bg {
            cell.bg = bg;
        }
    }

    /// Reset every cell to a blank space on black.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Print `text` on one row starting at `(x, y)`. Characters past the
    /// right edge are dropped.
    pub fn print(&mut self, x: i32, y: i32, text: &str, fg: Rgb, bg: Option<Rgb>) {
        for (i, ch) in text.chars().enumerate() {
            let Ok(offset) = i32::try_from(i) else {
                break;
            };
            self.put(x + offset, y, ch, fg, bg);
        }
    }

    /// Print `text` word-wrapped to `width` columns starting at `(x, y)`.
    ///
    /// A `height` of 0 means unlimited (clipped only by the console). Returns
    /// the number of wrapped lines the text occupies, including lines that
    /// were clipped.
    pub fn print_box(
        &mut self,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        text: &str,
        fg: Rgb,
    ) -> usize {
        let lines = wrap(text, width);
        for (row, line) in lines.iter().enumerate() {
            if height != 0 && row >= height {
                break;
            }
            let Ok(row) = i32::try_from(row) else {
                break;
            };
            self.print(x, y + row, line, fg, None);
        }
        lines.len()
    }

    /// Draw a single-line frame with an optional title centred on the top
    /// edge. The interior is cleared to `bg`.
    pub fn draw_frame(&mut self, x: i32, y: i32, width: i32, height: i32, title: &str, fg: Rgb, bg: Rgb) {
        if width < 2 || height < 2 {
            return;
        }
        let (right, bottom) = (x + width - 1, y + height - 1);
        for cy in y..=bottom {
            for cx in x..=right {
                let ch = match (cx == x || cx == right, cy == y || cy == bottom) {
                    (true, true) => '+',
                    (false, true) => '-',
                    (true, false) => '|',
                    (false, false) => ' ',
                };
                self.put(cx, cy, ch, fg, Some(bg));
            }
        }
        if !title.is_empty() {
            let label = format!(" {title} ");
            let len = i32::try_from(label.chars().count()).unwrap_or(width);
            let start = x + ((width - len) / 2).max(1);
            self.print(start, y, &label, bg, Some(fg));
        }
    }

    /// Copy every cell of `self` into `dest` with its top-left at
    /// `(dest_x, dest_y)`, clipping to `dest`.
    pub fn blit(&self, dest: &mut Console, dest_x: i32, dest_y: i32) {
        for (row, cells) in self.cells.chunks(self.width.max(1)).enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let (Ok(col), Ok(row)) = (i32::try_from(col), i32::try_from(row)) else {
                    continue;
                };
                if let Some(i) = dest.index(dest_x + col, dest_y + row) {
                    dest.cells[i] = *cell;
                }
            }
        }
    }

    /// Divide the foreground and background channels of every cell.
    pub fn dim(&mut self, divisor: u8) {
        for cell in &mut self.cells {
            cell.fg = cell.fg.dimmed(divisor);
            cell.bg = cell.bg.dimmed(divisor);
        }
    }

    /// The glyphs of each row as plain text, trailing blanks trimmed.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.chunks(self.width.max(1)).map(|row| {
            let line: String = row.iter().map(|cell| cell.ch).collect();
            line.trim_end().to_owned()
        })
    }
}

/// The number of lines `text` occupies when word-wrapped to `width`.
pub fn get_height_rect(width: usize, text: &str) -> usize {
    wrap(text, width).len()
}

/// Greedy word wrap. Explicit newlines always break; words longer than
/// `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let gap = usize::from(line_len > 0);
            if line_len + gap + word.len() > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            } else if gap == 1 {
                line.push(' ');
                line_len += 1;
            }
            line_len += word.len();
            line.extend(word);
        }
        lines.push(line);
    }
    lines
}

// ---------------------------------------------------------------------------
// DisplaySurface
// ---------------------------------------------------------------------------

/// Presents finished frames to the user.
pub trait DisplaySurface {
    /// Show `console` as the current frame.
    fn present(&mut self, console: &Console) -> io::Result<()>;
}

/// Presents frames as plain text on a writer, one line per console row.
///
/// Colors are dropped. Each frame is followed by a blank separator line.
pub struct TextDisplay<W: Write> {
    out: W,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for TextDisplay<W> {
    fn present(&mut self, console: &Console) -> io::Result<()> {
        for row in console.rows() {
            writeln!(self.out, "{row}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
