//! Rendering surface
//!
//! A clipped character-grid view over a ratatui [`Buffer`]. Controls paint
//! themselves through this and nothing else, so unit tests can draw into an
//! in-memory buffer without a real terminal.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

/// A rectangular drawing region with styled text primitives.
///
/// Rows and columns are relative to the surface origin. Writes outside the
/// region are clipped, never an error: page builders lay controls out against
/// a nominal 80x24 grid and larger terminals simply leave margin.
pub struct Surface<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl<'a> Surface<'a> {
    /// Create a surface over `area` of `buf`. The area is intersected with
    /// the buffer's own bounds.
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        let area = buf.area.intersection(area);
        Self { buf, area }
    }

    pub fn width(&self) -> u16 {
        self.area.width
    }

    pub fn height(&self) -> u16 {
        self.area.height
    }

    /// Paint `text` at (`row`, `col`), truncated at the right edge.
    pub fn put_str(&mut self, row: u16, col: u16, text: &str, style: Style) {
        if row >= self.area.height || col >= self.area.width {
            return;
        }
        let max = (self.area.width - col) as usize;
        self.buf.set_stringn(
            self.area.x + col,
            self.area.y + row,
            text,
            max,
            style,
        );
    }

    /// Overwrite a full row with spaces in `style`.
    pub fn clear_row(&mut self, row: u16, style: Style) {
        if row >= self.area.height {
            return;
        }
        let blanks = " ".repeat(self.area.width as usize);
        self.buf
            .set_stringn(self.area.x, self.area.y + row, &blanks, self.area.width as usize, style);
    }

    /// Fill the whole region with spaces in `style`.
    pub fn fill(&mut self, style: Style) {
        for row in 0..self.area.height {
            self.clear_row(row, style);
        }
    }

    /// Text content of a row, trimmed on the right. Test/diagnostic helper.
    pub fn row_text(&self, row: u16) -> String {
        let mut out = String::new();
        if row >= self.area.height {
            return out;
        }
        for col in 0..self.area.width {
            if let Some(cell) = self.buf.cell((self.area.x + col, self.area.y + row)) {
                out.push_str(cell.symbol());
            }
        }
        out.trim_end().to_string()
    }
}
