//! Scrolling text block control

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent};

use crate::surface::Surface;
use crate::theme::Styles;

use super::{Control, ControlBase, KeyResponse, ScrollGate};

/// An immutable block of lines behind a viewport smaller than the content.
///
/// Only the scroll offset moves; there is no cursor. `^` and `V` markers on
/// the frame show that more content exists above/below. The block records
/// whether the final line has ever been visible, and optionally releases a
/// [`ScrollGate`] at that point (the license-acceptance wiring).
pub struct TextBlock {
    base: ControlBase,
    label: String,
    lines: Vec<String>,
    width: u16,
    height: u16,
    margin: u16,
    top: usize,
    end_seen: bool,
    gate: Option<ScrollGate>,
}

impl TextBlock {
    pub fn new(
        row: u16,
        col: u16,
        label: impl Into<String>,
        lines: Vec<String>,
        width: u16,
        height: u16,
        margin: u16,
    ) -> Self {
        let mut block = Self {
            base: ControlBase::new(row, col),
            label: label.into(),
            lines,
            width: width.max(4),
            height: height.max(3),
            margin,
            top: 0,
            end_seen: false,
            gate: None,
        };
        block.note_position();
        block
    }

    /// Release `gate` once the content has been scrolled to its end.
    pub fn releases(mut self, gate: ScrollGate) -> Self {
        self.gate = Some(gate);
        // Content that fits entirely counts as already read.
        if self.end_seen {
            if let Some(gate) = &self.gate {
                gate.release();
            }
        }
        self
    }

    /// Whether the last line has ever been inside the viewport.
    pub fn scrolled_to_end(&self) -> bool {
        self.end_seen
    }

    pub fn top(&self) -> usize {
        self.top
    }

    fn viewport(&self) -> usize {
        (self.height - 2) as usize
    }

    fn max_top(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport())
    }

    fn note_position(&mut self) {
        if self.top + self.viewport() >= self.lines.len() {
            self.end_seen = true;
            if let Some(gate) = &self.gate {
                gate.release();
            }
        }
    }

    fn banner(&self) -> String {
        let width = self.width as usize;
        let pad = width.saturating_sub(self.label.len());
        let left = pad / 2;
        let right = pad - left;
        format!("{}{}{}", "*".repeat(left), self.label, "*".repeat(right))
    }
}

impl Control for TextBlock {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        let style = Styles::control(self.base.focused);
        let mut row = self.base.row;
        surface.put_str(row, self.base.col, &self.banner(), style);
        row += 1;

        let viewport = self.viewport();
        let usable = (self.width as usize)
            .saturating_sub(2 + 2 * self.margin as usize);
        let margin = " ".repeat(self.margin as usize);
        for line_no in self.top..self.top + viewport {
            let text = self.lines.get(line_no).map(String::as_str).unwrap_or("");
            let edge = if self.top != 0 && line_no == self.top {
                '^'
            } else if self.top + viewport < self.lines.len()
                && line_no == self.top + viewport - 1
            {
                'V'
            } else {
                '|'
            };
            let body = format!("{:<usable$.usable$}", text, usable = usable);
            let rendered = format!("{edge}{margin}{body}{margin}{edge}");
            surface.put_str(row, self.base.col, &rendered, Styles::text());
            row += 1;
        }
        surface.put_str(row, self.base.col, &"*".repeat(self.width as usize), style);
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResponse {
        let viewport = self.viewport();
        let top = self.top as isize;
        let new_top = match key.code {
            KeyCode::Up => top - 1,
            KeyCode::Down => top + 1,
            KeyCode::PageUp => top - (viewport as isize - 1),
            KeyCode::PageDown => top + (viewport as isize - 1),
            _ => return KeyResponse::not_handled(),
        };
        self.top = new_top.clamp(0, self.max_top() as isize) as usize;
        self.note_position();
        KeyResponse::handled()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::key;
    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    /// height 6 => viewport of 4 content rows
    fn block(lines: usize) -> TextBlock {
        TextBlock::new(0, 0, "License", numbered(lines), 30, 6, 1)
    }

    #[test]
    fn test_scroll_clamps_at_both_ends() {
        let mut b = block(10);
        b.handle_key(key(KeyCode::Up));
        assert_eq!(b.top(), 0);
        for _ in 0..20 {
            b.handle_key(key(KeyCode::Down));
        }
        assert_eq!(b.top(), 6); // 10 lines - 4 viewport
    }

    #[test]
    fn test_page_moves_by_viewport_minus_one() {
        let mut b = block(20);
        b.handle_key(key(KeyCode::PageDown));
        assert_eq!(b.top(), 3);
        b.handle_key(key(KeyCode::PageUp));
        assert_eq!(b.top(), 0);
    }

    #[test]
    fn test_end_seen_only_after_reaching_bottom() {
        let mut b = block(10);
        assert!(!b.scrolled_to_end());
        for _ in 0..5 {
            b.handle_key(key(KeyCode::Down));
        }
        assert!(!b.scrolled_to_end());
        b.handle_key(key(KeyCode::Down));
        assert!(b.scrolled_to_end());
        // scrolling back up does not forget
        b.handle_key(key(KeyCode::PageUp));
        assert!(b.scrolled_to_end());
    }

    #[test]
    fn test_short_content_counts_as_read() {
        let b = block(3);
        assert!(b.scrolled_to_end());
    }

    #[test]
    fn test_gate_released_at_end() {
        let gate = ScrollGate::locked();
        let mut b = block(6).releases(gate.clone());
        assert!(gate.is_locked());
        for _ in 0..2 {
            b.handle_key(key(KeyCode::Down));
        }
        assert!(!gate.is_locked());
    }

    #[test]
    fn test_fitting_content_releases_gate_immediately() {
        let gate = ScrollGate::locked();
        let _b = block(2).releases(gate.clone());
        assert!(!gate.is_locked());
    }
}
