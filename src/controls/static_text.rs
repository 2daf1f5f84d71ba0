//! Display-only text control

use std::any::Any;

use crossterm::event::KeyEvent;
use ratatui::style::Style;

use crate::surface::Surface;
use crate::theme::Styles;

use super::{Control, ControlBase, KeyResponse};

/// One or more lines of display-only text. Never takes focus.
pub struct StaticText {
    base: ControlBase,
    lines: Vec<String>,
    style: Style,
}

impl StaticText {
    pub fn new(row: u16, col: u16, text: impl Into<String>) -> Self {
        Self {
            base: ControlBase::new(row, col),
            lines: vec![text.into()],
            style: Styles::text(),
        }
    }

    pub fn multi(row: u16, col: u16, lines: Vec<String>) -> Self {
        Self {
            base: ControlBase::new(row, col),
            lines,
            style: Styles::text(),
        }
    }

    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Control for StaticText {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        for (i, line) in self.lines.iter().enumerate() {
            surface.put_str(self.base.row + i as u16, self.base.col, line, self.style);
        }
    }

    fn handle_key(&mut self, _key: KeyEvent) -> KeyResponse {
        KeyResponse::not_handled()
    }

    fn focusable(&self) -> bool {
        false
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
    use super::*;

    #[test]
    fn test_never_accepts_focus() {
        let t = StaticText::new(0, 0, "note");
        assert!(!t.accepts_focus());
    }
}
