//! Single-line text field control

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent};

use crate::surface::Surface;
use crate::theme::Styles;

use super::{Control, ControlBase, KeyResponse};

/// A labelled edit buffer with an implicit end-of-buffer caret.
///
/// No mid-string editing: printable characters append up to `max_len`,
/// backspace removes the last character. Optional upper-case folding and a
/// digits-only mode cover serial/id fields and numeric fields.
pub struct TextField {
    base: ControlBase,
    label: String,
    buffer: String,
    max_len: usize,
    uppercase: bool,
    numeric: bool,
}

impl TextField {
    pub fn new(
        row: u16,
        col: u16,
        label: impl Into<String>,
        initial: impl Into<String>,
        max_len: usize,
    ) -> Self {
        let mut buffer: String = initial.into();
        buffer.truncate(max_len);
        Self {
            base: ControlBase::new(row, col),
            label: label.into(),
            buffer,
            max_len,
            uppercase: false,
            numeric: false,
        }
    }

    /// Fold inserted characters to upper case.
    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    /// Accept only ASCII digits.
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.buffer.truncate(self.max_len);
    }
}

impl Control for TextField {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        surface.put_str(self.base.row, self.base.col, &self.label, Styles::text());
        let mut value = self.buffer.clone();
        while value.len() < self.max_len {
            value.push(' ');
        }
        let col = self.base.col + self.label.len() as u16 + 1;
        surface.put_str(self.base.row, col, &value, Styles::control(self.base.focused));
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResponse {
        match key.code {
            KeyCode::Backspace => {
                self.buffer.pop();
                KeyResponse::handled()
            }
            KeyCode::Char(c) if !c.is_control() => {
                if self.numeric && !c.is_ascii_digit() {
                    // Consumed but rejected; a stray letter must not move focus.
                    return KeyResponse::handled();
                }
                if self.buffer.len() >= self.max_len {
                    return KeyResponse::handled();
                }
                let c = if self.uppercase { c.to_ascii_uppercase() } else { c };
                self.buffer.push(c);
                KeyResponse::handled()
            }
            _ => KeyResponse::not_handled(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
