//! Drop-down carousel control

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent};

use crate::surface::Surface;
use crate::theme::Styles;

use super::{Control, ControlBase, Effect, KeyResponse, Verdict};

/// A single-line `< value >` selector that wraps on left/right navigation.
///
/// Choices are (display text, opaque handle) pairs; the handle is what the
/// catalog and the parameter extraction care about. A carousel with exactly
/// one choice still takes focus but drops the `< >` affordance.
pub struct Carousel {
    base: ControlBase,
    label: String,
    choices: Vec<(String, String)>,
    selected: usize,
    touched: bool,
}

impl Carousel {
    pub fn new(
        row: u16,
        col: u16,
        label: impl Into<String>,
        choices: Vec<(String, String)>,
        selected: usize,
    ) -> Self {
        let selected = if choices.is_empty() {
            0
        } else {
            selected.min(choices.len() - 1)
        };
        Self {
            base: ControlBase::new(row, col),
            label: label.into(),
            choices,
            selected,
            touched: false,
        }
    }

    /// Mark the initial value as deliberate (auto-detected fields).
    pub fn pre_touched(mut self) -> Self {
        self.touched = true;
        self
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_label(&self) -> &str {
        self.choices
            .get(self.selected)
            .map(|(label, _)| label.as_str())
            .unwrap_or("")
    }

    pub fn selected_handle(&self) -> &str {
        self.choices
            .get(self.selected)
            .map(|(_, handle)| handle.as_str())
            .unwrap_or("")
    }

    /// Whether the operator (or a detected default) ever set this value.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Replace the choice set and reset the selection to the first entry.
    /// Callers repopulating a dependent carousel must cascade its own
    /// dependents themselves; no effects flow from here.
    pub fn set_choices(&mut self, choices: Vec<(String, String)>) {
        self.choices = choices;
        self.selected = 0;
    }

    fn widest(&self) -> usize {
        self.choices
            .iter()
            .map(|(label, _)| label.len() + 4)
            .max()
            .unwrap_or(0)
    }
}

impl Control for Carousel {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        surface.put_str(self.base.row, self.base.col, &self.label, Styles::text());
        let mut text = if self.choices.len() > 1 {
            format!("< {} >", self.selected_label())
        } else {
            self.selected_label().to_string()
        };
        // Pad to the widest choice so a shorter value erases its predecessor.
        let width = self.widest().max(text.len());
        while text.len() < width {
            text.push(' ');
        }
        let col = self.base.col + self.label.len() as u16;
        surface.put_str(self.base.row, col, &text, Styles::control(self.base.focused));
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResponse {
        if self.choices.is_empty() {
            return KeyResponse::not_handled();
        }
        let len = self.choices.len();
        match key.code {
            KeyCode::Left => {
                self.selected = (self.selected + len - 1) % len;
            }
            KeyCode::Right => {
                self.selected = (self.selected + 1) % len;
            }
            _ => return KeyResponse::not_handled(),
        }
        self.touched = true;
        KeyResponse::with_effects(Verdict::Handled, vec![Effect::Changed])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
