//! Radio group control

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent};

use crate::surface::Surface;
use crate::theme::Styles;

use super::{Control, ControlBase, ControlId, Effect, KeyResponse, Verdict};

/// A vertical set of mutually exclusive options.
///
/// Space or left/right cycles the selection. Options can declare dependent
/// controls that are revealed only while that option is selected (the
/// "Other ISO" entry revealing its URL field).
pub struct RadioGroup {
    base: ControlBase,
    options: Vec<String>,
    selected: usize,
    reveal: Vec<(usize, Vec<ControlId>)>,
}

impl RadioGroup {
    pub fn new(row: u16, col: u16, options: Vec<String>) -> Self {
        Self {
            base: ControlBase::new(row, col),
            options,
            selected: 0,
            reveal: Vec::new(),
        }
    }

    /// Show `deps` only while the option at `index` is selected.
    pub fn reveals_on(mut self, index: usize, deps: Vec<ControlId>) -> Self {
        self.reveal.push((index, deps));
        self
    }

    /// Same wiring, for controls registered after this group.
    pub fn set_reveals(&mut self, index: usize, deps: Vec<ControlId>) {
        self.reveal.push((index, deps));
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_option(&self) -> &str {
        self.options
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn reveal_effects(&self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for (index, deps) in &self.reveal {
            let on = *index == self.selected;
            for id in deps {
                effects.push(Effect::SetEnabled(*id, on));
                effects.push(Effect::SetVisible(*id, on));
            }
        }
        effects
    }
}

impl Control for RadioGroup {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        for (i, option) in self.options.iter().enumerate() {
            let mark = if i == self.selected { "(*)" } else { "( )" };
            let style = if i == self.selected {
                Styles::control(self.base.focused)
            } else {
                Styles::text()
            };
            surface.put_str(self.base.row + i as u16, self.base.col, mark, style);
            surface.put_str(
                self.base.row + i as u16,
                self.base.col + 4,
                option,
                Styles::text(),
            );
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResponse {
        if self.options.is_empty() {
            return KeyResponse::not_handled();
        }
        let len = self.options.len();
        match key.code {
            KeyCode::Char(' ') | KeyCode::Right => {
                self.selected = (self.selected + 1) % len;
            }
            KeyCode::Left => {
                self.selected = (self.selected + len - 1) % len;
            }
            _ => return KeyResponse::not_handled(),
        }
        let mut effects = self.reveal_effects();
        effects.push(Effect::Changed);
        KeyResponse::with_effects(Verdict::Handled, effects)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
