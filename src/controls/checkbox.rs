//! Checkbox control

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent};

use crate::surface::Surface;
use crate::theme::Styles;

use super::{Control, ControlBase, ControlId, Effect, KeyResponse, ScrollGate};

/// A `[ ]` / `[x]` toggle with declarative wiring to sibling controls.
///
/// Wiring is fixed at page-build time: peers to deselect when this box is
/// checked, and dependents that are enabled/shown only while it is checked.
/// Toggling is inert while the optional [`ScrollGate`] is still locked.
pub struct Checkbox {
    base: ControlBase,
    label: String,
    selected: bool,
    deselect_when_checked: Vec<ControlId>,
    enable_when_checked: Vec<ControlId>,
    show_when_checked: Vec<ControlId>,
    lock: Option<ScrollGate>,
}

impl Checkbox {
    pub fn new(row: u16, col: u16, label: impl Into<String>, selected: bool) -> Self {
        Self {
            base: ControlBase::new(row, col),
            label: label.into(),
            selected,
            deselect_when_checked: Vec::new(),
            enable_when_checked: Vec::new(),
            show_when_checked: Vec::new(),
            lock: None,
        }
    }

    /// Peer checkboxes forced off whenever this one turns on.
    pub fn deselects_when_checked(mut self, peers: Vec<ControlId>) -> Self {
        self.deselect_when_checked = peers;
        self
    }

    /// Dependents enabled while checked, disabled while unchecked.
    pub fn enables_when_checked(mut self, deps: Vec<ControlId>) -> Self {
        self.enable_when_checked = deps;
        self
    }

    /// Dependents visible while checked, hidden while unchecked.
    pub fn shows_when_checked(mut self, deps: Vec<ControlId>) -> Self {
        self.show_when_checked = deps;
        self
    }

    /// Freeze toggling until the gate is released.
    pub fn locked_by(mut self, gate: ScrollGate) -> Self {
        self.lock = Some(gate);
        self
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Effects that bring dependents in line with the current state.
    fn wiring_effects(&self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.selected {
            for id in &self.deselect_when_checked {
                effects.push(Effect::Deselect(*id));
            }
        }
        for id in &self.enable_when_checked {
            effects.push(Effect::SetEnabled(*id, self.selected));
        }
        for id in &self.show_when_checked {
            effects.push(Effect::SetVisible(*id, self.selected));
        }
        effects
    }
}

impl Control for Checkbox {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        let mark = if self.selected { "[x]" } else { "[ ]" };
        surface.put_str(self.base.row, self.base.col, mark, Styles::control(self.base.focused));
        surface.put_str(self.base.row, self.base.col + 4, &self.label, Styles::text());
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResponse {
        if key.code != KeyCode::Char(' ') {
            return KeyResponse::not_handled();
        }
        if self.lock.as_ref().is_some_and(|gate| gate.is_locked()) {
            // Inert until the gate releases; no mutation, no navigation.
            return KeyResponse::not_handled();
        }
        self.selected = !self.selected;
        KeyResponse::with_effects(super::Verdict::Handled, self.wiring_effects())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn deselect(&mut self) -> Vec<Effect> {
        if !self.selected {
            return Vec::new();
        }
        self.selected = false;
        self.wiring_effects()
    }
}
