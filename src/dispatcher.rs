//! Focus/input dispatcher
//!
//! Owns the ordered control set of one page, tracks which control has focus,
//! routes key codes to it, and interprets declined keys as focus-navigation
//! commands. Cross-control [`Effect`]s requested by a handler are resolved
//! here, with deselection cascades drained through a bounded queue.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use crate::controls::{Control, ControlId, Effect, Verdict};
use crate::error::{Result, WizardError};
use crate::surface::Surface;

/// Result of dispatching one key.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub verdict: Verdict,
    /// Controls whose selection changed, in occurrence order. The page layer
    /// runs its registered reactions against these.
    pub changed: Vec<ControlId>,
    /// A message for the page status line, if any handler requested one.
    pub status: Option<String>,
}

/// Ordered control collection plus the focus and input protocol.
///
/// Invariant: at most one control has focus, and only controls whose
/// `accepts_focus()` is true ever receive it. A non-empty dispatcher with no
/// focusable control is a page-construction defect and reported as such,
/// never spun on.
#[derive(Default)]
pub struct Dispatcher {
    controls: Vec<Box<dyn Control>>,
    focused: Option<usize>,
    last_activated: Option<ControlId>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control; ids are handed out in traversal order.
    pub fn add(&mut self, control: impl Control + 'static) -> ControlId {
        self.controls.push(Box::new(control));
        ControlId(self.controls.len() - 1)
    }

    /// Discard every control. The old page's controls must be gone before
    /// the next page registers its own, so no stale wiring can fire.
    pub fn clear(&mut self) {
        self.controls.clear();
        self.focused = None;
        self.last_activated = None;
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn focused_id(&self) -> Option<ControlId> {
        self.focused.map(ControlId)
    }

    /// The control whose activation ended the input loop.
    pub fn last_activated(&self) -> Option<ControlId> {
        self.last_activated
    }

    /// Focus the first control that accepts it.
    pub fn focus_first(&mut self) -> Result<()> {
        let first = self
            .controls
            .iter()
            .position(|c| c.accepts_focus())
            .ok_or_else(|| WizardError::page_wiring("page has no focusable control"))?;
        self.move_focus_to(first);
        Ok(())
    }

    /// Registered control ids in traversal order.
    pub fn ids(&self) -> impl Iterator<Item = ControlId> + '_ {
        (0..self.controls.len()).map(ControlId)
    }

    /// Typed access to a registered control.
    pub fn get<T: Control + 'static>(&self, id: ControlId) -> Option<&T> {
        self.controls.get(id.0)?.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Control + 'static>(&mut self, id: ControlId) -> Option<&mut T> {
        self.controls.get_mut(id.0)?.as_any_mut().downcast_mut::<T>()
    }

    /// Paint every visible control. Hidden controls leave their rectangle to
    /// whatever the page painted underneath (a cleared panel).
    pub fn draw(&self, surface: &mut Surface<'_>) {
        for control in &self.controls {
            if control.is_visible() {
                control.draw(surface);
            }
        }
    }

    /// Route one key to the focused control and interpret the verdict.
    pub fn dispatch(&mut self, key: KeyEvent) -> Result<DispatchOutcome> {
        if self.controls.is_empty() {
            return Ok(DispatchOutcome {
                verdict: Verdict::Handled,
                changed: Vec::new(),
                status: None,
            });
        }
        let current = match self.focused {
            Some(idx) => idx,
            None => {
                self.focus_first()?;
                self.focused.unwrap_or(0)
            }
        };

        let response = self.controls[current].handle_key(key);
        let mut outcome = DispatchOutcome {
            verdict: response.verdict,
            changed: Vec::new(),
            status: None,
        };
        self.apply_effects(current, response.effects, &mut outcome);

        match response.verdict {
            Verdict::Exit => {
                self.last_activated = Some(ControlId(current));
            }
            Verdict::Advance => {
                self.shift_focus(current, 1)?;
            }
            Verdict::Handled => {}
            Verdict::NotHandled => match key.code {
                KeyCode::Tab | KeyCode::Enter | KeyCode::Down | KeyCode::Right => {
                    self.shift_focus(current, 1)?;
                }
                KeyCode::BackTab | KeyCode::Up | KeyCode::Left => {
                    self.shift_focus(current, -1)?;
                }
                // any other undecoded key is ignored
                _ => {}
            },
        }

        // An effect may have hidden or disabled the focus owner.
        if let Some(idx) = self.focused {
            if !self.controls[idx].accepts_focus() {
                self.shift_focus(idx, 1)?;
            }
        }

        Ok(outcome)
    }

    /// Move focus to the next/previous control accepting it, wrapping
    /// circularly. Landing back on `from` is legal (single focusable
    /// control); finding nothing at all is a fatal wiring error.
    fn shift_focus(&mut self, from: usize, dir: isize) -> Result<()> {
        let len = self.controls.len() as isize;
        let mut idx = from as isize;
        for _ in 0..len {
            idx = (idx + dir).rem_euclid(len);
            if self.controls[idx as usize].accepts_focus() {
                self.move_focus_to(idx as usize);
                return Ok(());
            }
        }
        Err(WizardError::page_wiring(
            "focus navigation found no focusable control",
        ))
    }

    fn move_focus_to(&mut self, idx: usize) {
        if let Some(old) = self.focused {
            if old != idx {
                self.controls[old].set_focus(false);
            }
        }
        self.controls[idx].set_focus(true);
        self.focused = Some(idx);
    }

    /// Drain requested effects, cascading deselections breadth-first. The
    /// queue is bounded: mutual deselection converges because deselecting an
    /// already-off checkbox is a no-op, and the cap turns a wiring mistake
    /// into a logged warning instead of a hang.
    fn apply_effects(&mut self, source: usize, effects: Vec<Effect>, outcome: &mut DispatchOutcome) {
        let mut queue: VecDeque<(usize, Effect)> =
            effects.into_iter().map(|e| (source, e)).collect();
        let cap = 8 * self.controls.len().max(1);
        let mut applied = 0usize;
        while let Some((src, effect)) = queue.pop_front() {
            applied += 1;
            if applied > cap {
                warn!("effect cascade exceeded {cap} steps; dropping remainder");
                break;
            }
            match effect {
                Effect::Deselect(id) => {
                    if let Some(control) = self.controls.get_mut(id.0) {
                        let cascades = control.deselect();
                        queue.extend(cascades.into_iter().map(|e| (id.0, e)));
                    }
                }
                Effect::SetEnabled(id, enabled) => {
                    if let Some(control) = self.controls.get_mut(id.0) {
                        control.set_enabled(enabled);
                    }
                }
                Effect::SetVisible(id, visible) => {
                    if let Some(control) = self.controls.get_mut(id.0) {
                        control.set_visible(visible);
                    }
                }
                Effect::Changed => outcome.changed.push(ControlId(src)),
                Effect::Status(msg) => outcome.status = Some(msg),
            }
        }
    }
}
