//! Scrolling choice list control

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent};

use crate::surface::Surface;
use crate::theme::Styles;

use super::{Control, ControlBase, Effect, KeyResponse, Verdict};

/// Which phase of the two-phase custom-key protocol a handler call is in.
///
/// Every key offered to the list first reaches the handler as a
/// [`HandlerPhase::Probe`]: a chance to retire a transient status message and
/// report whether the rows need refreshing even if the key itself is not one
/// of the registered custom keys. Only a matched custom key produces the
/// second, [`HandlerPhase::Apply`] call, which may mutate external state.
/// Collapsing the two calls changes observable status-line timing; keep them
/// separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerPhase {
    Probe,
    Apply,
}

/// Mutable view of the list a custom-key handler may edit.
pub struct ChoiceListView<'a> {
    /// The (row text, key) pairs backing the list.
    pub choices: &'a mut Vec<(String, String)>,
    /// Absolute index of the row under the cursor.
    pub selected: usize,
    /// Status line rendered under the block; `None` hides it.
    pub status: &'a mut Option<String>,
}

impl ChoiceListView<'_> {
    /// Key of the row under the cursor.
    pub fn selected_key(&self) -> &str {
        self.choices
            .get(self.selected)
            .map(|(_, key)| key.as_str())
            .unwrap_or("")
    }
}

/// Injected handler for domain-specific single-key actions.
/// Returns whether the list must repaint even for an otherwise unhandled key.
pub type ChoiceHandler = Box<dyn FnMut(&mut ChoiceListView<'_>, KeyCode, HandlerPhase) -> bool>;

/// A scrollable pick list with a cursor inside the viewport.
///
/// `top` is the first visible row, `cursor` the offset of the highlighted row
/// within the viewport. After every move the pair is reclamped so that
/// `0 <= cursor < viewport`, `0 <= top`, `top + cursor < len`, and (when the
/// content overfills the viewport) `top + viewport <= len`.
pub struct ChoiceList {
    base: ControlBase,
    label: String,
    choices: Vec<(String, String)>,
    width: u16,
    height: u16,
    top: usize,
    cursor: usize,
    left_mark: String,
    right_mark: String,
    custom_keys: Vec<char>,
    handler: Option<ChoiceHandler>,
    status: Option<String>,
}

impl ChoiceList {
    /// Build a list sized `width` x `height` (frame rows included). When
    /// `current` names a choice key, the viewport is positioned so that row
    /// starts visible: near the top edge, near the bottom edge, or centered.
    pub fn new(
        row: u16,
        col: u16,
        label: impl Into<String>,
        choices: Vec<(String, String)>,
        current: Option<&str>,
        width: u16,
        height: u16,
    ) -> Self {
        let mut list = Self {
            base: ControlBase::new(row, col),
            label: label.into(),
            choices,
            width: width.max(4),
            height: height.max(3),
            top: 0,
            cursor: 0,
            left_mark: "* ".to_string(),
            right_mark: " *".to_string(),
            custom_keys: Vec::new(),
            handler: None,
            status: None,
        };
        if let Some(current) = current {
            list.seek(current);
        }
        list
    }

    /// Replace the cursor marks (e.g. `==> ` / ` <==` on the disk picker).
    pub fn with_marks(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_mark = left.into();
        self.right_mark = right.into();
        self
    }

    /// Register domain keys and the two-phase handler that services them.
    pub fn with_handler(mut self, keys: Vec<char>, handler: ChoiceHandler) -> Self {
        self.custom_keys = keys;
        self.handler = Some(handler);
        self
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn selected_index(&self) -> usize {
        self.top + self.cursor
    }

    pub fn selected_key(&self) -> &str {
        self.choices
            .get(self.selected_index())
            .map(|(_, key)| key.as_str())
            .unwrap_or("")
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    fn viewport(&self) -> usize {
        (self.height - 2) as usize
    }

    fn seek(&mut self, key: &str) {
        let Some(idx) = self.choices.iter().position(|(_, k)| k == key) else {
            return;
        };
        let viewport = self.viewport();
        if idx < viewport {
            self.top = 0;
            self.cursor = idx;
        } else if idx >= self.choices.len().saturating_sub(viewport) {
            self.top = self.choices.len() - viewport;
            self.cursor = idx - self.top;
        } else {
            self.cursor = viewport / 2;
            self.top = idx - self.cursor;
        }
    }

    /// Restore the viewport invariants after any movement.
    fn reclamp(&mut self, top: isize, cursor: isize) {
        let len = self.choices.len() as isize;
        let viewport = self.viewport() as isize;
        let (mut top, mut cursor) = (top, cursor);
        if cursor < 0 {
            top -= 1;
            cursor = 0;
        }
        if cursor >= viewport {
            top += cursor - viewport + 1;
            cursor = viewport - 1;
        }
        if top < 0 {
            top = 0;
        }
        if len >= viewport && top + viewport > len {
            top = len - viewport;
        }
        if top + cursor >= len {
            cursor = (len - top - 1).max(0);
        }
        self.top = top as usize;
        self.cursor = cursor as usize;
    }

    fn run_handler(&mut self, key: KeyCode, phase: HandlerPhase) -> bool {
        let selected = self.top + self.cursor;
        let Some(handler) = self.handler.as_mut() else {
            return false;
        };
        let mut view = ChoiceListView {
            choices: &mut self.choices,
            selected,
            status: &mut self.status,
        };
        handler(&mut view, key, phase)
    }

    fn banner(&self) -> String {
        let width = self.width as usize;
        let pad = width.saturating_sub(self.label.len());
        let left = pad / 2;
        let right = pad - left;
        format!("{}{}{}", "*".repeat(left), self.label, "*".repeat(right))
    }
}

impl Control for ChoiceList {
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
            .saturating_sub(2 + self.left_mark.len() + self.right_mark.len());
        for line_no in self.top..self.top + viewport {
            let text = self
                .choices
                .get(line_no)
                .map(|(label, _)| label.as_str())
                .unwrap_or("");
            let body = format!("{:<usable$.usable$}", text, usable = usable);
            let marked = if line_no == self.top + self.cursor {
                format!("{}{}{}", self.left_mark, body, self.right_mark)
            } else {
                format!(
                    "{}{}{}",
                    " ".repeat(self.left_mark.len()),
                    body,
                    " ".repeat(self.right_mark.len())
                )
            };
            let edge = if self.top != 0 && line_no == self.top {
                '^'
            } else if self.top + viewport < self.choices.len()
                && line_no == self.top + viewport - 1
            {
                'V'
            } else {
                '|'
            };
            surface.put_str(row, self.base.col, &format!("{edge}{marked}{edge}"), Styles::text());
            row += 1;
        }
        surface.put_str(row, self.base.col, &"*".repeat(self.width as usize), style);
        if let Some(status) = &self.status {
            surface.put_str(row + 1, self.base.col, status, Styles::status_error());
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResponse {
        // Phase one: the handler always sees the key, even a pure navigation
        // one, and may demand a repaint (retiring a transient status). The
        // paint pass runs before every blocking read, so the demand itself
        // needs no further action here.
        let _must_draw = self.run_handler(key.code, HandlerPhase::Probe);

        let (top, cursor) = (self.top as isize, self.cursor as isize);
        let viewport = self.viewport() as isize;
        let mut changed = false;
        let (new_top, new_cursor) = match key.code {
            KeyCode::Up => (top, cursor - 1),
            KeyCode::Down => (top, cursor + 1),
            KeyCode::PageUp => (top - viewport, cursor),
            KeyCode::PageDown => (top + viewport, cursor),
            KeyCode::Char(c) if self.custom_keys.contains(&c) => {
                // Phase two: only matched keys apply their mutation; the
                // cursor does not move.
                self.run_handler(key.code, HandlerPhase::Apply);
                changed = true;
                (top, cursor)
            }
            _ => {
                // The key stays unhandled (it may navigate focus) even when
                // the probe demanded a repaint: the probe's mutations stand
                // and the next paint pass picks them up.
                return KeyResponse::not_handled();
            }
        };
        self.reclamp(new_top, new_cursor);
        if changed {
            KeyResponse::with_effects(Verdict::Handled, vec![Effect::Changed])
        } else {
            KeyResponse::handled()
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
