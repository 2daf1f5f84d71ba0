//! Button control

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent};

use crate::surface::Surface;
use crate::theme::Styles;
use crate::wizard::PageAction;

use super::{Control, ControlBase, Effect, KeyResponse, Verdict};

/// An activatable label carrying a page-transition action.
///
/// Activation ends the page's input loop; the page machine reads the action
/// tag off the last-activated control and performs the transition. A button
/// may instead carry a disabled reason, shown on attempted activation.
pub struct Button {
    base: ControlBase,
    label: String,
    action: PageAction,
    disabled_reason: Option<String>,
}

impl Button {
    pub fn new(row: u16, col: u16, label: impl Into<String>, action: PageAction) -> Self {
        Self {
            base: ControlBase::new(row, col),
            label: label.into(),
            action,
            disabled_reason: None,
        }
    }

    pub fn action(&self) -> PageAction {
        self.action
    }

    /// Block activation, explaining why when the operator tries anyway.
    pub fn set_disabled_reason(&mut self, reason: Option<String>) {
        self.disabled_reason = reason;
    }

    pub fn is_blocked(&self) -> bool {
        self.disabled_reason.is_some()
    }
}

impl Control for Button {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        let style = if self.disabled_reason.is_some() && !self.base.focused {
            Styles::disabled()
        } else {
            Styles::control(self.base.focused)
        };
        surface.put_str(
            self.base.row,
            self.base.col,
            &format!("[ {} ]", self.label),
            style,
        );
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResponse {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(reason) = &self.disabled_reason {
                    return KeyResponse::with_effects(
                        Verdict::Handled,
                        vec![Effect::Status(reason.clone())],
                    );
                }
                KeyResponse::exit()
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
