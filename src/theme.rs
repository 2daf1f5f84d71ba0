//! Centralized styling for the wizard screens
//!
//! Single source of truth for the handful of colors the wizard uses. The
//! installer runs full-screen on a linux console, so the palette sticks to
//! the base sixteen colors.

#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

/// Core color palette
pub struct Colors;

impl Colors {
    /// Outer screen background
    pub const SCREEN_BG: Color = Color::Blue;

    /// Inner panel background
    pub const PANEL_BG: Color = Color::White;

    /// Default text on the panel
    pub const FG_PRIMARY: Color = Color::Black;

    /// Muted text (markers, hints)
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Focused-control highlight
    pub const FOCUS_BG: Color = Color::Red;
    pub const FOCUS_FG: Color = Color::White;

    /// Header/title text
    pub const HEADER: Color = Color::Blue;

    /// Status-line feedback
    pub const ERROR: Color = Color::Red;
}

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY).bg(Colors::PANEL_BG)
    }

    /// Muted/secondary text
    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED).bg(Colors::PANEL_BG)
    }

    /// Highlight for the control that owns focus
    pub fn focus() -> Style {
        Style::default().fg(Colors::FOCUS_FG).bg(Colors::FOCUS_BG)
    }

    /// Page header / banner text
    pub fn header() -> Style {
        Style::default()
            .fg(Colors::HEADER)
            .bg(Colors::PANEL_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Status-line errors and rejection messages
    pub fn status_error() -> Style {
        Style::default().fg(Colors::ERROR).bg(Colors::PANEL_BG)
    }

    /// Disabled control text
    pub fn disabled() -> Style {
        Style::default().fg(Colors::FG_MUTED).bg(Colors::PANEL_BG)
    }

    /// Style for a control, picked by focus state
    pub fn control(focused: bool) -> Style {
        if focused {
            Self::focus()
        } else {
            Self::text()
        }
    }
}
