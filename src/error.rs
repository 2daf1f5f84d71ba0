//! Error handling module for nodesmith
//!
//! Provides centralized error handling with proper error types using thiserror.
//! All errors in the application should use these types for consistency.
//!
//! The taxonomy follows the recovery policy: `PageWiring` and `PageIndex` are
//! defects in page construction and are never retried; `Validation` is shown
//! to the operator and the wizard loop resumes; `TerminalTooSmall` is reported
//! with a distinct exit status so wrapper scripts can tell it apart.

use thiserror::Error;

/// Main error type for the wizard
#[derive(Error, Debug)]
pub enum WizardError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal/rendering errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// The terminal surface is smaller than the wizard can draw into
    #[error("terminal is {cols}x{rows}, need at least {min_cols}x{min_rows}")]
    TerminalTooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
    },

    /// Page construction defects (no focusable control, broken wiring)
    #[error("page wiring error: {0}")]
    PageWiring(String),

    /// A page transition was requested from an index the flow does not map
    #[error("page index {page} out of range for this action (final page {final_page})")]
    PageIndex { page: usize, final_page: usize },

    /// Validation errors (user input, cross-field inconsistency)
    #[error("Validation error: {0}")]
    Validation(String),

    /// External collaborator failures (disk probe, image catalog)
    #[error("External call failed: {0}")]
    External(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for wizard operations
pub type Result<T> = std::result::Result<T, WizardError>;

// Convenient error constructors
impl WizardError {
    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a page wiring error
    pub fn page_wiring(msg: impl Into<String>) -> Self {
        Self::PageWiring(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an external-call error
    pub fn external(msg: impl Into<String>) -> Self {
        Self::External(msg.into())
    }

    /// True for defects in page construction that must terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PageWiring(_) | Self::PageIndex { .. })
    }
}
