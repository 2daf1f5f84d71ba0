//! Wizard variants
//!
//! One module per wizard kind. Each flow owns the page builders, the ids of
//! the controls it will read back, and the per-page answer collection into
//! the shared parameter record.

mod custom;
mod express;
mod locale;

pub use custom::CustomFlow;
pub use express::ExpressFlow;
pub use locale::LocaleFlow;

/// Wizard screen title shared by every variant's header.
pub const TITLE: &str = "<< Bare-Metal Node Installer >>";
