//! Nodesmith library
//!
//! The terminal widget framework and page-driven wizard machinery behind the
//! bare-metal node installer, plus the collaborators the wizard consumes
//! (disk enumeration, image catalog, address validation).

pub mod catalog;
pub mod cli;
pub mod controls;
pub mod dispatcher;
pub mod error;
pub mod hardware;
pub mod net;
pub mod pages;
pub mod params;
pub mod review;
pub mod roles;
pub mod surface;
pub mod theme;
pub mod wizard;

// Re-export main types for convenience
pub use controls::{
    Button, Carousel, Checkbox, ChoiceHandler, ChoiceList, ChoiceListView, Control, ControlId,
    Effect, HandlerPhase, KeyResponse, RadioGroup, ScrollGate, StaticText, TextBlock, TextField,
    Verdict,
};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{Result, WizardError};
pub use params::{Detected, EulaRecord, Imager, InstallParams, JsonImager};
pub use surface::Surface;
pub use wizard::{
    check_min_size, check_terminal, Flow, FlowFlags, PageAction, PageMachine, PageUi, Session,
    SessionEvent, Transition, WizardCtx, WizardKind, WizardOutcome,
};

pub use catalog::{Action, DirCatalog, ImageCatalog};
pub use hardware::{DiskInfo, DiskSource, KeymapSource, LocalectlKeymaps, SysfsDiskSource};
pub use net::{AddressValidator, Ipv4Validator, NetworkParams};
pub use pages::{CustomFlow, ExpressFlow, LocaleFlow};
pub use roles::{DiskRole, RoleMap, RoleSelection};
