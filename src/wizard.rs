//! Wizard page machine
//!
//! An ordered, possibly-branching sequence of pages. Each page builds a fresh
//! set of controls into the dispatcher, wires its reactions, and exits
//! through a [`Button`] carrying a [`PageAction`]; the machine performs the
//! transition: tear down and build the next page, rebuild a prior page, or
//! terminate the loop. Page branching (whether the network page exists at
//! all) is fixed by [`FlowFlags`] at wizard start and never changes mid-run.

use std::rc::Rc;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::layout::{Margin, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};
use ratatui::{Frame, Terminal};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info, warn};

use crate::catalog::ImageCatalog;
use crate::controls::{Button, ControlId, Verdict};
use crate::dispatcher::Dispatcher;
use crate::error::{Result, WizardError};
use crate::hardware::DiskInfo;
use crate::net::AddressValidator;
use crate::params::{Detected, InstallParams};
use crate::surface::Surface;
use crate::theme::{Colors, Styles};

/// Smallest terminal the wizard will draw into.
pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 24;

/// Which wizard variant is running. An explicit tag, never a type test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum WizardKind {
    /// Node identity and imaging action, optional network page, review.
    Express,
    /// Disk role assignment and network, then license acceptance.
    Custom,
    /// Keyboard layout selection only.
    Locale,
}

/// Branch switches evaluated once at wizard start.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowFlags {
    /// Collect network parameters (adds the network page to Express).
    pub network_setup: bool,
    /// Offer single-node cluster creation (adds the checkbox + DNS field).
    pub one_node_cluster: bool,
}

/// What a button activation asks the machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    /// Advance to the next page, or finish from the final page.
    Proceed,
    /// Rebuild the previous page; from page zero this cancels the wizard.
    Back,
    /// Rebuild page zero (review page "No").
    BackToStart,
    /// Abandon the wizard.
    Cancel,
    /// Run the flow's validation, then finish; rejection stays on the page.
    Confirm,
}

/// Result of a page transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Build the page at this index.
    Build(usize),
    /// The wizard run is complete.
    Finish,
    /// The wizard run was abandoned.
    Cancel,
}

/// Current/final page indices and the transition rules over them.
///
/// An index outside `0..=final_page` means a case arm went missing as pages
/// were added; that is a defect, reported fatally rather than guessed around.
#[derive(Debug, Clone, Copy)]
pub struct PageMachine {
    page: usize,
    final_page: usize,
}

impl PageMachine {
    pub fn new(final_page: usize) -> Self {
        Self {
            page: 0,
            final_page,
        }
    }

    /// Construct at an arbitrary index. Exists so the out-of-range guard is
    /// testable; normal construction starts at page zero.
    pub fn with_page(page: usize, final_page: usize) -> Self {
        Self { page, final_page }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn final_page(&self) -> usize {
        self.final_page
    }

    pub fn is_final(&self) -> bool {
        self.page == self.final_page
    }

    fn guard(&self) -> Result<()> {
        if self.page > self.final_page {
            return Err(WizardError::PageIndex {
                page: self.page,
                final_page: self.final_page,
            });
        }
        Ok(())
    }

    pub fn proceed(&mut self) -> Result<Transition> {
        self.guard()?;
        if self.page == self.final_page {
            return Ok(Transition::Finish);
        }
        self.page += 1;
        Ok(Transition::Build(self.page))
    }

    pub fn back(&mut self) -> Result<Transition> {
        self.guard()?;
        if self.page == 0 {
            return Ok(Transition::Cancel);
        }
        self.page -= 1;
        Ok(Transition::Build(self.page))
    }

    pub fn restart(&mut self) -> Result<Transition> {
        self.guard()?;
        self.page = 0;
        Ok(Transition::Build(0))
    }
}

/// Shared state for one wizard run: the accumulating answers, the branch
/// flags, detected hardware defaults, and the external collaborators. Scoped
/// to the run; nothing here is process-wide.
pub struct WizardCtx {
    pub params: InstallParams,
    pub flags: FlowFlags,
    pub detected: Detected,
    pub disks: Vec<DiskInfo>,
    pub catalog: Rc<dyn ImageCatalog>,
    pub validator: Rc<dyn AddressValidator>,
}

/// A reaction re-runs page wiring when a named control reports a change
/// (e.g. the action carousel repopulating the image carousels).
pub struct Reaction {
    source: ControlId,
    run: Box<dyn FnMut(&mut Dispatcher, &mut WizardCtx)>,
}

/// The per-page UI state a flow populates in `build_page`.
#[derive(Default)]
pub struct PageUi {
    pub dispatcher: Dispatcher,
    reactions: Vec<Reaction>,
    pub status: Option<String>,
}

impl PageUi {
    /// Register a reaction against `source`'s change notifications.
    pub fn react(
        &mut self,
        source: ControlId,
        run: impl FnMut(&mut Dispatcher, &mut WizardCtx) + 'static,
    ) {
        self.reactions.push(Reaction {
            source,
            run: Box::new(run),
        });
    }

    fn reset(&mut self) {
        self.dispatcher.clear();
        self.reactions.clear();
        self.status = None;
    }
}

/// One wizard variant: page builders, per-page answer collection, and the
/// confirm-time validation predicate.
pub trait Flow {
    fn kind(&self) -> WizardKind;

    /// Highest page index for this run, given the branch flags.
    fn final_page(&self, flags: &FlowFlags) -> usize;

    /// Fixed header region redrawn above every page.
    fn header_lines(&self, ctx: &WizardCtx) -> Vec<String>;

    /// Construct and register this page's controls, including conditional
    /// default visibility derived from previously collected answers.
    fn build_page(&mut self, page: usize, ctx: &mut WizardCtx, ui: &mut PageUi) -> Result<()>;

    /// Copy this page's answers into `ctx.params`. Runs as the page
    /// completes; extraction never reads controls from torn-down pages.
    fn collect(&mut self, page: usize, ctx: &mut WizardCtx, dispatcher: &Dispatcher) -> Result<()>;

    /// Confirm-time validation. An `Err` message keeps the wizard on the
    /// current page with the message displayed.
    fn validate(&self, ctx: &WizardCtx) -> std::result::Result<(), String>;
}

/// Did the wizard produce answers or was it abandoned?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    Completed,
    Cancelled,
}

/// What the session wants after one key: keep looping or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Continue,
    Finished(WizardOutcome),
}

/// One wizard run: a flow, its page machine, and the live page UI.
///
/// The event protocol is synchronous and single-threaded: feed key events to
/// [`Session::handle_key`] and redraw between them. [`Session::run`] wraps
/// that in a blocking terminal loop.
pub struct Session {
    flow: Box<dyn Flow>,
    machine: PageMachine,
    pub ctx: WizardCtx,
    ui: PageUi,
    started: bool,
}

impl Session {
    pub fn new(flow: Box<dyn Flow>, ctx: WizardCtx) -> Self {
        let machine = PageMachine::new(flow.final_page(&ctx.flags));
        Self {
            flow,
            machine,
            ctx,
            ui: PageUi::default(),
            started: false,
        }
    }

    pub fn kind(&self) -> WizardKind {
        self.flow.kind()
    }

    pub fn page(&self) -> usize {
        self.machine.page()
    }

    pub fn status(&self) -> Option<&str> {
        self.ui.status.as_deref()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.ui.dispatcher
    }

    /// Build the first page. Idempotent; later calls are no-ops.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        info!(kind = %self.flow.kind(), final_page = self.machine.final_page(), "wizard starting");
        self.rebuild()
    }

    /// Tear down the current page and build the one at the machine's index.
    fn rebuild(&mut self) -> Result<()> {
        self.ui.reset();
        self.flow
            .build_page(self.machine.page(), &mut self.ctx, &mut self.ui)?;
        self.ui.dispatcher.focus_first()?;
        debug!(page = self.machine.page(), controls = self.ui.dispatcher.len(), "page built");
        Ok(())
    }

    /// Re-present the current page with a validation message. Used when the
    /// extracted parameters are rejected after the loop finished.
    pub fn resume_with_error(&mut self, message: String) -> Result<()> {
        warn!(%message, "re-entering wizard after rejected parameters");
        self.rebuild()?;
        self.ui.status = Some(message);
        Ok(())
    }

    /// Feed one key event through dispatch, reactions, and transitions.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<SessionEvent> {
        let outcome = self.ui.dispatcher.dispatch(key)?;
        if let Some(status) = outcome.status {
            self.ui.status = Some(status);
        }
        if !outcome.changed.is_empty() {
            let PageUi {
                dispatcher,
                reactions,
                ..
            } = &mut self.ui;
            for id in &outcome.changed {
                for reaction in reactions.iter_mut() {
                    if reaction.source == *id {
                        (reaction.run)(dispatcher, &mut self.ctx);
                    }
                }
            }
        }
        if outcome.verdict == Verdict::Exit {
            self.on_activation()
        } else {
            Ok(SessionEvent::Continue)
        }
    }

    fn on_activation(&mut self) -> Result<SessionEvent> {
        let Some(id) = self.ui.dispatcher.last_activated() else {
            return Ok(SessionEvent::Continue);
        };
        let Some(action) = self.ui.dispatcher.get::<Button>(id).map(Button::action) else {
            return Ok(SessionEvent::Continue);
        };
        debug!(?action, page = self.machine.page(), "page action");
        match action {
            PageAction::Cancel => Ok(SessionEvent::Finished(WizardOutcome::Cancelled)),
            PageAction::Proceed => {
                self.flow
                    .collect(self.machine.page(), &mut self.ctx, &self.ui.dispatcher)?;
                let transition = self.machine.proceed()?;
                self.transition(transition)
            }
            PageAction::Confirm => {
                self.flow
                    .collect(self.machine.page(), &mut self.ctx, &self.ui.dispatcher)?;
                if let Err(message) = self.flow.validate(&self.ctx) {
                    warn!(%message, "validation rejected the advance");
                    self.ui.status = Some(message);
                    return Ok(SessionEvent::Continue);
                }
                let transition = self.machine.proceed()?;
                self.transition(transition)
            }
            PageAction::Back => {
                let transition = self.machine.back()?;
                self.transition(transition)
            }
            PageAction::BackToStart => {
                let transition = self.machine.restart()?;
                self.transition(transition)
            }
        }
    }

    fn transition(&mut self, transition: Transition) -> Result<SessionEvent> {
        match transition {
            Transition::Build(page) => {
                debug!(page, "building page");
                self.rebuild()?;
                Ok(SessionEvent::Continue)
            }
            Transition::Finish => Ok(SessionEvent::Finished(WizardOutcome::Completed)),
            Transition::Cancel => Ok(SessionEvent::Finished(WizardOutcome::Cancelled)),
        }
    }

    /// Paint the full screen: outer backdrop, bordered panel, header region,
    /// controls, status line.
    pub fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let buf = frame.buffer_mut();

        Surface::new(buf, area).fill(Style::default().bg(Colors::SCREEN_BG));
        let panel = area.inner(Margin {
            horizontal: 1,
            vertical: 1,
        });
        Block::bordered().style(Styles::text()).render(panel, buf);

        let content = panel.inner(Margin {
            horizontal: 2,
            vertical: 1,
        });
        let mut surface = Surface::new(buf, content);
        surface.fill(Styles::text());
        for (i, line) in self.flow.header_lines(&self.ctx).iter().enumerate() {
            surface.put_str(i as u16, 0, line, Styles::header());
        }
        self.ui.dispatcher.draw(&mut surface);
        if let Some(status) = &self.ui.status {
            let row = content.height.saturating_sub(1);
            surface.clear_row(row, Styles::text());
            surface.put_str(row, 0, &format!("ERROR: {status}"), Styles::status_error());
        }
    }

    /// Blocking terminal loop: draw, read one key, dispatch, repeat. Returns
    /// once the wizard completes with valid parameters or is cancelled.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<WizardOutcome> {
        self.start()?;
        loop {
            let size = terminal
                .size()
                .map_err(|e| WizardError::terminal(e.to_string()))?;
            check_min_size(Rect::new(0, 0, size.width, size.height))?;
            terminal
                .draw(|frame| self.render(frame))
                .map_err(|e| WizardError::terminal(e.to_string()))?;
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    match self.handle_key(key)? {
                        SessionEvent::Continue => {}
                        SessionEvent::Finished(WizardOutcome::Cancelled) => {
                            info!("wizard cancelled");
                            return Ok(WizardOutcome::Cancelled);
                        }
                        SessionEvent::Finished(WizardOutcome::Completed) => {
                            match self.ctx.params.validate() {
                                Ok(()) => {
                                    info!("wizard completed with valid parameters");
                                    return Ok(WizardOutcome::Completed);
                                }
                                Err(message) => self.resume_with_error(message)?,
                            }
                        }
                    }
                }
                Event::Resize(cols, rows) => {
                    check_min_size(Rect::new(0, 0, cols, rows))?;
                }
                _ => {}
            }
        }
    }
}

/// Probe the real terminal before entering raw mode.
pub fn check_terminal() -> Result<()> {
    let (cols, rows) = crossterm::terminal::size()?;
    check_min_size(Rect::new(0, 0, cols, rows))
}

/// Reject surfaces the wizard cannot draw into.
pub fn check_min_size(area: Rect) -> Result<()> {
    if area.width < MIN_COLS || area.height < MIN_ROWS {
        return Err(WizardError::TerminalTooSmall {
            cols: area.width,
            rows: area.height,
            min_cols: MIN_COLS,
            min_rows: MIN_ROWS,
        });
    }
    Ok(())
}
