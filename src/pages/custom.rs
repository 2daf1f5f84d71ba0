//! Custom wizard
//!
//! Page 0 picks the hypervisor source, assigns disk roles through the
//! single-key protocol, and collects addresses; page 1 presents the license
//! behind a scroll gate. Role assignments survive going back and forth
//! between the pages.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyCode;

use crate::controls::{
    Button, Checkbox, ChoiceHandler, ChoiceList, ChoiceListView, Control, ControlId, HandlerPhase,
    RadioGroup, StaticText, TextBlock, TextField,
};
use crate::dispatcher::Dispatcher;
use crate::error::{Result, WizardError};
use crate::hardware::DiskInfo;
use crate::params::EulaRecord;
use crate::roles::{format_row, header_label, RoleMap};
use crate::wizard::{Flow, FlowFlags, PageAction, PageUi, WizardCtx, WizardKind};

use super::TITLE;

const ROLE_KEYS: [char; 4] = ['b', 's', 'd', 'R'];
const INCOMPLETE_ROLES: &str = "You must correct the disk selection to proceed.";

/// Rewrite every row's usage tag and refresh the status line.
fn refresh_rows(view: &mut ChoiceListView<'_>, roles: &RoleMap, disks: &[DiskInfo]) {
    for (row, disk) in view.choices.iter_mut().zip(disks) {
        row.0 = format_row(disk, roles.usage_tag(&disk.dev));
    }
    *view.status = Some(roles.status_line());
}

pub struct CustomFlow {
    eula_lines: Vec<String>,
    roles: Rc<RefCell<RoleMap>>,
    roles_seeded: bool,
    hyp_select: Option<ControlId>,
    iso_url: Option<ControlId>,
    host_ip: Option<ControlId>,
    controller_ip: Option<ControlId>,
    subnet_mask: Option<ControlId>,
    gateway: Option<ControlId>,
    single_node: Option<ControlId>,
    dns_ip: Option<ControlId>,
    accept_box: Option<ControlId>,
    eula_block: Option<ControlId>,
}

impl CustomFlow {
    pub fn new(eula_lines: Vec<String>) -> Self {
        Self {
            eula_lines,
            roles: Rc::new(RefCell::new(RoleMap::default())),
            roles_seeded: false,
            hyp_select: None,
            iso_url: None,
            host_ip: None,
            controller_ip: None,
            subnet_mask: None,
            gateway: None,
            single_node: None,
            dns_ip: None,
            accept_box: None,
            eula_block: None,
        }
    }

    /// Current role assignment (test/diagnostic access).
    pub fn roles(&self) -> Rc<RefCell<RoleMap>> {
        self.roles.clone()
    }

    fn build_main(&mut self, ctx: &mut WizardCtx, ui: &mut PageUi, y: u16) -> Result<()> {
        // Defaults are computed once per run; a rebuilt page shows the same
        // assignment the operator left behind.
        if !self.roles_seeded {
            self.roles = Rc::new(RefCell::new(RoleMap::with_defaults(&ctx.disks)));
            self.roles_seeded = true;
        }
        let d = &mut ui.dispatcher;
        let mut y = y;

        // Hypervisor source: the packaged image, or an operator-supplied ISO.
        let packaged = ctx
            .catalog
            .hypervisor_images(crate::catalog::Action::InstallHypervisor)
            .first()
            .map(|(label, _)| label.clone())
            .unwrap_or_else(|| "Packaged image".to_string());
        d.add(StaticText::new(y, 0, "Select hypervisor:"));
        y += 1;
        let mut iso_url = TextField::new(
            y + 1,
            30,
            "ISO URL:",
            ctx.params.iso_url.clone().unwrap_or_default(),
            45,
        );
        iso_url.set_visible(false);
        iso_url.set_enabled(false);
        // group first so traversal order follows the layout
        let hyp_id = d.add(RadioGroup::new(y, 0, vec![packaged, "Other ISO".to_string()]));
        let iso_id = d.add(iso_url);
        if let Some(group) = d.get_mut::<RadioGroup>(hyp_id) {
            group.set_reveals(1, vec![iso_id]);
        }
        self.hyp_select = Some(hyp_id);
        self.iso_url = Some(iso_id);
        y += 3;

        d.add(StaticText::new(
            y,
            0,
            "Assign disk roles: 'b' boot, 's' system store, 'd' data, 'R' reset to defaults.",
        ));
        y += 1;

        let roles = self.roles.clone();
        let disks = ctx.disks.clone();
        let mut rows = Vec::new();
        {
            let map = roles.borrow();
            for disk in &disks {
                rows.push((format_row(disk, map.usage_tag(&disk.dev)), disk.dev.clone()));
            }
        }
        let width = rows
            .iter()
            .map(|(row, _)| row.len())
            .max()
            .unwrap_or(40)
            .max(header_label().len()) as u16
            + 10;
        let height = (disks.len() as u16 + 2).clamp(3, 8);

        let handler_roles = roles.clone();
        let handler_disks = disks.clone();
        let handler: ChoiceHandler = Box::new(move |view, code, phase| match phase {
            HandlerPhase::Probe => {
                let mut map = handler_roles.borrow_mut();
                if map.has_transient() {
                    map.clear_transient();
                    if !matches!(code, KeyCode::Char('b' | 's' | 'd' | 'R')) {
                        // no second callback is coming for this key
                        refresh_rows(view, &map, &handler_disks);
                    }
                    true
                } else {
                    false
                }
            }
            HandlerPhase::Apply => {
                let mut map = handler_roles.borrow_mut();
                if let KeyCode::Char(c) = code {
                    let dev = view.selected_key().to_string();
                    map.apply_key(&dev, c);
                }
                refresh_rows(view, &map, &handler_disks);
                true
            }
        });

        let mut list = ChoiceList::new(y, 0, header_label(), rows, None, width, height)
            .with_marks("==> ", " <==")
            .with_handler(ROLE_KEYS.to_vec(), handler);
        list.set_status(Some(roles.borrow().status_line()));
        let list_id = d.add(list);
        y += height + 2;

        let prior = ctx.params.network.clone().unwrap_or_default();
        self.host_ip = Some(d.add(TextField::new(
            y,
            0,
            "Host IP address     :",
            prior.host_ip.clone(),
            15,
        )));
        self.controller_ip = Some(d.add(TextField::new(
            y,
            40,
            "Controller IP:",
            prior.controller_ip.clone(),
            15,
        )));
        y += 1;
        self.subnet_mask = Some(d.add(TextField::new(
            y,
            0,
            "Subnet mask         :",
            prior.subnet_mask.clone(),
            15,
        )));
        self.gateway = Some(d.add(TextField::new(
            y,
            40,
            "Gateway      :",
            prior.gateway.clone(),
            15,
        )));
        y += 2;

        if ctx.flags.one_node_cluster {
            let was_checked = ctx.params.single_node_cluster;
            let mut dns = TextField::new(
                y,
                40,
                "DNS server:",
                ctx.params.dns_ip.clone().unwrap_or_default(),
                15,
            );
            dns.set_visible(was_checked);
            dns.set_enabled(was_checked);
            let dns_id = d.add(dns);
            self.dns_ip = Some(dns_id);
            self.single_node = Some(d.add(
                Checkbox::new(y, 0, "Create single-node cluster?", was_checked)
                    .enables_when_checked(vec![dns_id])
                    .shows_when_checked(vec![dns_id]),
            ));
            y += 2;
        } else {
            self.single_node = None;
            self.dns_ip = None;
        }

        let mut next = Button::new(y, 0, "Next page", PageAction::Proceed);
        if !roles.borrow().is_complete() {
            next.set_disabled_reason(Some(INCOMPLETE_ROLES.to_string()));
        }
        let next_id = d.add(next);

        // Role edits gate the Next button.
        let gate_roles = roles.clone();
        ui.react(list_id, move |dispatcher, _ctx| {
            let complete = gate_roles.borrow().is_complete();
            if let Some(button) = dispatcher.get_mut::<Button>(next_id) {
                button.set_disabled_reason(
                    (!complete).then(|| INCOMPLETE_ROLES.to_string()),
                );
            }
        });

        Ok(())
    }

    fn build_license(&mut self, ctx: &mut WizardCtx, ui: &mut PageUi, y: u16) -> Result<()> {
        let d = &mut ui.dispatcher;
        let gate = crate::controls::ScrollGate::locked();
        let height = 14;
        let block = TextBlock::new(y, 0, "License Agreement", self.eula_lines.clone(), 70, height, 1)
            .releases(gate.clone());
        self.eula_block = Some(d.add(block));
        let accepted = ctx.params.eula.map(|e| e.accepted).unwrap_or(false);
        self.accept_box = Some(d.add(
            Checkbox::new(
                y + height + 1,
                0,
                "I accept the end user license agreement.  (Spacebar to toggle)",
                accepted,
            )
            .locked_by(gate),
        ));
        let button_row = y + height + 3;
        d.add(Button::new(button_row, 0, "Previous page", PageAction::Back));
        d.add(Button::new(button_row, 18, "Start", PageAction::Confirm));
        Ok(())
    }

    fn header_rows(&self, ctx: &WizardCtx) -> u16 {
        self.header_lines(ctx).len() as u16 + 1
    }
}

impl Flow for CustomFlow {
    fn kind(&self) -> WizardKind {
        WizardKind::Custom
    }

    fn final_page(&self, _flags: &FlowFlags) -> usize {
        1
    }

    fn header_lines(&self, ctx: &WizardCtx) -> Vec<String> {
        let mut lines = vec![TITLE.to_string()];
        if ctx.detected.block_id.is_some() && ctx.detected.node_position.is_some() {
            lines.push(
                "WARNING: software is or was already installed on the local drives.".to_string(),
            );
            lines.push(
                "Proceeding will reformat the drives, erasing any data on this node.".to_string(),
            );
        }
        lines
    }

    fn build_page(&mut self, page: usize, ctx: &mut WizardCtx, ui: &mut PageUi) -> Result<()> {
        let y = self.header_rows(ctx);
        match page {
            0 => self.build_main(ctx, ui, y),
            1 => self.build_license(ctx, ui, y),
            _ => Err(WizardError::page_wiring(format!(
                "custom wizard has no builder for page {page}"
            ))),
        }
    }

    fn collect(&mut self, page: usize, ctx: &mut WizardCtx, d: &Dispatcher) -> Result<()> {
        match page {
            0 => {
                let read = |id: Option<ControlId>| {
                    id.and_then(|id| d.get::<TextField>(id))
                        .map(|f| f.text().to_string())
                        .unwrap_or_default()
                };
                let other_iso = self
                    .hyp_select
                    .and_then(|id| d.get::<RadioGroup>(id))
                    .map(|g| g.selected_index() == 1)
                    .unwrap_or(false);
                ctx.params.iso_url = if other_iso {
                    Some(read(self.iso_url))
                } else {
                    None
                };
                ctx.params.roles = Some(self.roles.borrow().selection());
                let single = self
                    .single_node
                    .and_then(|id| d.get::<Checkbox>(id))
                    .map(|cb| cb.is_selected())
                    .unwrap_or(false);
                ctx.params.single_node_cluster = single;
                ctx.params.dns_ip = if single { Some(read(self.dns_ip)) } else { None };
                ctx.params.network = Some(crate::net::NetworkParams {
                    host_ip: read(self.host_ip),
                    controller_ip: read(self.controller_ip),
                    subnet_mask: read(self.subnet_mask),
                    gateway: read(self.gateway),
                    dns_ip: ctx.params.dns_ip.clone(),
                });
            }
            1 => {
                let accepted = self
                    .accept_box
                    .and_then(|id| d.get::<Checkbox>(id))
                    .map(|cb| cb.is_selected())
                    .unwrap_or(false);
                let viewed = self
                    .eula_block
                    .and_then(|id| d.get::<TextBlock>(id))
                    .map(|b| b.scrolled_to_end())
                    .unwrap_or(false);
                ctx.params.eula = Some(EulaRecord { accepted, viewed });
            }
            _ => {}
        }
        Ok(())
    }

    fn validate(&self, ctx: &WizardCtx) -> std::result::Result<(), String> {
        if let Some(roles) = &ctx.params.roles {
            roles.require_complete()?;
        }
        let network = ctx.params.network.clone().unwrap_or_default();
        ctx.validator.validate(&network)?;
        ctx.params.validate()
    }
}
