//! Express wizard
//!
//! Page 0 collects node identity and the imaging action; with network setup
//! enabled, page 1 collects addresses; the final page reviews everything and
//! asks for confirmation. "No" on the review page rebuilds page 0.

use crate::catalog::{Action, NOT_REQUIRED};
use crate::controls::{Button, Carousel, Checkbox, Control, ControlId, StaticText, TextField};
use crate::dispatcher::Dispatcher;
use crate::error::{Result, WizardError};
use crate::hardware::{node_position_choices, DiskInfo};
use crate::params::{Detected, AUTO_SENTINEL};
use crate::review;
use crate::theme::Styles;
use crate::wizard::{Flow, FlowFlags, PageAction, PageUi, WizardCtx, WizardKind};

use super::TITLE;

/// Boot device choices: every fixed disk, with an auto entry in front once
/// there is a real choice to make.
fn boot_device_choices(disks: &[DiskInfo]) -> Vec<(String, String)> {
    let mut choices: Vec<(String, String)> = disks
        .iter()
        .filter(|d| !d.is_usb)
        .map(|d| (d.dev.clone(), d.dev.clone()))
        .collect();
    if choices.len() >= 2 {
        choices.insert(0, (AUTO_SENTINEL.to_string(), NOT_REQUIRED.to_string()));
    }
    choices
}

#[derive(Default)]
pub struct ExpressFlow {
    position: Option<ControlId>,
    block_id: Option<ControlId>,
    node_serial: Option<ControlId>,
    cluster_id: Option<ControlId>,
    ram: Option<ControlId>,
    boot_device: Option<ControlId>,
    action: Option<ControlId>,
    hypervisor: Option<ControlId>,
    sku: Option<ControlId>,
    controller: Option<ControlId>,
    host_ip: Option<ControlId>,
    subnet_mask: Option<ControlId>,
    gateway: Option<ControlId>,
    controller_ip: Option<ControlId>,
    vlan_id: Option<ControlId>,
    single_node: Option<ControlId>,
    dns_ip: Option<ControlId>,
}

impl ExpressFlow {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_config(&mut self, ctx: &mut WizardCtx, ui: &mut PageUi, y: u16) -> Result<()> {
        let d = &mut ui.dispatcher;
        let detected = ctx.detected.clone();
        let mut y = y;

        let model = Carousel::new(
            y,
            0,
            "Node model            : ",
            vec![(detected.model_string.clone(), detected.model_string.clone())],
            0,
        );
        d.add(model);
        y += 1;

        let position_marker = Detected::marker(detected.node_position.is_some());
        let mut position = Carousel::new(
            y,
            0,
            format!("Node position       {position_marker} : "),
            node_position_choices(detected.node_position.as_deref()),
            0,
        );
        if detected.node_position.is_some() {
            position = position.pre_touched();
        }
        let position_id = d.add(position);
        self.position = Some(position_id);
        y += 1;

        let block_marker = Detected::marker(detected.block_id.is_some());
        self.block_id = Some(d.add(
            TextField::new(
                y,
                0,
                format!("Block ID            {block_marker} :"),
                ctx.params
                    .block_id
                    .clone()
                    .or(detected.block_id.clone())
                    .unwrap_or_default(),
                16,
            )
            .uppercase(),
        ));
        y += 1;

        let serial_marker = Detected::marker(detected.node_serial.is_some());
        self.node_serial = Some(d.add(
            TextField::new(
                y,
                0,
                format!("Node serial         {serial_marker} :"),
                ctx.params
                    .node_serial
                    .clone()
                    .or(detected.node_serial.clone())
                    .unwrap_or_default(),
                40,
            )
            .uppercase(),
        ));
        y += 1;

        let cluster_marker = Detected::marker(detected.cluster_id.is_some());
        self.cluster_id = Some(d.add(TextField::new(
            y,
            0,
            format!("Node cluster ID     {cluster_marker} :"),
            ctx.params
                .cluster_id
                .clone()
                .or(detected.cluster_id.clone())
                .unwrap_or_default(),
            20,
        )));
        y += 1;

        self.ram = Some(d.add(TextField::new(
            y,
            0,
            "Controller RAM in GB [16-64] :",
            ctx.params
                .controller_ram
                .clone()
                .unwrap_or_else(|| AUTO_SENTINEL.to_string()),
            20,
        )));
        y += 1;

        let boot_choices = boot_device_choices(&ctx.disks);
        self.boot_device = if boot_choices.len() >= 2 {
            let id = d.add(Carousel::new(y, 0, "Choose boot device    : ", boot_choices, 0));
            y += 1;
            Some(id)
        } else {
            None
        };

        let actions: Vec<(String, String)> = ctx
            .catalog
            .actions()
            .iter()
            .map(|a| (a.label().to_string(), a.to_string()))
            .collect();
        if actions.is_empty() {
            return Err(WizardError::page_wiring("catalog offered no actions"));
        }
        let first_action: Action = actions[0]
            .1
            .parse()
            .map_err(|_| WizardError::page_wiring("unparseable action handle"))?;
        let action_id = d.add(Carousel::new(y, 0, "Choose action         : ", actions, 0));
        self.action = Some(action_id);
        y += 2;

        let hyp_choices = ctx.catalog.hypervisor_images(first_action);
        let first_hyp = hyp_choices
            .first()
            .map(|(_, handle)| handle.clone())
            .unwrap_or_default();
        let hypervisor_id = d.add(Carousel::new(
            y,
            0,
            "Choose hypervisor     : ",
            hyp_choices,
            0,
        ));
        self.hypervisor = Some(hypervisor_id);
        y += 1;

        let sku_id = d.add(Carousel::new(
            y,
            0,
            "Choose Hyper-V SKU    : ",
            ctx.catalog.skus(&first_hyp),
            0,
        ));
        self.sku = Some(sku_id);
        y += 1;

        let controller_id = d.add(Carousel::new(
            y,
            0,
            "Choose controller     : ",
            ctx.catalog.controller_images(first_action),
            0,
        ));
        self.controller = Some(controller_id);
        y += 2;

        d.add(Button::new(y, 10, "Cancel", PageAction::Cancel));
        d.add(Button::new(y, 22, "Next", PageAction::Proceed));

        // Changing the position may narrow the possible boot devices.
        if let Some(boot_id) = self.boot_device {
            ui.react(position_id, move |dispatcher, ctx| {
                let choices = boot_device_choices(&ctx.disks);
                if let Some(carousel) = dispatcher.get_mut::<Carousel>(boot_id) {
                    carousel.set_choices(choices);
                }
            });
        }

        // Changing the action filters both image carousels, and the new
        // hypervisor selection in turn filters the SKU list.
        ui.react(action_id, move |dispatcher, ctx| {
            let Some(handle) = dispatcher
                .get::<Carousel>(action_id)
                .map(|c| c.selected_handle().to_string())
            else {
                return;
            };
            let Ok(action) = handle.parse::<Action>() else {
                return;
            };
            let hyp_choices = ctx.catalog.hypervisor_images(action);
            let first_hyp = hyp_choices
                .first()
                .map(|(_, handle)| handle.clone())
                .unwrap_or_default();
            if let Some(carousel) = dispatcher.get_mut::<Carousel>(hypervisor_id) {
                carousel.set_choices(hyp_choices);
            }
            if let Some(carousel) = dispatcher.get_mut::<Carousel>(sku_id) {
                carousel.set_choices(ctx.catalog.skus(&first_hyp));
            }
            if let Some(carousel) = dispatcher.get_mut::<Carousel>(controller_id) {
                carousel.set_choices(ctx.catalog.controller_images(action));
            }
        });

        ui.react(hypervisor_id, move |dispatcher, ctx| {
            let Some(handle) = dispatcher
                .get::<Carousel>(hypervisor_id)
                .map(|c| c.selected_handle().to_string())
            else {
                return;
            };
            if let Some(carousel) = dispatcher.get_mut::<Carousel>(sku_id) {
                carousel.set_choices(ctx.catalog.skus(&handle));
            }
        });

        Ok(())
    }

    fn build_network(&mut self, ctx: &mut WizardCtx, ui: &mut PageUi, y: u16) -> Result<()> {
        let d = &mut ui.dispatcher;
        let prior = ctx.params.network.clone().unwrap_or_default();
        let mut y = y;

        d.add(StaticText::multi(
            y,
            0,
            vec![
                "NOTE: Leaving the IP information below blank will trigger".to_string(),
                "the use of DHCP, which is not recommended unless the IP".to_string(),
                "addresses are assigned statically in your DHCP server.".to_string(),
            ],
        ));
        y += 4;

        self.host_ip = Some(d.add(TextField::new(
            y,
            0,
            "Host IP address           :",
            prior.host_ip.clone(),
            15,
        )));
        y += 1;
        self.subnet_mask = Some(d.add(TextField::new(
            y,
            0,
            "Host/Controller netmask   :",
            prior.subnet_mask.clone(),
            15,
        )));
        y += 1;
        self.gateway = Some(d.add(TextField::new(
            y,
            0,
            "Host/Controller gateway   :",
            prior.gateway.clone(),
            15,
        )));
        y += 2;
        self.controller_ip = Some(d.add(TextField::new(
            y,
            0,
            "Controller IP address     :",
            prior.controller_ip.clone(),
            15,
        )));
        y += 1;
        self.vlan_id = Some(d.add(
            TextField::new(
                y,
                0,
                "Controller VLAN ID        :",
                ctx.params.vlan_id.clone().unwrap_or_default(),
                4,
            )
            .numeric(),
        ));
        y += 2;

        // The DNS field exists only while the single-node box is checked.
        let single_node = ctx.flags.one_node_cluster;
        if single_node {
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

        d.add(Button::new(y, 10, "Back", PageAction::Back));
        d.add(Button::new(y, 22, "Next", PageAction::Proceed));
        Ok(())
    }

    fn build_review(&mut self, ctx: &mut WizardCtx, ui: &mut PageUi, y: u16) -> Result<()> {
        let d = &mut ui.dispatcher;
        let mut lines = review::synthesize(&ctx.params);
        lines.push(String::new());
        lines.push("Are you sure you want to continue?".to_string());
        let height = lines.len() as u16;
        d.add(StaticText::multi(y, 0, lines).styled(Styles::text()));
        let button_row = y + height + 1;
        d.add(Button::new(button_row, 10, "No", PageAction::BackToStart));
        d.add(Button::new(button_row, 18, "Yes", PageAction::Confirm));
        Ok(())
    }

    fn header_rows(&self, ctx: &WizardCtx) -> u16 {
        self.header_lines(ctx).len() as u16 + 1
    }
}

impl Flow for ExpressFlow {
    fn kind(&self) -> WizardKind {
        WizardKind::Express
    }

    fn final_page(&self, flags: &FlowFlags) -> usize {
        if flags.network_setup {
            2
        } else {
            1
        }
    }

    fn header_lines(&self, ctx: &WizardCtx) -> Vec<String> {
        let mut lines = vec![TITLE.to_string()];
        if ctx.detected.any_detected() {
            lines.push("# Fields marked with (*) were automatically detected.".to_string());
        }
        lines
    }

    fn build_page(&mut self, page: usize, ctx: &mut WizardCtx, ui: &mut PageUi) -> Result<()> {
        let y = self.header_rows(ctx);
        let final_page = self.final_page(&ctx.flags);
        if page == 0 {
            self.build_config(ctx, ui, y)
        } else if page == final_page {
            self.build_review(ctx, ui, y)
        } else if page == 1 && ctx.flags.network_setup {
            self.build_network(ctx, ui, y)
        } else {
            Err(WizardError::page_wiring(format!(
                "express wizard has no builder for page {page}"
            )))
        }
    }

    fn collect(&mut self, page: usize, ctx: &mut WizardCtx, d: &Dispatcher) -> Result<()> {
        let final_page = self.final_page(&ctx.flags);
        if page == 0 {
            let read_field = |id: Option<ControlId>| {
                id.and_then(|id| d.get::<TextField>(id))
                    .map(|f| f.text().to_string())
            };
            let read_handle = |id: Option<ControlId>| {
                id.and_then(|id| d.get::<Carousel>(id))
                    .map(|c| c.selected_handle().to_string())
            };

            ctx.params.node_position = self
                .position
                .and_then(|id| d.get::<Carousel>(id))
                .map(|c| c.selected_handle().to_string());
            ctx.params.block_id = read_field(self.block_id);
            ctx.params.node_serial = read_field(self.node_serial);
            ctx.params.cluster_id = read_field(self.cluster_id);
            ctx.params.controller_ram = read_field(self.ram);
            ctx.params.boot_device = read_handle(self.boot_device);
            ctx.params.action = read_handle(self.action).and_then(|h| h.parse().ok());
            ctx.params.hypervisor_image = read_handle(self.hypervisor);
            ctx.params.hypervisor_sku = read_handle(self.sku);
            ctx.params.controller_image = read_handle(self.controller);
            ctx.params.node_name = match (
                ctx.params.block_id.as_deref(),
                ctx.params.node_position.as_deref(),
            ) {
                (Some(block), Some(position))
                    if !block.is_empty() && !position.trim().is_empty() =>
                {
                    Some(format!("{block}-{position}"))
                }
                _ => None,
            };
        } else if page == 1 && ctx.flags.network_setup {
            let read = |id: Option<ControlId>| {
                id.and_then(|id| d.get::<TextField>(id))
                    .map(|f| f.text().to_string())
                    .unwrap_or_default()
            };
            let single = self
                .single_node
                .and_then(|id| d.get::<Checkbox>(id))
                .map(|cb| cb.is_selected())
                .unwrap_or(false);
            ctx.params.single_node_cluster = single;
            ctx.params.dns_ip = if single {
                self.dns_ip
                    .and_then(|id| d.get::<TextField>(id))
                    .map(|f| f.text().to_string())
            } else {
                None
            };
            ctx.params.vlan_id = {
                let vlan = read(self.vlan_id);
                if vlan.is_empty() {
                    None
                } else {
                    Some(vlan)
                }
            };
            ctx.params.network = Some(crate::net::NetworkParams {
                host_ip: read(self.host_ip),
                controller_ip: read(self.controller_ip),
                subnet_mask: read(self.subnet_mask),
                gateway: read(self.gateway),
                dns_ip: ctx.params.dns_ip.clone(),
            });
        } else if page == final_page {
            // the review page has no inputs
        }
        Ok(())
    }

    fn validate(&self, ctx: &WizardCtx) -> std::result::Result<(), String> {
        if ctx.flags.network_setup {
            let network = ctx.params.network.clone().unwrap_or_default();
            ctx.validator.validate(&network)?;
        }
        ctx.params.validate()
    }
}
