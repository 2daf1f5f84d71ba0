//! End-to-end wizard session tests
//!
//! Drives full wizard runs through the session's key-event protocol with
//! fake collaborators, without a terminal: pages build, focus travels,
//! answers accumulate, validation gates the exit.

use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use nodesmith::{
    Action, Button, Checkbox, ChoiceList, Control, CustomFlow, Detected, DiskInfo, ExpressFlow,
    FlowFlags, ImageCatalog, InstallParams, Ipv4Validator, LocaleFlow, PageAction, Session,
    SessionEvent, TextBlock, TextField, WizardCtx, WizardOutcome,
};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

struct FakeCatalog;

impl ImageCatalog for FakeCatalog {
    fn actions(&self) -> Vec<Action> {
        vec![
            Action::InstallHypervisor,
            Action::InstallController,
            Action::ConfigureHypervisor,
        ]
    }

    fn hypervisor_images(&self, action: Action) -> Vec<(String, String)> {
        if action.needs_hypervisor_image() {
            vec![
                ("KVM (hyp-2.0)".to_string(), "kvm:/img/hyp-2.0.iso".to_string()),
                ("HYPERV (win)".to_string(), "hyperv:/img/win.iso".to_string()),
            ]
        } else {
            nodesmith::catalog::not_required()
        }
    }

    fn controller_images(&self, action: Action) -> Vec<(String, String)> {
        if action.needs_controller_image() {
            vec![("ctl-5.1".to_string(), "/img/ctl-5.1.tar.gz".to_string())]
        } else {
            nodesmith::catalog::not_required()
        }
    }

    fn skus(&self, handle: &str) -> Vec<(String, String)> {
        if handle.contains("hyperv") {
            vec![
                ("STANDARD".to_string(), "standard".to_string()),
                ("DATACENTER".to_string(), "datacenter".to_string()),
            ]
        } else {
            nodesmith::catalog::not_required()
        }
    }
}

fn disks() -> Vec<DiskInfo> {
    let disk = |dev: &str, size_gb: f64, ssd: bool, usb: bool| DiskInfo {
        dev: dev.to_string(),
        model: format!("Model-{dev}"),
        serial: format!("SER-{dev}"),
        size_gb,
        is_ssd: ssd,
        is_usb: usb,
    };
    vec![
        disk("sda", 64.0, true, false),
        disk("sdb", 480.0, true, false),
        disk("sdc", 2000.0, false, false),
        disk("sdd", 16.0, false, true),
    ]
}

fn ctx(flags: FlowFlags) -> WizardCtx {
    WizardCtx {
        params: InstallParams::default(),
        flags,
        detected: Detected {
            model_string: "TEST-1065".to_string(),
            node_position: Some("A".to_string()),
            block_id: Some("BLK01".to_string()),
            node_serial: None,
            cluster_id: None,
        },
        disks: disks(),
        catalog: Rc::new(FakeCatalog),
        validator: Rc::new(Ipv4Validator),
    }
}

/// Tab until the focused control is a button carrying `action`.
fn focus_button(session: &mut Session, action: PageAction) {
    for _ in 0..64 {
        if let Some(id) = session.dispatcher().focused_id() {
            if let Some(button) = session.dispatcher().get::<Button>(id) {
                if button.action() == action {
                    return;
                }
            }
        }
        session.handle_key(key(KeyCode::Tab)).unwrap();
    }
    panic!("no focusable button with action {action:?}");
}

/// Tab until the focused control downcasts to `T`.
fn focus_control<T: nodesmith::Control + 'static>(session: &mut Session) {
    for _ in 0..64 {
        if let Some(id) = session.dispatcher().focused_id() {
            if session.dispatcher().get::<T>(id).is_some() {
                return;
            }
        }
        session.handle_key(key(KeyCode::Tab)).unwrap();
    }
    panic!("no focusable control of the requested type");
}

fn press(session: &mut Session, code: KeyCode) -> SessionEvent {
    session.handle_key(key(code)).unwrap()
}

fn type_text(session: &mut Session, text: &str) {
    for c in text.chars() {
        press(session, KeyCode::Char(c));
    }
}

// ============================================================================
// Express wizard
// ============================================================================

#[test]
fn express_completes_without_network_page() {
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(FlowFlags::default()));
    session.start().unwrap();
    assert_eq!(session.page(), 0);

    focus_button(&mut session, PageAction::Proceed);
    assert_eq!(press(&mut session, KeyCode::Enter), SessionEvent::Continue);
    // no network page: page 1 is the review
    assert_eq!(session.page(), 1);

    focus_button(&mut session, PageAction::Confirm);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Finished(WizardOutcome::Completed));

    let params = &session.ctx.params;
    assert_eq!(params.node_position.as_deref(), Some("A"));
    assert_eq!(params.block_id.as_deref(), Some("BLK01"));
    assert_eq!(params.node_name.as_deref(), Some("BLK01-A"));
    assert_eq!(params.action, Some(Action::InstallHypervisor));
    assert!(params
        .hypervisor_image
        .as_deref()
        .unwrap()
        .starts_with("kvm:"));
    assert!(params.network.is_none());
}

#[test]
fn express_cancel_from_first_page() {
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(FlowFlags::default()));
    session.start().unwrap();
    focus_button(&mut session, PageAction::Cancel);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Finished(WizardOutcome::Cancelled));
}

#[test]
fn express_network_page_collects_addresses() {
    let flags = FlowFlags {
        network_setup: true,
        one_node_cluster: false,
    };
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(flags));
    session.start().unwrap();

    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 1);

    // fields in traversal order: host ip, netmask, gateway, controller ip
    focus_control::<TextField>(&mut session);
    type_text(&mut session, "10.1.0.10");
    press(&mut session, KeyCode::Tab);
    type_text(&mut session, "255.255.255.0");
    press(&mut session, KeyCode::Tab);
    type_text(&mut session, "10.1.0.1");
    press(&mut session, KeyCode::Tab);
    type_text(&mut session, "10.1.0.11");

    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 2);

    focus_button(&mut session, PageAction::Confirm);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Finished(WizardOutcome::Completed));

    let network = session.ctx.params.network.clone().unwrap();
    assert_eq!(network.host_ip, "10.1.0.10");
    assert_eq!(network.controller_ip, "10.1.0.11");
    assert_eq!(network.subnet_mask, "255.255.255.0");
    assert_eq!(network.gateway, "10.1.0.1");
}

#[test]
fn express_rejects_bad_network_and_stays_on_review() {
    let flags = FlowFlags {
        network_setup: true,
        one_node_cluster: false,
    };
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(flags));
    session.start().unwrap();

    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);

    focus_control::<TextField>(&mut session);
    type_text(&mut session, "10.1.0.10");
    press(&mut session, KeyCode::Tab);
    type_text(&mut session, "255.0.255.0"); // non-contiguous mask
    press(&mut session, KeyCode::Tab);
    type_text(&mut session, "10.1.0.1");
    press(&mut session, KeyCode::Tab);
    type_text(&mut session, "10.1.0.11");

    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 2);

    focus_button(&mut session, PageAction::Confirm);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Continue);
    assert_eq!(session.page(), 2);
    assert!(session.status().unwrap().contains("subnet mask"));
}

#[test]
fn express_review_no_rebuilds_first_page_with_same_defaults() {
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(FlowFlags::default()));
    session.start().unwrap();
    let controls_before = session.dispatcher().len();

    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    focus_button(&mut session, PageAction::BackToStart);
    press(&mut session, KeyCode::Enter);

    assert_eq!(session.page(), 0);
    assert_eq!(session.dispatcher().len(), controls_before);
    // the detected block id survives the round trip
    let field = session
        .dispatcher()
        .ids()
        .find_map(|id| session.dispatcher().get::<TextField>(id))
        .unwrap();
    assert_eq!(field.text(), "BLK01");
}

#[test]
fn express_single_node_checkbox_reveals_dns_and_preserves_buffer() {
    let flags = FlowFlags {
        network_setup: true,
        one_node_cluster: true,
    };
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(flags));
    session.start().unwrap();
    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 1);

    // the DNS field is the only hidden text field on the page
    let hidden = session
        .dispatcher()
        .ids()
        .find(|id| {
            session
                .dispatcher()
                .get::<TextField>(*id)
                .is_some_and(|f| !f.is_visible())
        })
        .unwrap();

    focus_control::<Checkbox>(&mut session);
    press(&mut session, KeyCode::Char(' '));
    assert!(session.dispatcher().get::<TextField>(hidden).unwrap().is_visible());

    // the DNS field sits right before the checkbox in traversal order
    press(&mut session, KeyCode::BackTab);
    type_text(&mut session, "8.8.8.8");

    // uncheck: field hides but keeps its buffer
    focus_control::<Checkbox>(&mut session);
    press(&mut session, KeyCode::Char(' '));
    let field = session.dispatcher().get::<TextField>(hidden).unwrap();
    assert!(!field.is_visible());
    assert_eq!(field.text(), "8.8.8.8");

    // re-check: buffer still there
    press(&mut session, KeyCode::Char(' '));
    let field = session.dispatcher().get::<TextField>(hidden).unwrap();
    assert!(field.is_visible());
    assert_eq!(field.text(), "8.8.8.8");
}

#[test]
fn express_action_change_repopulates_dependent_carousels() {
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(FlowFlags::default()));
    session.start().unwrap();

    let carousel_handles = |session: &Session| -> Vec<String> {
        session
            .dispatcher()
            .ids()
            .filter_map(|id| session.dispatcher().get::<nodesmith::Carousel>(id))
            .map(|c| c.selected_handle().to_string())
            .collect()
    };
    let before = carousel_handles(&session);
    assert!(before.iter().any(|h| h.starts_with("kvm:")));

    // move focus to the action carousel: it is the one whose handle parses
    // as an Action
    for _ in 0..32 {
        let focused = session.dispatcher().focused_id().unwrap();
        let is_action = session
            .dispatcher()
            .get::<nodesmith::Carousel>(focused)
            .map(|c| c.selected_handle().parse::<Action>().is_ok())
            .unwrap_or(false);
        if is_action {
            break;
        }
        press(&mut session, KeyCode::Tab);
    }

    // install_hypervisor -> install_controller: hypervisor images collapse
    // to Not Required, controller images appear
    press(&mut session, KeyCode::Right);
    let after = carousel_handles(&session);
    assert!(after.iter().any(|h| h == "NR"));
    assert!(after.iter().any(|h| h.contains("ctl-5.1")));
}

// ============================================================================
// Custom wizard
// ============================================================================

fn eula_lines(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("license term {i}")).collect()
}

#[test]
fn custom_blocks_next_until_roles_complete() {
    let mut session = Session::new(
        Box::new(CustomFlow::new(eula_lines(40))),
        ctx(FlowFlags::default()),
    );
    session.start().unwrap();

    // break the default assignment: boot over the system disk empties the
    // system role
    focus_control::<ChoiceList>(&mut session);
    press(&mut session, KeyCode::Down); // cursor to sdb
    press(&mut session, KeyCode::Char('b'));

    focus_button(&mut session, PageAction::Proceed);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Continue);
    assert_eq!(session.page(), 0);
    assert!(session.status().unwrap().contains("disk selection"));

    // reset restores the defaults and unblocks the button
    focus_control::<ChoiceList>(&mut session);
    press(&mut session, KeyCode::Char('R'));
    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 1);
}

#[test]
fn custom_license_gate_blocks_acceptance_until_scrolled() {
    let mut session = Session::new(
        Box::new(CustomFlow::new(eula_lines(40))),
        ctx(FlowFlags::default()),
    );
    session.start().unwrap();
    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 1);

    // the acceptance box is inert while the license is unread
    focus_control::<Checkbox>(&mut session);
    press(&mut session, KeyCode::Char(' '));
    let checkbox = session
        .dispatcher()
        .ids()
        .find_map(|id| session.dispatcher().get::<Checkbox>(id))
        .unwrap();
    assert!(!checkbox.is_selected());

    // confirming now is rejected on the viewed/accepted answers
    focus_button(&mut session, PageAction::Confirm);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Continue);
    assert!(session.status().unwrap().contains("license"));

    // read to the end, then accept
    focus_control::<TextBlock>(&mut session);
    for _ in 0..10 {
        press(&mut session, KeyCode::PageDown);
    }
    focus_control::<Checkbox>(&mut session);
    press(&mut session, KeyCode::Char(' '));

    focus_button(&mut session, PageAction::Confirm);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Finished(WizardOutcome::Completed));

    let params = &session.ctx.params;
    let eula = params.eula.unwrap();
    assert!(eula.accepted);
    assert!(eula.viewed);
    let roles = params.roles.clone().unwrap();
    assert_eq!(roles.boot, vec!["sda"]);
    assert_eq!(roles.system, vec!["sdb"]);
    assert_eq!(roles.data, vec!["sdc"]);
}

#[test]
fn custom_role_assignment_survives_going_back() {
    let mut session = Session::new(
        Box::new(CustomFlow::new(eula_lines(40))),
        ctx(FlowFlags::default()),
    );
    session.start().unwrap();

    // move the data role off sdc and back on, leaving a custom assignment:
    // boot on sdb is replaced by reassigning boot to sda via defaults
    focus_control::<ChoiceList>(&mut session);
    press(&mut session, KeyCode::Down);
    press(&mut session, KeyCode::Down); // cursor on sdc
    press(&mut session, KeyCode::Char('d')); // toggle data off
    press(&mut session, KeyCode::Char('d')); // toggle data on

    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 1);
    focus_button(&mut session, PageAction::Back);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 0);

    // the rebuilt page still shows a complete assignment (same prior state)
    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.page(), 1);
}

#[test]
fn custom_media_disk_shows_transient_status() {
    let mut session = Session::new(
        Box::new(CustomFlow::new(eula_lines(40))),
        ctx(FlowFlags::default()),
    );
    session.start().unwrap();

    focus_control::<ChoiceList>(&mut session);
    for _ in 0..3 {
        press(&mut session, KeyCode::Down); // cursor to sdd (installer media)
    }
    press(&mut session, KeyCode::Char('b'));
    let list = session
        .dispatcher()
        .ids()
        .find_map(|id| session.dispatcher().get::<ChoiceList>(id))
        .unwrap();
    assert!(list.status().unwrap().contains("Installer media"));

    // the next keypress retires the transient message
    press(&mut session, KeyCode::Up);
    let list = session
        .dispatcher()
        .ids()
        .find_map(|id| session.dispatcher().get::<ChoiceList>(id))
        .unwrap();
    assert!(!list.status().unwrap().contains("Installer media"));
}

// ============================================================================
// Locale wizard
// ============================================================================

#[test]
fn locale_collects_selected_keymap() {
    let keymaps: Vec<String> = ["de", "uk", "us"].iter().map(|s| s.to_string()).collect();
    let flow = LocaleFlow::new(keymaps, "uk".to_string(), disks());
    let mut session = Session::new(Box::new(flow), ctx(FlowFlags::default()));
    session.start().unwrap();

    // initial position sits on the current keymap
    let list = session
        .dispatcher()
        .ids()
        .find_map(|id| session.dispatcher().get::<ChoiceList>(id))
        .unwrap();
    assert_eq!(list.selected_key(), "uk");

    focus_control::<ChoiceList>(&mut session);
    press(&mut session, KeyCode::Down); // us

    focus_button(&mut session, PageAction::Confirm);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Finished(WizardOutcome::Completed));
    assert_eq!(session.ctx.params.keymap.as_deref(), Some("us"));
}

#[test]
fn locale_cancel_returns_cancelled() {
    let flow = LocaleFlow::new(vec!["us".to_string()], "us".to_string(), Vec::new());
    let mut session = Session::new(Box::new(flow), ctx(FlowFlags::default()));
    session.start().unwrap();
    focus_button(&mut session, PageAction::Cancel);
    let event = press(&mut session, KeyCode::Enter);
    assert_eq!(event, SessionEvent::Finished(WizardOutcome::Cancelled));
}

// ============================================================================
// Re-entry after rejected extraction
// ============================================================================

#[test]
fn resume_after_rejection_redisplays_page_with_message() {
    let mut session = Session::new(Box::new(ExpressFlow::new()), ctx(FlowFlags::default()));
    session.start().unwrap();
    focus_button(&mut session, PageAction::Proceed);
    press(&mut session, KeyCode::Enter);

    session
        .resume_with_error("Controller RAM in GB must be an integer of range 16 to 64.".to_string())
        .unwrap();
    assert_eq!(session.page(), 1);
    assert!(session.status().unwrap().contains("Controller RAM"));
    assert!(session.dispatcher().len() > 0);
    // the session keeps accepting input afterwards
    focus_button(&mut session, PageAction::Confirm);
}
