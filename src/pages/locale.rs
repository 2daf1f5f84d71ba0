//! Locale wizard
//!
//! A single page: pick the console keyboard layout, with an optional warning
//! block listing the disks a destructive performance check will run against.

use crate::controls::{Button, ChoiceList, Control, ControlId, StaticText, TextBlock};
use crate::dispatcher::Dispatcher;
use crate::error::{Result, WizardError};
use crate::hardware::DiskInfo;
use crate::wizard::{Flow, FlowFlags, PageAction, PageUi, WizardCtx, WizardKind};

use super::TITLE;

pub struct LocaleFlow {
    keymaps: Vec<String>,
    current: String,
    warn_disks: Vec<DiskInfo>,
    keymap_list: Option<ControlId>,
}

impl LocaleFlow {
    pub fn new(keymaps: Vec<String>, current: String, warn_disks: Vec<DiskInfo>) -> Self {
        Self {
            keymaps,
            current,
            warn_disks,
            keymap_list: None,
        }
    }
}

impl Flow for LocaleFlow {
    fn kind(&self) -> WizardKind {
        WizardKind::Locale
    }

    fn final_page(&self, _flags: &FlowFlags) -> usize {
        0
    }

    fn header_lines(&self, _ctx: &WizardCtx) -> Vec<String> {
        vec![TITLE.to_string()]
    }

    fn build_page(&mut self, page: usize, _ctx: &mut WizardCtx, ui: &mut PageUi) -> Result<()> {
        if page != 0 {
            return Err(WizardError::page_wiring(format!(
                "locale wizard has no builder for page {page}"
            )));
        }
        let d = &mut ui.dispatcher;
        let mut y = 3;

        d.add(StaticText::new(
            y,
            0,
            "Please select your keyboard layout from the following list.",
        ));
        y += 2;

        let choices: Vec<(String, String)> = self
            .keymaps
            .iter()
            .map(|m| (m.clone(), m.clone()))
            .collect();
        let list = ChoiceList::new(
            y,
            0,
            "Keyboard Layout",
            choices,
            Some(self.current.as_str()),
            50,
            10,
        );
        self.keymap_list = Some(d.add(list));
        y += 11;

        if !self.warn_disks.is_empty() {
            d.add(StaticText::multi(
                y,
                0,
                vec![
                    "WARNING: Destructive IO tests will be run on the following disks"
                        .to_string(),
                    "to confirm acceptable performance. If they still hold data,".to_string(),
                    "cancel now and back it up first.".to_string(),
                ],
            ));
            y += 4;

            let mut rows: Vec<String> = Vec::new();
            let mut widest = 0usize;
            for disk in &self.warn_disks {
                let row = format!(" {disk}");
                widest = widest.max(row.len());
                rows.push(row);
            }
            let height = (rows.len() as u16 + 2).min(8);
            let scrollable = rows.len() as u16 + 2 > height;
            let mut block =
                TextBlock::new(y, 0, "Disks", rows, widest as u16 + 4, height, 1);
            // a fully visible warning has nothing to scroll, so skip it in
            // the focus order
            block.set_enabled(scrollable);
            d.add(block);
            y += height + 1;
        }

        d.add(Button::new(y, 0, "Cancel", PageAction::Cancel));
        d.add(Button::new(y, 12, "Proceed", PageAction::Confirm));
        Ok(())
    }

    fn collect(&mut self, page: usize, ctx: &mut WizardCtx, d: &Dispatcher) -> Result<()> {
        if page == 0 {
            ctx.params.keymap = self
                .keymap_list
                .and_then(|id| d.get::<ChoiceList>(id))
                .map(|list| list.selected_key().to_string());
        }
        Ok(())
    }

    fn validate(&self, ctx: &WizardCtx) -> std::result::Result<(), String> {
        match ctx.params.keymap.as_deref() {
            Some(keymap) if !keymap.is_empty() => Ok(()),
            _ => Err("A keyboard layout must be selected.".to_string()),
        }
    }
}
