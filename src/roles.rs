//! Disk role assignment
//!
//! The single-key protocol behind the disk picker: `b` assigns the boot
//! disk, `s` toggles a system-store disk, `d` toggles a data disk, `R`
//! resets to the computed defaults. All state lives here; the choice-list
//! handler is a thin adapter that feeds keys in and rewrites row tags and
//! the status line afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::hardware::DiskInfo;

/// Smallest disk accepted for system-store or data roles, in GB.
pub const MIN_ROLE_DISK_GB: f64 = 200.0;

/// Column widths for the picker rows.
pub const MAX_DEV: usize = 10;
pub const MAX_MODEL: usize = 20;
pub const MAX_SERIAL: usize = 20;
pub const MAX_SIZE: usize = 8;

/// Roles a disk can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum DiskRole {
    Boot,
    System,
    Data,
}

/// Serializable snapshot of a completed assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleSelection {
    pub boot: Vec<String>,
    pub system: Vec<String>,
    pub data: Vec<String>,
}

impl RoleSelection {
    pub fn require_complete(&self) -> Result<(), String> {
        if self.boot.is_empty() {
            return Err("Installation cannot proceed without selecting a boot disk.".to_string());
        }
        if self.system.is_empty() {
            return Err(
                "Installation cannot proceed without selecting one (or two) system store disks."
                    .to_string(),
            );
        }
        if self.data.is_empty() {
            return Err(
                "Installation cannot proceed without selecting one or more data disks.".to_string(),
            );
        }
        Ok(())
    }
}

/// Live assignment state while the disk page is up.
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    boot: Vec<String>,
    system: Vec<String>,
    data: Vec<String>,
    /// Disks carrying the installer media itself; never assignable.
    media: Vec<String>,
    facts: HashMap<String, (bool, f64)>,
    transient: Option<String>,
}

impl RoleMap {
    /// Compute defaults: the smallest non-media disk boots, the largest one
    /// or two qualifying SSDs hold the system store, every other qualifying
    /// disk holds data. Incomplete defaults are legal; the page gates its
    /// Next button on completeness.
    pub fn with_defaults(disks: &[DiskInfo]) -> Self {
        let mut map = Self {
            media: disks
                .iter()
                .filter(|d| d.is_usb)
                .map(|d| d.dev.clone())
                .collect(),
            facts: disks
                .iter()
                .map(|d| (d.dev.clone(), (d.is_ssd, d.size_gb)))
                .collect(),
            ..Default::default()
        };
        map.reset();
        map
    }

    pub fn reset(&mut self) {
        self.boot.clear();
        self.system.clear();
        self.data.clear();

        let mut candidates: Vec<(String, bool, f64)> = self
            .facts
            .iter()
            .filter(|(dev, _)| !self.media.contains(dev))
            .map(|(dev, (ssd, size))| (dev.clone(), *ssd, *size))
            .collect();
        candidates.sort_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(&b.0)));

        if let Some((dev, _, _)) = candidates.first() {
            self.boot.push(dev.clone());
        }
        let mut ssds: Vec<(String, f64)> = candidates
            .iter()
            .filter(|(dev, ssd, size)| {
                *ssd && *size >= MIN_ROLE_DISK_GB && !self.boot.contains(dev)
            })
            .map(|(dev, _, size)| (dev.clone(), *size))
            .collect();
        ssds.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (dev, _) in ssds.into_iter().take(2) {
            self.system.push(dev);
        }
        for (dev, _, size) in &candidates {
            if *size >= MIN_ROLE_DISK_GB
                && !self.boot.contains(dev)
                && !self.system.contains(dev)
            {
                self.data.push(dev.clone());
            }
        }
    }

    pub fn selection(&self) -> RoleSelection {
        RoleSelection {
            boot: self.boot.clone(),
            system: self.system.clone(),
            data: self.data.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.selection().require_complete().is_ok()
    }

    /// One-shot rejection message, displayed until the next keypress.
    pub fn transient(&self) -> Option<&str> {
        self.transient.as_deref()
    }

    pub fn has_transient(&self) -> bool {
        self.transient.is_some()
    }

    pub fn clear_transient(&mut self) {
        self.transient = None;
    }

    fn facts_for(&self, dev: &str) -> (bool, f64) {
        self.facts.get(dev).copied().unwrap_or((false, 0.0))
    }

    fn strip(&mut self, dev: &str) {
        self.boot.retain(|d| d != dev);
        self.system.retain(|d| d != dev);
        self.data.retain(|d| d != dev);
    }

    /// Apply one custom key against the disk under the cursor.
    pub fn apply_key(&mut self, dev: &str, key: char) {
        if self.media.iter().any(|d| d == dev) && key != 'R' {
            self.transient =
                Some("Installer media disk(s) cannot be used as a destination.".to_string());
            return;
        }
        let (is_ssd, size_gb) = self.facts_for(dev);
        match key {
            'b' => {
                self.strip(dev);
                self.boot = vec![dev.to_string()];
            }
            's' => {
                if !is_ssd {
                    self.transient = Some("System store disk(s) must be SSDs.".to_string());
                } else if size_gb < MIN_ROLE_DISK_GB {
                    self.transient = Some(format!(
                        "System store disk(s) must be at least {MIN_ROLE_DISK_GB:.0} GB in size."
                    ));
                } else if self.system.iter().any(|d| d == dev) {
                    self.system.retain(|d| d != dev);
                } else {
                    // at most two; replace the older one in rolling fashion
                    if self.system.len() >= 2 {
                        self.system.remove(0);
                    }
                    self.strip(dev);
                    self.system.push(dev.to_string());
                }
            }
            'd' => {
                if size_gb < MIN_ROLE_DISK_GB {
                    self.transient = Some(format!(
                        "Data disk(s) must be at least {MIN_ROLE_DISK_GB:.0} GB in size."
                    ));
                } else if self.data.iter().any(|d| d == dev) {
                    self.data.retain(|d| d != dev);
                } else {
                    self.strip(dev);
                    self.data.push(dev.to_string());
                }
            }
            'R' => self.reset(),
            _ => {}
        }
    }

    /// Tag rendered in the `[Use]` column of a row.
    pub fn usage_tag(&self, dev: &str) -> char {
        if self.media.iter().any(|d| d == dev) {
            'M'
        } else if self.boot.iter().any(|d| d == dev) {
            'B'
        } else if self.system.iter().any(|d| d == dev) {
            'S'
        } else if self.data.iter().any(|d| d == dev) {
            'D'
        } else {
            ' '
        }
    }

    /// The line under the picker: a pending rejection, the first missing
    /// role, or the current assignment.
    pub fn status_line(&self) -> String {
        if let Some(transient) = &self.transient {
            return transient.clone();
        }
        match self.selection().require_complete() {
            Err(missing) => missing,
            Ok(()) => format!(
                "Boot: {:?}, System: {:?}, Data: {:?}",
                self.boot, self.system, self.data
            ),
        }
    }
}

/// Row text for one disk, ending in its `[ ]` usage cell.
pub fn format_row(disk: &DiskInfo, tag: char) -> String {
    let serial = if disk.serial.is_empty() {
        " ".repeat(MAX_SERIAL)
    } else {
        format!("{:<MAX_SERIAL$.MAX_SERIAL$}", disk.serial)
    };
    format!(
        "{dev:<MAX_DEV$.MAX_DEV$} {model:<MAX_MODEL$.MAX_MODEL$} {serial} {size:>MAX_SIZE$.1} GB {usb} {kind} [{tag}]",
        dev = disk.dev,
        model = disk.model,
        size = disk.size_gb,
        usb = if disk.is_usb { "USB" } else { "   " },
        kind = if disk.is_ssd { "SSD" } else { "HDD" },
    )
}

/// Column header matching [`format_row`].
pub fn header_label() -> String {
    format!(
        "{dev:<MAX_DEV$} {model:<MAX_MODEL$} {serial:<MAX_SERIAL$} {size:>MAX_SIZE$}    {kind} [Use]",
        dev = "[Device]",
        model = "[Model]",
        serial = "[Serial]",
        size = "[Size]",
        kind = "[Type]",
    )
}
