//! Hardware environment probes
//!
//! Disk enumeration and keymap discovery, behind traits so the wizard can be
//! driven with fakes in tests. Disk facts come from sysfs directly — no
//! shelling out; the `size` file is 512-byte sectors regardless of the
//! device's logical block size.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Facts about one storage device, as the wizard needs them: enough to
/// render a pick-list row and drive role assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskInfo {
    /// Kernel name, e.g. `sda` or `nvme0n1`.
    pub dev: String,
    pub model: String,
    pub serial: String,
    pub size_gb: f64,
    pub is_ssd: bool,
    pub is_usb: bool,
}

impl fmt::Display for DiskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Model [{}], Size [{:.2}] GB, Serial [{}]",
            self.dev, self.model, self.size_gb, self.serial
        )
    }
}

/// Source of storage device facts.
pub trait DiskSource {
    fn disks(&self) -> Result<Vec<DiskInfo>>;
}

/// Reads block devices from `/sys/block`.
pub struct SysfsDiskSource {
    root: PathBuf,
}

impl SysfsDiskSource {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/sys/block"),
        }
    }

    /// Probe a different sysfs root (tests).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsDiskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskSource for SysfsDiskSource {
    fn disks(&self) -> Result<Vec<DiskInfo>> {
        let mut out = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("reading {}", self.root.display()))?;
        for entry in entries.flatten() {
            let dev = entry.file_name().to_string_lossy().to_string();
            if skip_device(&dev) {
                continue;
            }
            let sysfs = self.root.join(&dev);
            let Some(size_gb) = read_size_gb(&sysfs) else {
                continue;
            };
            if size_gb <= 0.0 {
                continue;
            }
            let model = read_trimmed(sysfs.join("device/model")).unwrap_or_default();
            let serial = read_trimmed(sysfs.join("device/serial"))
                .or_else(|| read_trimmed(sysfs.join("serial")))
                .unwrap_or_default();
            let is_ssd = read_trimmed(sysfs.join("queue/rotational"))
                .map(|v| v == "0")
                .unwrap_or(false);
            let is_usb = is_usb_device(&sysfs);
            out.push(DiskInfo {
                dev,
                model,
                serial,
                size_gb,
                is_ssd,
                is_usb,
            });
        }
        out.sort_by(|a, b| a.dev.cmp(&b.dev));
        info!(count = out.len(), "disk enumeration complete");
        Ok(out)
    }
}

/// Loop, ram and device-mapper nodes are never imaging targets.
fn skip_device(name: &str) -> bool {
    name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("dm-")
        || name.starts_with("zram")
        || name.starts_with("sr")
        || name.starts_with("fd")
}

fn read_size_gb(sysfs: &Path) -> Option<f64> {
    let sectors: u64 = read_trimmed(sysfs.join("size"))?.parse().ok()?;
    Some(sectors as f64 * 512.0 / 1_000_000_000.0)
}

fn read_trimmed(path: PathBuf) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// A device is treated as USB-attached when its resolved sysfs device path
/// crosses a USB controller, or when it is flagged removable.
fn is_usb_device(sysfs: &Path) -> bool {
    if let Ok(target) = fs::canonicalize(sysfs) {
        if target.to_string_lossy().contains("/usb") {
            return true;
        }
    }
    read_trimmed(sysfs.join("removable"))
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Source of console keymap names.
pub trait KeymapSource {
    fn keymaps(&self) -> Result<Vec<String>>;
    fn current(&self) -> Result<String>;
}

/// Asks `localectl`, falling back to walking the keymap directory tree when
/// systemd is not available on the installer image.
pub struct LocalectlKeymaps {
    fallback_dir: PathBuf,
}

impl LocalectlKeymaps {
    pub fn new() -> Self {
        Self {
            fallback_dir: PathBuf::from("/usr/lib/kbd/keymaps"),
        }
    }

    pub fn with_fallback(dir: impl Into<PathBuf>) -> Self {
        Self {
            fallback_dir: dir.into(),
        }
    }

    fn from_directory(&self) -> Result<Vec<String>> {
        let mut maps = Vec::new();
        collect_keymaps(&self.fallback_dir, &mut maps)?;
        maps.sort();
        maps.dedup();
        Ok(maps)
    }
}

impl Default for LocalectlKeymaps {
    fn default() -> Self {
        Self::new()
    }
}

impl KeymapSource for LocalectlKeymaps {
    fn keymaps(&self) -> Result<Vec<String>> {
        match Command::new("localectl").arg("list-keymaps").output() {
            Ok(output) if output.status.success() => {
                let maps: Vec<String> = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect();
                if maps.is_empty() {
                    anyhow::bail!("localectl returned no keymaps");
                }
                Ok(maps)
            }
            other => {
                if let Err(e) = other {
                    warn!("localectl unavailable ({e}); falling back to keymap directory");
                }
                self.from_directory()
            }
        }
    }

    fn current(&self) -> Result<String> {
        let output = Command::new("localectl")
            .arg("status")
            .output()
            .context("running localectl status")?;
        let text = String::from_utf8_lossy(&output.stdout).to_string();
        for line in text.lines() {
            if let Some(rest) = line.trim().strip_prefix("VC Keymap:") {
                return Ok(rest.trim().to_string());
            }
        }
        Ok("us".to_string())
    }
}

fn collect_keymaps(dir: &Path, out: &mut Vec<String>) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => anyhow::bail!("no keymaps under {}: {e}", dir.display()),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let _ = collect_keymaps(&path, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(stem) = name.strip_suffix(".map.gz").or_else(|| name.strip_suffix(".map")) {
                out.push(stem.to_string());
            }
        }
    }
    Ok(())
}

/// Node position choices for the position carousel. A detected position
/// collapses the list to that single entry; otherwise a blank sentinel is
/// inserted first so the operator must pick one deliberately.
pub fn node_position_choices(detected: Option<&str>) -> Vec<(String, String)> {
    if let Some(position) = detected {
        return vec![(format!("{position}  "), position.to_string())];
    }
    let mut choices = vec![("   ".to_string(), " ".to_string())];
    for slot in ["A", "B", "C", "D"] {
        choices.push((format!("{slot}  "), slot.to_string()));
    }
    choices
}
