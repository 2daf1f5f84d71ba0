//! Image and action catalog
//!
//! The wizard's view of what can be installed: which imaging actions this
//! node allows, and which hypervisor/controller images are available for
//! each. Carousels are populated from (display label, opaque handle) pairs;
//! an empty category yields the single "Not Required" entry so every
//! carousel always has a selection.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::info;

/// Handle used where a category has nothing to offer.
pub const NOT_REQUIRED: &str = "NR";

/// Imaging actions the wizard can offer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum Action {
    #[strum(serialize = "install_hypervisor")]
    InstallHypervisor,
    #[strum(serialize = "configure_hypervisor")]
    ConfigureHypervisor,
    #[strum(serialize = "install_controller")]
    InstallController,
    #[strum(serialize = "repair_controller")]
    RepairController,
}

impl Action {
    /// Label shown in the action carousel.
    pub fn label(self) -> &'static str {
        match self {
            Self::InstallHypervisor => "Install hypervisor",
            Self::ConfigureHypervisor => "Configure hypervisor",
            Self::InstallController => "Install controller VM",
            Self::RepairController => "Repair controller VM",
        }
    }

    pub fn needs_hypervisor_image(self) -> bool {
        matches!(self, Self::InstallHypervisor)
    }

    pub fn needs_controller_image(self) -> bool {
        matches!(self, Self::InstallController | Self::RepairController)
    }
}

/// Catalog contract the wizard consumes.
pub trait ImageCatalog {
    /// Actions legal on this node, in carousel order. Never empty.
    fn actions(&self) -> Vec<Action>;

    /// Hypervisor images available for `action`.
    fn hypervisor_images(&self, action: Action) -> Vec<(String, String)>;

    /// Controller images available for `action`.
    fn controller_images(&self, action: Action) -> Vec<(String, String)>;

    /// SKU choices for the hypervisor image named by `handle`.
    fn skus(&self, handle: &str) -> Vec<(String, String)>;
}

/// The fallback single-entry choice list.
pub fn not_required() -> Vec<(String, String)> {
    vec![("Not Required".to_string(), NOT_REQUIRED.to_string())]
}

/// Catalog backed by an images directory:
///
/// ```text
/// images/
///   hypervisor/<kind>/<image files>
///   controller/<image files>
/// ```
pub struct DirCatalog {
    root: PathBuf,
    hypervisors: Vec<(String, String)>,
    controllers: Vec<(String, String)>,
}

impl DirCatalog {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let hypervisors = scan_hypervisors(&root.join("hypervisor"))?;
        let controllers = scan_images(&root.join("controller"))?;
        info!(
            root = %root.display(),
            hypervisors = hypervisors.len(),
            controllers = controllers.len(),
            "image catalog loaded"
        );
        Ok(Self {
            root,
            hypervisors,
            controllers,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageCatalog for DirCatalog {
    fn actions(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = Action::iter()
            .filter(|action| {
                if action.needs_hypervisor_image() {
                    !self.hypervisors.is_empty()
                } else if action.needs_controller_image() {
                    !self.controllers.is_empty()
                } else {
                    true
                }
            })
            .collect();
        if actions.is_empty() {
            actions.push(Action::ConfigureHypervisor);
        }
        actions
    }

    fn hypervisor_images(&self, action: Action) -> Vec<(String, String)> {
        if !action.needs_hypervisor_image() || self.hypervisors.is_empty() {
            return not_required();
        }
        self.hypervisors.clone()
    }

    fn controller_images(&self, action: Action) -> Vec<(String, String)> {
        if !action.needs_controller_image() || self.controllers.is_empty() {
            return not_required();
        }
        self.controllers.clone()
    }

    fn skus(&self, handle: &str) -> Vec<(String, String)> {
        // SKU editions only exist for the hyperv family.
        if handle == NOT_REQUIRED || !handle.contains("hyperv") {
            return not_required();
        }
        vec![
            ("STANDARD".to_string(), "standard".to_string()),
            ("DATACENTER".to_string(), "datacenter".to_string()),
            ("STANDARD WITH GUI".to_string(), "standard_gui".to_string()),
            ("DATACENTER WITH GUI".to_string(), "datacenter_gui".to_string()),
        ]
    }
}

fn scan_hypervisors(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut images = Vec::new();
    if !dir.exists() {
        return Ok(images);
    }
    for entry in fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .flatten()
    {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let kind = entry.file_name().to_string_lossy().to_string();
        for (label, handle) in scan_images(&path)? {
            images.push((format!("{} ({})", kind.to_uppercase(), label), format!("{kind}:{handle}")));
        }
    }
    images.sort();
    Ok(images)
}

fn scan_images(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut images = Vec::new();
    if !dir.exists() {
        return Ok(images);
    }
    for entry in fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .flatten()
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let label = name
            .trim_end_matches(".iso")
            .trim_end_matches(".img")
            .trim_end_matches(".tar.gz")
            .to_string();
        images.push((label, path.to_string_lossy().to_string()));
    }
    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn catalog_with(hyp: &[(&str, &str)], controller: &[&str]) -> (tempfile::TempDir, DirCatalog) {
        let tmp = tempfile::tempdir().unwrap();
        for (kind, image) in hyp {
            let dir = tmp.path().join("hypervisor").join(kind);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(image), b"x").unwrap();
        }
        let controller_dir = tmp.path().join("controller");
        fs::create_dir_all(&controller_dir).unwrap();
        for image in controller {
            fs::write(controller_dir.join(image), b"x").unwrap();
        }
        let catalog = DirCatalog::open(tmp.path()).unwrap();
        (tmp, catalog)
    }

    #[test]
    fn test_actions_follow_available_images() {
        let (_tmp, catalog) = catalog_with(&[("kvm", "hyp-2.0.iso")], &["ctl-5.1.tar.gz"]);
        let actions = catalog.actions();
        assert!(actions.contains(&Action::InstallHypervisor));
        assert!(actions.contains(&Action::InstallController));
    }

    #[test]
    fn test_missing_images_prune_actions() {
        let (_tmp, catalog) = catalog_with(&[], &[]);
        let actions = catalog.actions();
        assert!(!actions.contains(&Action::InstallHypervisor));
        assert!(!actions.contains(&Action::InstallController));
        assert!(!actions.is_empty());
    }

    #[test]
    fn test_hypervisor_handles_carry_kind_prefix() {
        let (_tmp, catalog) = catalog_with(&[("kvm", "hyp-2.0.iso")], &[]);
        let images = catalog.hypervisor_images(Action::InstallHypervisor);
        assert_eq!(images.len(), 1);
        assert!(images[0].0.starts_with("KVM"));
        assert!(images[0].1.starts_with("kvm:"));
    }

    #[test]
    fn test_not_required_fallback() {
        let (_tmp, catalog) = catalog_with(&[("kvm", "hyp.iso")], &[]);
        let images = catalog.controller_images(Action::ConfigureHypervisor);
        assert_eq!(images, not_required());
    }

    #[test]
    fn test_skus_only_for_hyperv() {
        let (_tmp, catalog) = catalog_with(&[("hyperv", "win.iso"), ("kvm", "hyp.iso")], &[]);
        assert_eq!(catalog.skus("kvm:/x/hyp.iso"), not_required());
        let skus = catalog.skus("hyperv:/x/win.iso");
        assert_eq!(skus.len(), 4);
        assert_eq!(skus[0].1, "standard");
    }

    #[test]
    fn test_action_string_round_trip() {
        for action in Action::iter() {
            let s = action.to_string();
            let parsed: Action = s.parse().unwrap();
            assert_eq!(action, parsed);
        }
    }
}
