//! The accumulated answer set
//!
//! A flat, serializable record written incrementally as pages complete and
//! validated as a unit before the wizard reports success. Extraction never
//! reaches back into torn-down pages: every flow copies its answers into
//! this structure in `collect`.

use serde::{Deserialize, Serialize};

use crate::catalog::Action;
use crate::net::NetworkParams;
use crate::roles::RoleSelection;

/// Sentinel shown in fields the installer may compute itself.
pub const AUTO_SENTINEL: &str = "Let installer decide";

/// Controller VM memory bounds in GB.
pub const RAM_MIN_GB: u32 = 16;
pub const RAM_MAX_GB: u32 = 64;

/// License acceptance state collected from the license page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EulaRecord {
    pub accepted: bool,
    pub viewed: bool,
}

/// Everything the downstream imaging action needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallParams {
    pub keymap: Option<String>,
    pub node_position: Option<String>,
    pub block_id: Option<String>,
    pub node_serial: Option<String>,
    /// Composed `block_id-node_position`, set when both halves are known.
    pub node_name: Option<String>,
    pub cluster_id: Option<String>,
    /// Raw field content; [`AUTO_SENTINEL`] or a number in GB.
    pub controller_ram: Option<String>,
    pub boot_device: Option<String>,
    pub action: Option<Action>,
    pub hypervisor_image: Option<String>,
    pub hypervisor_sku: Option<String>,
    pub controller_image: Option<String>,
    pub iso_url: Option<String>,
    pub network: Option<NetworkParams>,
    pub vlan_id: Option<String>,
    pub single_node_cluster: bool,
    pub dns_ip: Option<String>,
    pub roles: Option<RoleSelection>,
    pub eula: Option<EulaRecord>,
}

impl InstallParams {
    /// Parsed controller RAM, `None` for the auto sentinel or absent field.
    pub fn controller_ram_gb(&self) -> Result<Option<u32>, String> {
        let Some(raw) = self.controller_ram.as_deref() else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() || raw == AUTO_SENTINEL {
            return Ok(None);
        }
        let gb: u32 = raw.parse().map_err(|_| {
            format!("Controller RAM in GB must be an integer of range {RAM_MIN_GB} to {RAM_MAX_GB}.")
        })?;
        if !(RAM_MIN_GB..=RAM_MAX_GB).contains(&gb) {
            return Err(format!(
                "Controller RAM in GB must be an integer of range {RAM_MIN_GB} to {RAM_MAX_GB}."
            ));
        }
        Ok(Some(gb))
    }

    /// Cross-field validation of the complete answer set. Idempotent: the
    /// wizard may re-enter its loop after a rejection and call this again.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(position) = self.node_position.as_deref() {
            if position.trim().is_empty() {
                return Err("A node position must be selected.".to_string());
            }
        }
        self.controller_ram_gb()?;
        if let Some(roles) = &self.roles {
            roles.require_complete()?;
        }
        if let Some(eula) = &self.eula {
            if !eula.viewed {
                return Err(
                    "The license must be read to its end before installation.".to_string()
                );
            }
            if !eula.accepted {
                return Err("The license must be accepted before installation.".to_string());
            }
        }
        if self.single_node_cluster {
            let dns_missing = self
                .dns_ip
                .as_deref()
                .map(|s| s.trim().is_empty())
                .unwrap_or(true);
            if dns_missing {
                return Err("A DNS server is required for a single-node cluster.".to_string());
            }
        }
        Ok(())
    }
}

/// Values detected from the hardware before the wizard starts. Detected
/// fields render with a `*` marker and pre-populate their controls.
#[derive(Debug, Clone, Default)]
pub struct Detected {
    pub model_string: String,
    pub node_position: Option<String>,
    pub block_id: Option<String>,
    pub node_serial: Option<String>,
    pub cluster_id: Option<String>,
}

impl Detected {
    pub fn any_detected(&self) -> bool {
        self.node_position.is_some()
            || self.block_id.is_some()
            || self.node_serial.is_some()
            || self.cluster_id.is_some()
    }

    /// Marker character for a field's label.
    pub fn marker(detected: bool) -> char {
        if detected {
            '*'
        } else {
            ' '
        }
    }
}

/// The final consumer of a validated answer set. The wizard's only
/// obligation is to hand over a validated record; a failure here is fatal to
/// the process, not recoverable by re-entering the wizard.
pub trait Imager {
    fn apply(&self, params: &InstallParams) -> anyhow::Result<()>;
}

/// Default consumer: emit the answers as JSON for the imaging stage.
pub struct JsonImager {
    path: std::path::PathBuf,
}

impl JsonImager {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Imager for JsonImager {
    fn apply(&self, params: &InstallParams) -> anyhow::Result<()> {
        use anyhow::Context;
        let json = serde_json::to_string_pretty(params).context("serializing parameters")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing parameters to {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "parameters written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_validate() {
        assert!(InstallParams::default().validate().is_ok());
    }

    #[test]
    fn test_ram_sentinel_is_auto() {
        let params = InstallParams {
            controller_ram: Some(AUTO_SENTINEL.to_string()),
            ..Default::default()
        };
        assert_eq!(params.controller_ram_gb().unwrap(), None);
    }

    #[test]
    fn test_ram_bounds_enforced() {
        for (raw, ok) in [("16", true), ("64", true), ("15", false), ("65", false), ("lots", false)] {
            let params = InstallParams {
                controller_ram: Some(raw.to_string()),
                ..Default::default()
            };
            assert_eq!(params.validate().is_ok(), ok, "raw = {raw}");
        }
    }

    #[test]
    fn test_blank_node_position_rejected() {
        let params = InstallParams {
            node_position: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_eula_must_be_viewed_and_accepted() {
        let mut params = InstallParams {
            eula: Some(EulaRecord {
                accepted: true,
                viewed: false,
            }),
            ..Default::default()
        };
        assert!(params.validate().is_err());
        params.eula = Some(EulaRecord {
            accepted: false,
            viewed: true,
        });
        assert!(params.validate().is_err());
        params.eula = Some(EulaRecord {
            accepted: true,
            viewed: true,
        });
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_single_node_requires_dns() {
        let mut params = InstallParams {
            single_node_cluster: true,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        params.dns_ip = Some("8.8.8.8".to_string());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_round_trip_json() {
        let params = InstallParams {
            node_serial: Some("SN123".to_string()),
            controller_ram: Some("32".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: InstallParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_serial.as_deref(), Some("SN123"));
        assert_eq!(back.controller_ram_gb().unwrap(), Some(32));
    }
}
