//! Network parameter validation
//!
//! The wizard's contract with address validation: hand over the collected
//! record, and on failure display the message and remain on the current
//! page. Leaving every field blank means DHCP and is legal.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// The network answers collected by the network page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub host_ip: String,
    pub controller_ip: String,
    pub subnet_mask: String,
    pub gateway: String,
    pub dns_ip: Option<String>,
}

impl NetworkParams {
    /// True when the operator left everything blank (use DHCP).
    pub fn is_blank(&self) -> bool {
        self.host_ip.trim().is_empty()
            && self.controller_ip.trim().is_empty()
            && self.subnet_mask.trim().is_empty()
            && self.gateway.trim().is_empty()
    }
}

/// Validates a network record, failing with a descriptive message.
pub trait AddressValidator {
    fn validate(&self, params: &NetworkParams) -> Result<(), String>;
}

/// Static IPv4 validation: syntax, contiguous mask, shared subnet, gateway
/// membership.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ipv4Validator;

impl AddressValidator for Ipv4Validator {
    fn validate(&self, params: &NetworkParams) -> Result<(), String> {
        if params.is_blank() {
            return Ok(());
        }
        let host = parse_addr("Host IP address", &params.host_ip)?;
        let controller = parse_addr("Controller IP address", &params.controller_ip)?;
        let mask = parse_addr("Subnet mask", &params.subnet_mask)?;
        let gateway = parse_addr("Gateway", &params.gateway)?;

        let mask_bits = u32::from(mask);
        if mask_bits == 0 || mask_bits.leading_ones() + mask_bits.trailing_zeros() != 32 {
            return Err(format!("'{}' is not a valid subnet mask.", params.subnet_mask));
        }

        let network = |addr: Ipv4Addr| u32::from(addr) & mask_bits;
        if network(host) != network(controller) {
            return Err(
                "Host and controller IP addresses must be in the same subnet.".to_string(),
            );
        }
        if network(gateway) != network(host) {
            return Err("The gateway must be in the host subnet.".to_string());
        }
        if host == controller {
            return Err("Host and controller IP addresses must differ.".to_string());
        }
        if let Some(dns) = params.dns_ip.as_deref() {
            if !dns.trim().is_empty() {
                parse_addr("DNS server", dns)?;
            }
        }
        Ok(())
    }
}

fn parse_addr(what: &str, raw: &str) -> Result<Ipv4Addr, String> {
    raw.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| format!("{what} '{raw}' is not a valid IPv4 address."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(host: &str, controller: &str, mask: &str, gw: &str) -> NetworkParams {
        NetworkParams {
            host_ip: host.to_string(),
            controller_ip: controller.to_string(),
            subnet_mask: mask.to_string(),
            gateway: gw.to_string(),
            dns_ip: None,
        }
    }

    #[test]
    fn test_blank_means_dhcp() {
        assert!(Ipv4Validator.validate(&NetworkParams::default()).is_ok());
    }

    #[test]
    fn test_valid_static_configuration() {
        let p = params("10.1.0.10", "10.1.0.11", "255.255.255.0", "10.1.0.1");
        assert!(Ipv4Validator.validate(&p).is_ok());
    }

    #[test]
    fn test_malformed_address_named_in_message() {
        let p = params("10.1.0", "10.1.0.11", "255.255.255.0", "10.1.0.1");
        let err = Ipv4Validator.validate(&p).unwrap_err();
        assert!(err.contains("Host IP address"));
        assert!(err.contains("10.1.0"));
    }

    #[test]
    fn test_non_contiguous_mask_rejected() {
        let p = params("10.1.0.10", "10.1.0.11", "255.0.255.0", "10.1.0.1");
        let err = Ipv4Validator.validate(&p).unwrap_err();
        assert!(err.contains("subnet mask"));
    }

    #[test]
    fn test_subnet_mismatch_rejected() {
        let p = params("10.1.0.10", "10.2.0.11", "255.255.255.0", "10.1.0.1");
        assert!(Ipv4Validator.validate(&p).is_err());
    }

    #[test]
    fn test_gateway_outside_subnet_rejected() {
        let p = params("10.1.0.10", "10.1.0.11", "255.255.255.0", "10.9.0.1");
        let err = Ipv4Validator.validate(&p).unwrap_err();
        assert!(err.contains("gateway") || err.contains("Gateway"));
    }

    #[test]
    fn test_duplicate_addresses_rejected() {
        let p = params("10.1.0.10", "10.1.0.10", "255.255.255.0", "10.1.0.1");
        assert!(Ipv4Validator.validate(&p).is_err());
    }

    #[test]
    fn test_bad_dns_rejected() {
        let mut p = params("10.1.0.10", "10.1.0.11", "255.255.255.0", "10.1.0.1");
        p.dns_ip = Some("not-an-ip".to_string());
        let err = Ipv4Validator.validate(&p).unwrap_err();
        assert!(err.contains("DNS server"));
    }
}
