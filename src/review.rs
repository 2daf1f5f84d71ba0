//! Review-page text synthesis
//!
//! Turns the collected answers into the human-readable summary shown before
//! the final confirmation, and carries the line-wrap helper the summary (and
//! long status messages) are wrapped with.

use crate::catalog::NOT_REQUIRED;
use crate::params::InstallParams;

/// Widest line on the review page.
pub const REVIEW_WIDTH: usize = 65;

/// Wrap `text` into lines at most `width` wide, breaking on spaces where
/// possible; continuation lines are indented by `indent` spaces. The loop is
/// explicitly bounded: a pathological input degrades to hard breaks instead
/// of recursing.
pub fn wrap_line(text: &str, width: usize, indent: usize) -> Vec<String> {
    let width = width.max(indent + 2).max(2);
    let mut lines = Vec::new();
    let mut rest = text.to_string();
    let pad = " ".repeat(indent);
    // explicit bound: progress is at least one character per line
    let max_lines = text.len() + 2;
    while rest.len() > width && lines.len() < max_lines {
        let head = &rest[..width];
        let break_at = match head.rfind(' ') {
            Some(pos) if pos > indent => pos,
            _ => width - 1,
        };
        lines.push(rest[..break_at].to_string());
        let tail = rest[break_at..].trim_start().to_string();
        rest = format!("{pad}{tail}");
    }
    lines.push(rest);
    lines
}

/// The review body: what will happen to this node, one wrapped line per
/// collected answer that matters.
pub fn synthesize(params: &InstallParams) -> Vec<String> {
    let mut raw = Vec::new();

    if let Some(action) = params.action {
        raw.push(format!("Action: {}", action.label()));
    }
    if let Some(image) = params.hypervisor_image.as_deref() {
        if image != NOT_REQUIRED {
            raw.push(format!("   Hypervisor image: {image}"));
        }
    }
    if let Some(sku) = params.hypervisor_sku.as_deref() {
        if sku != NOT_REQUIRED {
            raw.push(format!("   Hypervisor SKU: {sku}"));
        }
    }
    if let Some(image) = params.controller_image.as_deref() {
        if image != NOT_REQUIRED {
            raw.push(format!("   Controller image: {image}"));
        }
    }
    if let Some(name) = params.node_name.as_deref() {
        raw.push(format!("   Node name: {name}"));
    }
    if let Some(serial) = params.node_serial.as_deref() {
        if !serial.is_empty() {
            raw.push(format!("   Node serial: {serial}"));
        }
    }
    if let Some(device) = params.boot_device.as_deref() {
        if device != NOT_REQUIRED {
            raw.push(format!("   Boot device: {device}"));
        }
    }
    if let Some(network) = &params.network {
        if network.is_blank() {
            raw.push("   Network: DHCP".to_string());
        } else {
            raw.push(format!(
                "   Network: host {} / controller {} mask {} gw {}",
                network.host_ip, network.controller_ip, network.subnet_mask, network.gateway
            ));
        }
    }
    if params.single_node_cluster {
        let dns = params.dns_ip.as_deref().unwrap_or("");
        raw.push(format!("   Single-node cluster with DNS {dns}"));
    }
    if raw.is_empty() {
        raw.push("No actions selected.".to_string());
    }

    let mut lines = Vec::new();
    for line in raw {
        lines.extend(wrap_line(&line, REVIEW_WIDTH, 3));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Action;

    #[test]
    fn test_short_line_passes_through() {
        assert_eq!(wrap_line("short", 20, 0), vec!["short".to_string()]);
    }

    #[test]
    fn test_wrap_breaks_on_spaces() {
        let lines = wrap_line("alpha beta gamma delta epsilon", 12, 0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 12, "{line:?} too wide");
        }
        assert_eq!(lines[0], "alpha beta");
    }

    #[test]
    fn test_wrap_indents_continuations() {
        let lines = wrap_line("Action: install everything on every node in the block", 20, 8);
        assert!(lines.len() > 1);
        for cont in &lines[1..] {
            assert!(cont.starts_with("        "), "{cont:?} not indented");
        }
    }

    #[test]
    fn test_unbreakable_text_hard_breaks() {
        let lines = wrap_line(&"x".repeat(100), 20, 0);
        assert!(lines.len() >= 5);
        for line in &lines {
            assert!(line.len() <= 20);
        }
    }

    #[test]
    fn test_synthesize_names_the_action() {
        let params = InstallParams {
            action: Some(Action::InstallHypervisor),
            hypervisor_image: Some("KVM (hyp-2.0)".to_string()),
            node_name: Some("BLK01-A".to_string()),
            ..Default::default()
        };
        let lines = synthesize(&params);
        assert!(lines[0].contains("Install hypervisor"));
        assert!(lines.iter().any(|l| l.contains("KVM")));
        assert!(lines.iter().any(|l| l.contains("BLK01-A")));
    }

    #[test]
    fn test_synthesize_skips_not_required() {
        let params = InstallParams {
            action: Some(Action::ConfigureHypervisor),
            hypervisor_image: Some(NOT_REQUIRED.to_string()),
            ..Default::default()
        };
        let lines = synthesize(&params);
        assert!(!lines.iter().any(|l| l.contains("Hypervisor image")));
    }

    #[test]
    fn test_synthesize_empty_params() {
        let lines = synthesize(&InstallParams::default());
        assert_eq!(lines, vec!["No actions selected.".to_string()]);
    }
}
