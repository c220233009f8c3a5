use colored::*;
use hgota_common::config::Config;
use hgota_common::models::report::ScanReport;
use hgota_common::network::interface::Adapter;
use hgota_common::network::mac;
use pnet::util::MacAddr;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn mac_to_detail(key: &str, mac: MacAddr) -> Detail {
    (key.to_string(), mac.to_string().color(colors::MAC_ADDR))
}

pub fn vendor_to_detail(mac: MacAddr) -> Option<Detail> {
    mac::get_vendor(mac).map(|vendor| ("Vendor".to_string(), vendor.color(colors::TEXT_DEFAULT)))
}

pub fn report_to_details(report: &ScanReport, cfg: &Config) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![mac_to_detail("Device", report.device_mac)];

    if let Some(vendor) = vendor_to_detail(report.device_mac) {
        details.push(vendor);
    }

    details.push(("Adapter".to_string(), report.adapter.normal()));
    details.push(("Version".to_string(), report.version_str().color(colors::VERSION).bold()));
    details.push(("Chip".to_string(), format!("0x{:04x}", report.chip_id).normal()));

    if cfg.quiet == 0 {
        details.push(mac_to_detail("Host", report.host_mac));
        details.push(("Mode".to_string(), report.mode.to_string().normal()));
        details.push(("Rev".to_string(), report.revision.to_string().normal()));
        details.push(("SVN".to_string(), report.svn_version.to_string().normal()));
        details.push(("App".to_string(), report.app_version.to_string().normal()));
        details.push((
            "Status".to_string(),
            format!("type={} status={}", report.subtype, report.status).dimmed(),
        ));
    }

    details
}

pub fn adapter_to_details(adapter: &Adapter) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if adapter.display_name != adapter.name {
        details.push(("Name".to_string(), adapter.name.normal()));
    }
    details.push(("Index".to_string(), adapter.index.to_string().normal()));

    match adapter.mac {
        Some(mac) => {
            details.push(mac_to_detail("MAC", mac));
            if let Some(vendor) = vendor_to_detail(mac) {
                details.push(vendor);
            }
        }
        None => details.push(("MAC".to_string(), "none".red())),
    }

    details
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
