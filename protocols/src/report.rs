//! Device report codec.
//!
//! A report is the device's answer to a probe. It carries no checksum; a
//! frame on the right ethertype with at least [`REPORT_HEADER_LEN`] payload
//! bytes always decodes. Layout, big-endian:
//!
//! | offset | field       |
//! |--------|-------------|
//! | 0      | subtype     |
//! | 1      | status      |
//! | 2..6   | version     |
//! | 6..8   | chip id     |
//! | 8      | mode        |
//! | 9      | revision    |
//! | 10..14 | svn version |
//! | 14..18 | app version |
//! | 18..   | tail        |

use hgota_common::models::report::{FirmwareVersion, ScanReport};
use pnet::packet::Packet;
use pnet::packet::ethernet::EthernetPacket;

use crate::ethernet;

pub const REPORT_HEADER_LEN: usize = 18;

/// Decodes a captured frame into a report tagged with `adapter`.
///
/// Returns `None` for frames on another ethertype or with a short payload.
/// `interface` is left empty for the scanner to fill in.
pub fn decode(eth: &EthernetPacket, adapter: &str) -> Option<ScanReport> {
    if !ethernet::is_hg_frame(eth) {
        return None;
    }

    let b: &[u8] = eth.payload();
    if b.len() < REPORT_HEADER_LEN {
        return None;
    }

    Some(ScanReport {
        adapter: adapter.to_string(),
        interface: String::new(),
        device_mac: eth.get_source(),
        host_mac: eth.get_destination(),
        subtype: b[0],
        status: b[1],
        version: FirmwareVersion(u32::from_be_bytes([b[2], b[3], b[4], b[5]])),
        chip_id: u16::from_be_bytes([b[6], b[7]]),
        mode: b[8],
        revision: b[9],
        svn_version: u32::from_be_bytes([b[10], b[11], b[12], b[13]]),
        app_version: u32::from_be_bytes([b[14], b[15], b[16], b[17]]),
        raw: b.to_vec(),
        tail: b[REPORT_HEADER_LEN..].to_vec(),
    })
}

/// Serializes the fixed header from the decoded fields.
pub fn encode_header(report: &ScanReport) -> [u8; REPORT_HEADER_LEN] {
    let mut out = [0u8; REPORT_HEADER_LEN];
    out[0] = report.subtype;
    out[1] = report.status;
    out[2..6].copy_from_slice(&report.version.0.to_be_bytes());
    out[6..8].copy_from_slice(&report.chip_id.to_be_bytes());
    out[8] = report.mode;
    out[9] = report.revision;
    out[10..14].copy_from_slice(&report.svn_version.to_be_bytes());
    out[14..18].copy_from_slice(&report.app_version.to_be_bytes());
    out
}

/// Header followed by the tail, as a device would send it.
pub fn encode(report: &ScanReport) -> Vec<u8> {
    let mut out = encode_header(report).to_vec();
    out.extend_from_slice(&report.tail);
    out
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
