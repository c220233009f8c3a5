use std::fmt;

use pnet::util::MacAddr;

/// Firmware version packed as four bytes, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FirmwareVersion(pub u32);

impl FirmwareVersion {
    pub fn octets(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

/// A device's answer to a discovery probe, received on one adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Display name of the adapter the report arrived on.
    pub adapter: String,
    /// OS name of that adapter, the handle a later transfer reopens it by.
    pub interface: String,
    pub device_mac: MacAddr,
    /// Our own address on that adapter.
    pub host_mac: MacAddr,
    pub subtype: u8,
    pub status: u8,
    pub version: FirmwareVersion,
    pub chip_id: u16,
    pub mode: u8,
    pub revision: u8,
    pub svn_version: u32,
    pub app_version: u32,
    /// Whole payload as received.
    pub raw: Vec<u8>,
    /// Bytes past the fixed header, kept verbatim.
    pub tail: Vec<u8>,
}

impl ScanReport {
    pub fn version_str(&self) -> String {
        self.version.to_string()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
