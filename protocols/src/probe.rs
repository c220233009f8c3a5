use pnet::util::MacAddr;

use crate::ethernet;

/// Fixed payload of a discovery probe.
pub const PROBE_PAYLOAD: [u8; 2] = [0x02, 0x00];

/// Broadcast probe sent from `src_mac`.
pub fn create_probe(src_mac: MacAddr) -> anyhow::Result<Vec<u8>> {
    ethernet::create_frame(src_mac, MacAddr::broadcast(), &PROBE_PAYLOAD)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
