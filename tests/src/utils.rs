use std::time::Duration;

use hgota_common::config::{AckPolicy, FlashConfig, ScanConfig};
use hgota_common::models::report::{FirmwareVersion, ScanReport};
use hgota_common::network::interface::{Adapter, InterfaceEnumerator};
use hgota_core::network::mock::MockLink;
use hgota_protocols::{chunk, ethernet};
use pnet::packet::Packet;
use pnet::util::MacAddr;

pub const HOST: MacAddr = MacAddr(0x3c, 0x22, 0xfb, 0x10, 0x20, 0x30);
pub const DEVICE: MacAddr = MacAddr(0x02, 0x48, 0x47, 0x00, 0x00, 0x42);
pub const DEVICE_STR: &str = "02:48:47:00:00:42";

pub fn adapter(name: &str, index: u32, mac: Option<MacAddr>) -> Adapter {
    Adapter {
        name: name.to_string(),
        display_name: format!("{name} ({index})"),
        index,
        mac,
        loopback: false,
    }
}

pub fn lo() -> Adapter {
    Adapter {
        name: "lo".to_string(),
        display_name: "lo".to_string(),
        index: 1,
        mac: Some(MacAddr::zero()),
        loopback: true,
    }
}

pub struct FixedAdapters(pub Vec<Adapter>);

impl InterfaceEnumerator for FixedAdapters {
    fn adapters(&self) -> Vec<Adapter> {
        self.0.clone()
    }
}

pub fn template() -> ScanReport {
    ScanReport {
        adapter: String::new(),
        interface: String::new(),
        device_mac: DEVICE,
        host_mac: MacAddr::zero(),
        subtype: 0x01,
        status: 0x00,
        version: FirmwareVersion(0x0203_0001),
        chip_id: 0x8088,
        mode: 1,
        revision: 2,
        svn_version: 4711,
        app_version: 9,
        raw: Vec::new(),
        tail: vec![0xde, 0xad],
    }
}

pub fn scan_cfg() -> ScanConfig {
    ScanConfig {
        probe_count: 3,
        probe_period: Duration::from_millis(5),
        listen_duration: Duration::from_millis(200),
        warmup: Duration::from_millis(10),
    }
}

pub fn flash_cfg(retries: u32) -> FlashConfig {
    FlashConfig {
        chunk_size: 1400,
        step: None,
        timeout_secs: 0.05,
        retries,
        ack_policy: AckPolicy::Lenient,
    }
}

pub fn firmware(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

/// Data chunks sent over `link`, in send order.
pub fn sent_chunks(link: &MockLink) -> Vec<chunk::ChunkDescriptor> {
    link.sent()
        .iter()
        .filter_map(|frame| {
            let eth = ethernet::get_packet_from_u8(frame).ok()?;
            chunk::decode(eth.payload()).map(|(descriptor, _)| descriptor)
        })
        .collect()
}
