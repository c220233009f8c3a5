//! In-memory links and simulated devices.
//!
//! A [`MockLink`] records every frame sent through it and feeds each one to
//! an optional responder whose output frames become receivable. The
//! responders in this module emulate a device on the far end of the wire.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Context;
use hgota_common::models::report::ScanReport;
use hgota_common::network::interface::Adapter;
use hgota_protocols::{ack, chunk, ethernet, probe, report};
use pnet::packet::Packet;
use pnet::util::MacAddr;

use super::channel::{FrameReceiver, FrameSender, LinkHandle, LinkOpener};

const IDLE_WAIT: Duration = Duration::from_millis(2);

/// Maps one sent frame to the frames the far end answers with.
pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

#[derive(Default)]
struct LinkState {
    sent: Vec<Vec<u8>>,
    inbox: VecDeque<Vec<u8>>,
    responder: Option<Responder>,
}

#[derive(Clone, Default)]
pub struct MockLink {
    state: Arc<Mutex<LinkState>>,
}

impl MockLink {
    /// A link nobody answers on.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responder(responder: Responder) -> Self {
        let link = Self::new();
        link.lock().responder = Some(responder);
        link
    }

    /// Queues an unsolicited inbound frame.
    pub fn inject(&self, frame: Vec<u8>) {
        self.lock().inbox.push_back(frame);
    }

    /// Every frame sent so far, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    pub fn handle(&self) -> LinkHandle {
        LinkHandle {
            tx: Box::new(self.clone()),
            rx: Box::new(self.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameSender for MockLink {
    fn send_frame(&mut self, frame: &[u8]) -> anyhow::Result<()> {
        let mut state = self.lock();
        state.sent.push(frame.to_vec());
        let replies = match state.responder.as_mut() {
            Some(responder) => responder(frame),
            None => Vec::new(),
        };
        state.inbox.extend(replies);
        Ok(())
    }
}

impl FrameReceiver for MockLink {
    fn next_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        if let Some(frame) = self.lock().inbox.pop_front() {
            return Ok(Some(frame));
        }
        std::thread::sleep(IDLE_WAIT);
        Ok(None)
    }
}

/// Hands out [`MockLink`]s by adapter name. Unknown adapters fail to open.
#[derive(Default)]
pub struct MockOpener {
    links: Mutex<HashMap<String, MockLink>>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, adapter: &str, link: MockLink) {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(adapter.to_string(), link);
    }

    pub fn link(&self, adapter: &str) -> Option<MockLink> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(adapter)
            .cloned()
    }
}

impl LinkOpener for MockOpener {
    fn open(&self, adapter: &Adapter) -> anyhow::Result<LinkHandle> {
        let link = self
            .link(&adapter.name)
            .with_context(|| format!("no mock link for {}", adapter.name))?;
        Ok(link.handle())
    }
}

/// Device that answers every probe with `template`, sent from `device_mac`
/// to the prober.
pub fn report_responder(device_mac: MacAddr, template: ScanReport) -> Responder {
    let payload = report::encode(&template);
    Box::new(move |frame: &[u8]| {
        let Ok(eth) = ethernet::get_packet_from_u8(frame) else {
            return Vec::new();
        };
        if !ethernet::is_hg_frame(&eth) || eth.payload() != &probe::PROBE_PAYLOAD[..] {
            return Vec::new();
        }
        ethernet::create_frame(device_mac, eth.get_source(), &payload)
            .into_iter()
            .collect()
    })
}

/// Device that acknowledges every data chunk addressed to it, echoing the
/// chunk header.
pub fn ack_responder(device_mac: MacAddr) -> Responder {
    Box::new(move |frame: &[u8]| {
        let Ok(eth) = ethernet::get_packet_from_u8(frame) else {
            return Vec::new();
        };
        if eth.get_destination() != device_mac {
            return Vec::new();
        }
        match chunk::decode(eth.payload()) {
            Some((descriptor, _)) => {
                ethernet::create_frame(device_mac, eth.get_source(), &ack::encode(&descriptor))
                    .into_iter()
                    .collect()
            }
            None => Vec::new(),
        }
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
