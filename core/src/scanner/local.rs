//! Discovery on a single adapter.
//!
//! A sender thread broadcasts probes while the calling thread listens for
//! reports. The listen window is measured from the start of the scan and does
//! not depend on how far the sender got.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use hgota_common::cancel::CancelToken;
use hgota_common::config::ScanConfig;
use hgota_common::error::OtaError;
use hgota_common::models::report::ScanReport;
use hgota_common::network::interface::Adapter;
use hgota_protocols::{ethernet, probe, report};
use pnet::util::MacAddr;
use tracing::{debug, trace, warn};

use crate::network::channel::{FrameReceiver, FrameSender, LinkHandle, LinkOpener};

pub(super) struct AdapterScan<'a> {
    adapter: &'a Adapter,
    cfg: &'a ScanConfig,
    cancel: &'a CancelToken,
}

impl<'a> AdapterScan<'a> {
    pub(super) fn new(adapter: &'a Adapter, cfg: &'a ScanConfig, cancel: &'a CancelToken) -> Self {
        Self { adapter, cfg, cancel }
    }

    pub(super) fn run(&self, opener: &dyn LinkOpener) -> Result<Vec<ScanReport>, OtaError> {
        let deadline = Instant::now()
            .checked_add(self.cfg.listen_duration)
            .ok_or_else(|| OtaError::format("listen window overflows the clock"))?;

        let own_mac = match self.adapter.hardware_addr() {
            Ok(mac) => mac,
            Err(e) => {
                debug!("skipping: {e}");
                return Ok(Vec::new());
            }
        };

        let link_err = |e| OtaError::link(&self.adapter.display_name, e);
        let LinkHandle { tx, rx } = opener.open(self.adapter).map_err(link_err)?;
        let probe_frame = probe::create_probe(own_mac).map_err(link_err)?;

        let reports = std::thread::scope(|s| {
            s.spawn(|| self.send_probes(tx, &probe_frame, deadline));
            self.listen(rx, own_mac, deadline)
        });
        Ok(reports)
    }

    fn send_probes(&self, mut tx: Box<dyn FrameSender>, probe_frame: &[u8], deadline: Instant) {
        if !self.pause(self.cfg.warmup, deadline) {
            return;
        }
        for sent in 0..self.cfg.probe_count {
            if let Err(e) = tx.send_frame(probe_frame) {
                warn!("probe {sent} on {} failed: {e:#}", self.adapter.display_name);
                return;
            }
            if !self.pause(self.cfg.probe_period, deadline) {
                return;
            }
        }
    }

    /// Sleeps for `duration` without crossing `deadline`. `false` means stop.
    fn pause(&self, duration: Duration, deadline: Instant) -> bool {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        self.cancel.sleep(duration.min(remaining)) && Instant::now() < deadline
    }

    fn listen(&self, mut rx: Box<dyn FrameReceiver>, own_mac: MacAddr, deadline: Instant) -> Vec<ScanReport> {
        let mut found: Vec<ScanReport> = Vec::new();
        let mut seen: HashSet<MacAddr> = HashSet::new();

        while Instant::now() < deadline && !self.cancel.is_cancelled() {
            match rx.next_frame() {
                Ok(Some(frame)) => {
                    if let Some(rep) = accept_report(&frame, own_mac, &mut seen, self.adapter) {
                        debug!("{} v{} on {}", rep.device_mac, rep.version, rep.adapter);
                        found.push(rep);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("capture on {} stopped: {e:#}", self.adapter.display_name);
                    break;
                }
            }
        }
        found
    }
}

/// Filters a captured frame down to a new report addressed to `own_mac`.
fn accept_report(
    frame: &[u8],
    own_mac: MacAddr,
    seen: &mut HashSet<MacAddr>,
    adapter: &Adapter,
) -> Option<ScanReport> {
    let eth = ethernet::get_packet_from_u8(frame).ok()?;
    if !ethernet::is_hg_frame(&eth) || eth.get_destination() != own_mac {
        return None;
    }

    let src = eth.get_source();
    if src == own_mac || seen.contains(&src) {
        return None;
    }

    let Some(rep) = report::decode(&eth, &adapter.display_name) else {
        trace!("dropping short report from {src}");
        return None;
    };
    seen.insert(src);
    Some(ScanReport {
        interface: adapter.name.clone(),
        ..rep
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
