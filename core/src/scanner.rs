//! # Discovery Scanner
//!
//! Probes every usable adapter at the same time and merges the device
//! reports. Each adapter runs on its own worker with a private result list;
//! lists are merged only after every worker has been joined, so a failing or
//! silent adapter never affects the others.
//!
//! The per-adapter sender/listener pair lives in [`local`].

use std::thread::ScopedJoinHandle;

use hgota_common::cancel::CancelToken;
use hgota_common::config::ScanConfig;
use hgota_common::error::OtaError;
use hgota_common::models::report::ScanReport;
use hgota_common::network::interface::{self, Adapter, InterfaceEnumerator};
use tracing::{debug, error, info};

use crate::network::channel::LinkOpener;

mod local;

pub struct DiscoveryScanner<'a> {
    opener: &'a dyn LinkOpener,
    cfg: ScanConfig,
    cancel: CancelToken,
}

impl<'a> DiscoveryScanner<'a> {
    pub fn new(opener: &'a dyn LinkOpener, cfg: ScanConfig, cancel: CancelToken) -> Self {
        Self { opener, cfg, cancel }
    }

    /// Scans a single adapter for the configured listen window.
    ///
    /// Adapters without a hardware address yield an empty list; failing to
    /// open the raw channel is an error.
    pub fn scan_adapter(&self, adapter: &Adapter) -> Result<Vec<ScanReport>, OtaError> {
        let scan = local::AdapterScan::new(adapter, &self.cfg, &self.cancel);
        scan.run(self.opener)
    }

    /// Scans every non-loopback adapter in parallel.
    pub fn scan_all(&self, enumerator: &dyn InterfaceEnumerator) -> Vec<ScanReport> {
        let adapters: Vec<Adapter> = interface::usable_adapters(enumerator);
        info!("probing {} adapter(s)", adapters.len());

        let outcomes: Vec<(&Adapter, Result<Vec<ScanReport>, OtaError>)> =
            std::thread::scope(|s| {
                let handles: Vec<(&Adapter, ScopedJoinHandle<_>)> = adapters
                    .iter()
                    .map(|adapter| (adapter, s.spawn(move || self.scan_adapter(adapter))))
                    .collect();

                handles
                    .into_iter()
                    .filter_map(|(adapter, handle)| match handle.join() {
                        Ok(outcome) => Some((adapter, outcome)),
                        Err(_) => {
                            error!("scan worker for {} panicked", adapter.display_name);
                            None
                        }
                    })
                    .collect()
            });

        let mut reports: Vec<ScanReport> = Vec::new();
        for (adapter, outcome) in outcomes {
            match outcome {
                Ok(found) => {
                    debug!("{} answered on {}", found.len(), adapter.display_name);
                    reports.extend(found);
                }
                Err(e) => error!("scan failed on {}: {e}", adapter.display_name),
            }
        }
        reports
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
