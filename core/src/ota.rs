//! # OTA Transfer Engine
//!
//! Stop-and-wait firmware push: one chunk in flight, each chunk resent until
//! the device acknowledges it or the retry budget runs out. A failed chunk
//! aborts the whole session; the next session starts again at offset 0.
//!
//! All input checks run before the raw channel is opened, so a bad device
//! address or configuration never puts a frame on the wire.

use std::time::Duration;

use hgota_common::cancel::CancelToken;
use hgota_common::config::FlashConfig;
use hgota_common::error::OtaError;
use hgota_common::network::interface::Adapter;
use hgota_common::network::mac;

use crate::network::channel::LinkOpener;

pub mod progress;
mod session;

pub use progress::{NullProgress, ProgressObserver, TracingProgress};

use session::TransferSession;

/// What a completed session did.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSummary {
    pub total: usize,
    /// Acknowledged chunks.
    pub chunks: usize,
    /// Frames put on the wire, resends included.
    pub frames_sent: usize,
    pub elapsed: Duration,
}

pub struct OtaTransfer<'a> {
    opener: &'a dyn LinkOpener,
    cfg: FlashConfig,
    cancel: CancelToken,
}

impl<'a> OtaTransfer<'a> {
    pub fn new(opener: &'a dyn LinkOpener, cfg: FlashConfig, cancel: CancelToken) -> Self {
        Self { opener, cfg, cancel }
    }

    /// Pushes `firmware` to the device at `device_address` through `adapter`.
    ///
    /// # Errors
    /// * [`OtaError::Format`] for a malformed address or configuration.
    /// * [`OtaError::AdapterUnusable`] when the adapter has no hardware address.
    /// * [`OtaError::Link`] when the channel cannot be opened or a send fails.
    /// * [`OtaError::TransferFailed`] when a chunk exhausts its retries.
    /// * [`OtaError::Cancelled`] when the cancel token trips mid-session.
    pub fn run(
        &self,
        adapter: &Adapter,
        device_address: &str,
        firmware: &[u8],
        progress: &mut dyn ProgressObserver,
    ) -> Result<TransferSummary, OtaError> {
        self.cfg.validate()?;
        let device_mac = mac::parse_mac(device_address)?;
        if u32::try_from(firmware.len()).is_err() {
            return Err(OtaError::format("firmware larger than 4 GiB"));
        }
        let host_mac = adapter.hardware_addr()?;

        let link = self
            .opener
            .open(adapter)
            .map_err(|e| OtaError::link(&adapter.display_name, e))?;

        let session = TransferSession {
            adapter: &adapter.display_name,
            device_mac,
            host_mac,
            firmware,
            cfg: &self.cfg,
            cancel: &self.cancel,
            link,
        };
        session.run(progress)
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
