use std::time::{Duration, Instant};

use hgota_common::cancel::CancelToken;
use hgota_common::config::{AckPolicy, FlashConfig};
use hgota_common::error::OtaError;
use hgota_protocols::chunk::{self, ChunkDescriptor};
use hgota_protocols::{ack, ethernet};
use pnet::packet::Packet;
use pnet::util::MacAddr;
use tracing::{debug, error, info, trace, warn};

use super::TransferSummary;
use super::progress::ProgressObserver;
use crate::network::channel::LinkHandle;

/// Upper bound on clearing the receive queue before a send.
const STALE_DRAIN_BUDGET: Duration = Duration::from_millis(50);

/// One flash operation. Consumed by [`TransferSession::run`]; nothing of it
/// survives the terminal outcome.
pub(super) struct TransferSession<'a> {
    pub(super) adapter: &'a str,
    pub(super) device_mac: MacAddr,
    pub(super) host_mac: MacAddr,
    pub(super) firmware: &'a [u8],
    pub(super) cfg: &'a FlashConfig,
    pub(super) cancel: &'a CancelToken,
    pub(super) link: LinkHandle,
}

impl TransferSession<'_> {
    pub(super) fn run(mut self, progress: &mut dyn ProgressObserver) -> Result<TransferSummary, OtaError> {
        let total = self.firmware.len();
        let step = self.cfg.step();
        let started = Instant::now();
        let mut offset: usize = 0;
        let mut chunks: usize = 0;
        let mut frames_sent: usize = 0;

        info!(
            "flashing {total} bytes to {} via {} (chunk {}, step {step})",
            self.device_mac, self.adapter, self.cfg.chunk_size
        );

        while offset < total {
            if self.cancel.is_cancelled() {
                warn!("transfer cancelled at offset={offset}");
                return Err(OtaError::Cancelled { offset });
            }

            let chunk_len = self.cfg.chunk_size.min(total - offset);
            let data = chunk::encode(self.firmware, offset, chunk_len)
                .map_err(|e| OtaError::format(format!("{e:#}")))?;
            let frame = ethernet::create_frame(self.host_mac, self.device_mac, &data.payload)
                .map_err(|e| OtaError::link(self.adapter, e))?;

            frames_sent += self.send_until_acked(&frame, &data.descriptor, offset)?;
            chunks += 1;
            offset += step;

            let done = offset.min(total);
            let elapsed = started.elapsed().as_secs_f64();
            let speed = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
            progress.on_progress(done, total, speed);
        }

        let elapsed = started.elapsed();
        info!("transfer complete: {total} bytes in {:.2}s", elapsed.as_secs_f64());

        Ok(TransferSummary {
            total,
            chunks,
            frames_sent,
            elapsed,
        })
    }

    /// Sends `frame` until it is acknowledged. Returns the number of sends.
    fn send_until_acked(
        &mut self,
        frame: &[u8],
        expected: &ChunkDescriptor,
        offset: usize,
    ) -> Result<usize, OtaError> {
        let retries = self.cfg.retries;

        for attempt in 1..=retries {
            self.drain_stale(offset)?;
            self.link
                .tx
                .send_frame(frame)
                .map_err(|e| OtaError::link(self.adapter, e))?;

            if self.wait_for_ack(expected, offset)? {
                debug!("offset={offset} acked after {attempt} attempt(s)");
                return Ok(attempt as usize);
            }
            if attempt < retries {
                warn!("no ack for offset={offset}, resending ({attempt}/{retries})");
            }
        }

        error!("no valid ack for offset={offset} after {retries} retries");
        Err(OtaError::TransferFailed {
            offset,
            attempts: retries,
        })
    }

    /// Drops frames that were queued before this send, so a late or
    /// duplicate ack for an earlier chunk cannot confirm the next one.
    fn drain_stale(&mut self, offset: usize) -> Result<(), OtaError> {
        let deadline = Instant::now() + STALE_DRAIN_BUDGET.min(self.cfg.timeout()?);
        let mut dropped: usize = 0;

        while Instant::now() < deadline {
            if self.cancel.is_cancelled() {
                return Err(OtaError::Cancelled { offset });
            }
            match self.link.rx.next_frame() {
                Ok(Some(_)) => dropped += 1,
                Ok(None) => break,
                Err(e) => return Err(OtaError::link(self.adapter, e)),
            }
        }

        if dropped > 0 {
            trace!("dropped {dropped} stale frame(s) before offset={offset}");
        }
        Ok(())
    }

    fn wait_for_ack(&mut self, expected: &ChunkDescriptor, offset: usize) -> Result<bool, OtaError> {
        let deadline = Instant::now()
            .checked_add(self.cfg.timeout()?)
            .ok_or_else(|| OtaError::format("ack timeout overflows the clock"))?;

        while Instant::now() < deadline {
            if self.cancel.is_cancelled() {
                return Err(OtaError::Cancelled { offset });
            }
            match self.link.rx.next_frame() {
                Ok(Some(frame)) => {
                    if is_valid_ack(&frame, self.device_mac, self.host_mac, expected, self.cfg.ack_policy) {
                        return Ok(true);
                    }
                }
                Ok(None) => {}
                Err(e) => return Err(OtaError::link(self.adapter, e)),
            }
        }
        Ok(false)
    }
}

/// An ack must come from the device, be addressed to us, and decode. Under
/// [`AckPolicy::Strict`] it must also echo the sent chunk header exactly.
fn is_valid_ack(
    frame: &[u8],
    device_mac: MacAddr,
    host_mac: MacAddr,
    expected: &ChunkDescriptor,
    policy: AckPolicy,
) -> bool {
    let Ok(eth) = ethernet::get_packet_from_u8(frame) else {
        return false;
    };
    if !ethernet::is_hg_frame(&eth)
        || eth.get_source() != device_mac
        || eth.get_destination() != host_mac
    {
        return false;
    }

    let Some(acked) = ack::decode(eth.payload()) else {
        trace!("dropping malformed ack from {device_mac}");
        return false;
    };

    match policy {
        AckPolicy::Lenient => true,
        AckPolicy::Strict => {
            let matches = acked == *expected;
            if !matches {
                debug!("ack mismatch: expected {expected:?}, got {acked:?}");
            }
            matches
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use hgota_protocols::ack::ACK_LEN;

    const HOST: MacAddr = MacAddr(0x3c, 0, 0, 0, 0, 1);
    const DEVICE: MacAddr = MacAddr(0x02, 0x48, 0x47, 0, 0, 2);

    fn expected() -> ChunkDescriptor {
        chunk::encode(&[1, 2, 3, 4, 5, 6, 7, 8], 0, 8).unwrap().descriptor
    }

    fn ack_frame(src: MacAddr, dst: MacAddr, payload: &[u8]) -> Vec<u8> {
        ethernet::create_frame(src, dst, payload).unwrap()
    }

    #[test]
    fn lenient_accepts_any_well_formed_ack() {
        let stale = ChunkDescriptor { offset: 9999, ..expected() };
        let frame = ack_frame(DEVICE, HOST, &ack::encode(&stale));
        assert!(is_valid_ack(&frame, DEVICE, HOST, &expected(), AckPolicy::Lenient));
    }

    #[test]
    fn strict_requires_matching_fields() {
        let stale = ChunkDescriptor { checksum: 0, ..expected() };
        let stale_frame = ack_frame(DEVICE, HOST, &ack::encode(&stale));
        assert!(!is_valid_ack(&stale_frame, DEVICE, HOST, &expected(), AckPolicy::Strict));

        let good_frame = ack_frame(DEVICE, HOST, &ack::encode(&expected()));
        assert!(is_valid_ack(&good_frame, DEVICE, HOST, &expected(), AckPolicy::Strict));
    }

    #[test]
    fn short_ack_is_rejected() {
        let payload = ack::encode(&expected());
        let frame = ack_frame(DEVICE, HOST, &payload[..20]);
        assert!(payload.len() == ACK_LEN);
        assert!(!is_valid_ack(&frame, DEVICE, HOST, &expected(), AckPolicy::Lenient));
    }

    #[test]
    fn ack_from_wrong_peer_is_rejected() {
        let payload = ack::encode(&expected());
        let stranger = MacAddr(0x02, 0, 0, 0, 0, 0x77);
        let from_stranger = ack_frame(stranger, HOST, &payload);
        let to_someone_else = ack_frame(DEVICE, stranger, &payload);
        assert!(!is_valid_ack(&from_stranger, DEVICE, HOST, &expected(), AckPolicy::Lenient));
        assert!(!is_valid_ack(&to_someone_else, DEVICE, HOST, &expected(), AckPolicy::Lenient));
    }

    #[test]
    fn echoed_data_chunk_is_not_an_ack() {
        let data = chunk::encode(&[1, 2, 3, 4, 5, 6, 7, 8], 0, 8).unwrap();
        let frame = ack_frame(DEVICE, HOST, &data.payload);
        assert!(!is_valid_ack(&frame, DEVICE, HOST, &expected(), AckPolicy::Lenient));
    }
}
