use hgota_common::cancel::CancelToken;
use hgota_common::config::{AckPolicy, FlashConfig};
use hgota_common::error::OtaError;
use hgota_core::network::mock::{self, MockLink, MockOpener};
use hgota_core::ota::{NullProgress, OtaTransfer, TransferSummary};
use hgota_protocols::{ack, chunk, ethernet};
use pnet::packet::Packet;

use crate::utils::{DEVICE, DEVICE_STR, HOST, adapter, firmware, flash_cfg, sent_chunks};

fn opener_with(link: &MockLink) -> MockOpener {
    let opener = MockOpener::new();
    opener.add("eth0", link.clone());
    opener
}

fn flash(link: &MockLink, cfg: FlashConfig, image: &[u8]) -> Result<TransferSummary, OtaError> {
    let opener = opener_with(link);
    OtaTransfer::new(&opener, cfg, CancelToken::new()).run(
        &adapter("eth0", 2, Some(HOST)),
        DEVICE_STR,
        image,
        &mut NullProgress,
    )
}

/// Replies to the first data frame with `first`, then acks normally.
fn first_reply_then_ack(first: Vec<u8>) -> mock::Responder {
    let mut acker = mock::ack_responder(DEVICE);
    let mut first = Some(first);
    Box::new(move |frame: &[u8]| -> Vec<Vec<u8>> {
        match first.take() {
            Some(payload) => ethernet::create_frame(DEVICE, HOST, &payload).into_iter().collect(),
            None => acker(frame),
        }
    })
}

#[test]
fn three_chunks_for_3000_bytes() {
    let link = MockLink::with_responder(mock::ack_responder(DEVICE));

    let summary = flash(&link, flash_cfg(10), &firmware(3000)).unwrap();

    let chunks = sent_chunks(&link);
    let offsets: Vec<u32> = chunks.iter().map(|c| c.offset).collect();
    let lens: Vec<u16> = chunks.iter().map(|c| c.chunk_len).collect();
    assert_eq!(offsets, vec![0, 1400, 2800]);
    assert_eq!(lens, vec![1400, 1400, 200]);
    assert!(chunks.iter().all(|c| c.total == 3000 && c.image_id == chunk::IMAGE_ID));
    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.frames_sent, 3);
    assert_eq!(summary.total, 3000);
}

#[test]
fn short_ack_counts_as_timeout_and_triggers_resend() {
    let mut short = ack::encode(&chunk::encode(&firmware(3000), 0, 1400).unwrap().descriptor);
    short.truncate(20);
    let link = MockLink::with_responder(first_reply_then_ack(short));

    let summary = flash(&link, flash_cfg(10), &firmware(3000)).unwrap();

    let offsets: Vec<u32> = sent_chunks(&link).iter().map(|c| c.offset).collect();
    assert_eq!(offsets, vec![0, 0, 1400, 2800]);
    assert_eq!(summary.frames_sent, 4);
    assert_eq!(summary.chunks, 3);
}

#[test]
fn malformed_device_address_sends_nothing() {
    let link = MockLink::with_responder(mock::ack_responder(DEVICE));
    let opener = opener_with(&link);

    let err = OtaTransfer::new(&opener, flash_cfg(10), CancelToken::new())
        .run(&adapter("eth0", 2, Some(HOST)), "AA:BB:CC", &firmware(3000), &mut NullProgress)
        .unwrap_err();

    assert!(matches!(err, OtaError::Format(_)), "got {err:?}");
    assert!(link.sent().is_empty());
}

#[test]
fn silent_device_exhausts_retries_on_first_chunk() {
    let link = MockLink::new();

    let err = flash(&link, flash_cfg(3), &firmware(3000)).unwrap_err();

    assert!(
        matches!(err, OtaError::TransferFailed { offset: 0, attempts: 3 }),
        "got {err:?}"
    );
    assert_eq!(err.failed_offset(), Some(0));
    let offsets: Vec<u32> = sent_chunks(&link).iter().map(|c| c.offset).collect();
    assert_eq!(offsets, vec![0, 0, 0]);
}

#[test]
fn duplicate_ack_does_not_confirm_the_next_chunk() {
    let mut acker = mock::ack_responder(DEVICE);
    let mut answered = false;
    let link = MockLink::with_responder(Box::new(move |frame: &[u8]| -> Vec<Vec<u8>> {
        if answered {
            return Vec::new();
        }
        answered = true;
        let mut acks = acker(frame);
        acks.extend(acks.clone());
        acks
    }));

    let err = flash(&link, flash_cfg(3), &firmware(2800)).unwrap_err();

    assert!(
        matches!(err, OtaError::TransferFailed { offset: 1400, attempts: 3 }),
        "got {err:?}"
    );
    let offsets: Vec<u32> = sent_chunks(&link).iter().map(|c| c.offset).collect();
    assert_eq!(offsets, vec![0, 1400, 1400, 1400]);
}

#[test]
fn overlapping_step_resends_the_tail_of_each_chunk() {
    let link = MockLink::with_responder(mock::ack_responder(DEVICE));
    let cfg = FlashConfig {
        step: Some(1000),
        ..flash_cfg(10)
    };

    flash(&link, cfg, &firmware(3000)).unwrap();

    let chunks = sent_chunks(&link);
    let offsets: Vec<u32> = chunks.iter().map(|c| c.offset).collect();
    let lens: Vec<u16> = chunks.iter().map(|c| c.chunk_len).collect();
    assert_eq!(offsets, vec![0, 1000, 2000]);
    assert_eq!(lens, vec![1400, 1400, 1000]);
}

#[test]
fn device_reassembles_the_image() {
    let image = firmware(2801);
    let link = MockLink::with_responder(mock::ack_responder(DEVICE));

    flash(&link, flash_cfg(10), &image).unwrap();

    let mut rebuilt: Vec<u8> = Vec::new();
    for frame in link.sent() {
        let eth = ethernet::get_packet_from_u8(&frame).unwrap();
        assert_eq!(eth.get_source(), HOST);
        assert_eq!(eth.get_destination(), DEVICE);
        let (descriptor, bytes) = chunk::decode(eth.payload()).unwrap();
        assert_eq!(descriptor.offset as usize, rebuilt.len());
        rebuilt.extend(bytes);
    }
    assert_eq!(rebuilt, image);
}

#[test]
fn single_byte_final_chunk_packs_into_first_word() {
    let image = firmware(1401);
    let link = MockLink::with_responder(mock::ack_responder(DEVICE));

    flash(&link, flash_cfg(10), &image).unwrap();

    let last = link.sent().last().cloned().unwrap();
    let eth = ethernet::get_packet_from_u8(&last).unwrap();
    let (descriptor, _) = chunk::decode(eth.payload()).unwrap();
    assert_eq!(descriptor.chunk_len, 1);
    assert_eq!(descriptor.first_word, u16::from(image[1400]) << 8);
    assert_eq!(eth.payload().len(), chunk::CHUNK_HEADER_LEN + chunk::PAD_LEN);
}

#[test]
fn strict_policy_rejects_ack_with_wrong_checksum() {
    let image = firmware(1000);
    let mut descriptor = chunk::encode(&image, 0, 1000).unwrap().descriptor;
    descriptor.checksum ^= 0xffff;
    let bad_ack = ack::encode(&descriptor);

    let strict = FlashConfig {
        ack_policy: AckPolicy::Strict,
        ..flash_cfg(2)
    };
    let link = MockLink::with_responder(Box::new(move |_frame: &[u8]| -> Vec<Vec<u8>> {
        ethernet::create_frame(DEVICE, HOST, &bad_ack).into_iter().collect()
    }));
    let err = flash(&link, strict, &image).unwrap_err();
    assert!(matches!(err, OtaError::TransferFailed { offset: 0, attempts: 2 }), "got {err:?}");

    let bad_ack = ack::encode(&descriptor);
    let link = MockLink::with_responder(Box::new(move |_frame: &[u8]| -> Vec<Vec<u8>> {
        ethernet::create_frame(DEVICE, HOST, &bad_ack).into_iter().collect()
    }));
    let summary = flash(&link, flash_cfg(2), &image).unwrap();
    assert_eq!(summary.chunks, 1);
}

#[test]
fn progress_is_reported_after_every_chunk() {
    let link = MockLink::with_responder(mock::ack_responder(DEVICE));
    let opener = opener_with(&link);
    let mut seen: Vec<(usize, usize)> = Vec::new();
    let mut observer = |done: usize, total: usize, _bytes_per_sec: f64| seen.push((done, total));

    OtaTransfer::new(&opener, flash_cfg(10), CancelToken::new())
        .run(&adapter("eth0", 2, Some(HOST)), DEVICE_STR, &firmware(3000), &mut observer)
        .unwrap();

    assert_eq!(seen, vec![(1400, 3000), (2800, 3000), (3000, 3000)]);
}

#[test]
fn cancel_mid_transfer_stops_at_next_chunk() {
    let cancel = CancelToken::new();
    let trip = cancel.clone();
    let mut acker = mock::ack_responder(DEVICE);
    let link = MockLink::with_responder(Box::new(move |frame: &[u8]| -> Vec<Vec<u8>> {
        trip.cancel();
        acker(frame)
    }));
    let opener = opener_with(&link);

    let err = OtaTransfer::new(&opener, flash_cfg(10), cancel)
        .run(&adapter("eth0", 2, Some(HOST)), DEVICE_STR, &firmware(3000), &mut NullProgress)
        .unwrap_err();

    assert!(matches!(err, OtaError::Cancelled { .. }), "got {err:?}");
    assert!(sent_chunks(&link).iter().all(|c| c.offset == 0));
}

#[test]
fn empty_image_completes_without_traffic() {
    let link = MockLink::new();

    let summary = flash(&link, flash_cfg(10), &[]).unwrap();

    assert_eq!(summary.chunks, 0);
    assert!(link.sent().is_empty());
}
