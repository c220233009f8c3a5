//! OTA data chunk codec.
//!
//! Every multi-byte field is big-endian except the checksum, which the
//! device firmware expects little-endian.
//!
//! | offset | field                              |
//! |--------|------------------------------------|
//! | 0      | marker `0x04`                      |
//! | 1..6   | fixed tag                          |
//! | 6..10  | offset                             |
//! | 10..14 | total                              |
//! | 14..16 | chunk length                       |
//! | 16..18 | checksum (LE)                      |
//! | 18..20 | image id                           |
//! | 20..22 | first two chunk bytes              |
//! | 22..   | remaining chunk bytes, 2 zero pad  |

use anyhow::{Context, ensure};

use crate::checksum;

pub const DATA_MARKER: u8 = 0x04;
pub const FIXED_TAG: [u8; 5] = [0x00, 0x01, 0x02, 0x05, 0x03];
pub const IMAGE_ID: u16 = 0x4002;
pub const CHUNK_HEADER_LEN: usize = 22;
pub const PAD_LEN: usize = 2;

/// Header fields shared by data chunks and their acks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub offset: u32,
    pub total: u32,
    pub chunk_len: u16,
    pub checksum: u16,
    pub image_id: u16,
    pub first_word: u16,
}

impl ChunkDescriptor {
    pub(crate) fn write(&self, marker: u8, out: &mut [u8; CHUNK_HEADER_LEN]) {
        out[0] = marker;
        out[1..6].copy_from_slice(&FIXED_TAG);
        out[6..10].copy_from_slice(&self.offset.to_be_bytes());
        out[10..14].copy_from_slice(&self.total.to_be_bytes());
        out[14..16].copy_from_slice(&self.chunk_len.to_be_bytes());
        out[16..18].copy_from_slice(&self.checksum.to_le_bytes());
        out[18..20].copy_from_slice(&self.image_id.to_be_bytes());
        out[20..22].copy_from_slice(&self.first_word.to_be_bytes());
    }

    /// Caller guarantees `b.len() >= CHUNK_HEADER_LEN`.
    pub(crate) fn read(b: &[u8]) -> Self {
        Self {
            offset: u32::from_be_bytes([b[6], b[7], b[8], b[9]]),
            total: u32::from_be_bytes([b[10], b[11], b[12], b[13]]),
            chunk_len: u16::from_be_bytes([b[14], b[15]]),
            checksum: u16::from_le_bytes([b[16], b[17]]),
            image_id: u16::from_be_bytes([b[18], b[19]]),
            first_word: u16::from_be_bytes([b[20], b[21]]),
        }
    }
}

/// An encoded chunk ready to be framed, plus the fields an ack should echo.
#[derive(Debug, Clone)]
pub struct DataChunk {
    pub descriptor: ChunkDescriptor,
    pub payload: Vec<u8>,
}

/// Encodes `firmware[offset..offset + chunk_len]`.
pub fn encode(firmware: &[u8], offset: usize, chunk_len: usize) -> anyhow::Result<DataChunk> {
    ensure!(chunk_len > 0, "chunk_len must be > 0");
    let total = u32::try_from(firmware.len()).context("firmware larger than the u32 total field")?;
    let end = offset
        .checked_add(chunk_len)
        .filter(|end| *end <= firmware.len())
        .context("chunk slicing error")?;
    let chunk = &firmware[offset..end];

    let descriptor = ChunkDescriptor {
        offset: u32::try_from(offset).context("offset out of range")?,
        total,
        chunk_len: u16::try_from(chunk_len).context("chunk larger than the u16 length field")?,
        checksum: checksum::inet_checksum(chunk),
        image_id: IMAGE_ID,
        first_word: u16::from_be_bytes([chunk[0], chunk.get(1).copied().unwrap_or(0)]),
    };

    let mut header = [0u8; CHUNK_HEADER_LEN];
    descriptor.write(DATA_MARKER, &mut header);

    let rest: &[u8] = chunk.get(2..).unwrap_or(&[]);
    let mut payload: Vec<u8> = Vec::with_capacity(CHUNK_HEADER_LEN + rest.len() + PAD_LEN);
    payload.extend_from_slice(&header);
    payload.extend_from_slice(rest);
    payload.extend_from_slice(&[0u8; PAD_LEN]);

    Ok(DataChunk {
        descriptor,
        payload,
    })
}

/// Device-side view of a data chunk: the header and the reassembled bytes.
pub fn decode(payload: &[u8]) -> Option<(ChunkDescriptor, Vec<u8>)> {
    if payload.len() < CHUNK_HEADER_LEN || payload[0] != DATA_MARKER {
        return None;
    }

    let descriptor = ChunkDescriptor::read(payload);
    let len = usize::from(descriptor.chunk_len);
    let rest_len = len.saturating_sub(2);
    let rest = payload.get(CHUNK_HEADER_LEN..CHUNK_HEADER_LEN + rest_len)?;

    let mut data = descriptor.first_word.to_be_bytes()[..len.min(2)].to_vec();
    data.extend_from_slice(rest);
    Some((descriptor, data))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
