//! OTA acknowledgment codec.
//!
//! An ack reuses the 22-byte chunk header with marker `0x05`. The tag bytes
//! are not checked.

use crate::chunk::{CHUNK_HEADER_LEN, ChunkDescriptor};

pub const ACK_MARKER: u8 = 0x05;
pub const ACK_LEN: usize = CHUNK_HEADER_LEN;

pub fn decode(payload: &[u8]) -> Option<ChunkDescriptor> {
    if payload.len() < ACK_LEN || payload[0] != ACK_MARKER {
        return None;
    }
    Some(ChunkDescriptor::read(payload))
}

/// Ack echoing `descriptor`, as the device sends it.
pub fn encode(descriptor: &ChunkDescriptor) -> Vec<u8> {
    let mut out = [0u8; ACK_LEN];
    descriptor.write(ACK_MARKER, &mut out);
    out.to_vec()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
