use anyhow::Context;
use pnet::packet::ethernet::{EtherType, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;

pub const ETH_HDR_LEN: usize = 14;

/// Private ethertype shared by discovery and OTA frames.
pub const HG_ETHERTYPE: EtherType = EtherType(0x4847);

pub fn make_header(
    buffer: &mut [u8],
    src_mac: MacAddr,
    dst_mac: MacAddr,
    et: EtherType,
) -> anyhow::Result<()> {
    let mut eth = MutableEthernetPacket::new(&mut buffer[..])
        .context("failed to create mutable Ethernet packet")?;

    eth.set_source(src_mac);
    eth.set_destination(dst_mac);
    eth.set_ethertype(et);

    Ok(())
}

/// Builds a complete frame on the private ethertype around `payload`.
pub fn create_frame(src_mac: MacAddr, dst_mac: MacAddr, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ETH_HDR_LEN + payload.len()];
    make_header(&mut buffer, src_mac, dst_mac, HG_ETHERTYPE)?;
    buffer[ETH_HDR_LEN..].copy_from_slice(payload);
    Ok(buffer)
}

pub fn get_packet_from_u8(bytes: &[u8]) -> anyhow::Result<EthernetPacket<'_>> {
    EthernetPacket::new(bytes).context("frame shorter than an Ethernet header")
}

pub fn is_hg_frame(eth: &EthernetPacket) -> bool {
    eth.get_ethertype() == HG_ETHERTYPE
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
    use pnet::packet::Packet;
    use pnet::packet::ethernet::EtherTypes;

    #[test]
    fn ethernet_header_sets_fields() {
        let mut b = vec![0u8; 64];
        let src = MacAddr::new(0x00, 0x11, 0x22, 0x33, 0x44, 0x55);
        let dst = MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff);

        make_header(&mut b, src, dst, EtherTypes::Ipv4).unwrap();

        let eth = EthernetPacket::new(&b[..ETH_HDR_LEN]).expect("parse eth");
        assert_eq!(eth.get_source(), src);
        assert_eq!(eth.get_destination(), dst);
        assert_eq!(eth.get_ethertype(), EtherTypes::Ipv4);
    }

    #[test]
    fn ethernet_header_errors_when_buffer_too_small() {
        let mut tiny: [u8; 0] = [];

        let err =
            make_header(&mut tiny, MacAddr::zero(), MacAddr::zero(), HG_ETHERTYPE).unwrap_err();

        assert!(
            err.to_string().contains("Ethernet"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn create_frame_carries_payload_on_private_ethertype() {
        let src = MacAddr::new(0x02, 0, 0, 0, 0, 1);
        let frame = create_frame(src, MacAddr::broadcast(), &[0x02, 0x00]).unwrap();

        assert_eq!(frame.len(), ETH_HDR_LEN + 2);
        assert_eq!(&frame[12..14], &[0x48, 0x47]);

        let eth = get_packet_from_u8(&frame).unwrap();
        assert!(is_hg_frame(&eth));
        assert_eq!(eth.get_destination(), MacAddr::broadcast());
        assert_eq!(eth.payload(), &[0x02, 0x00]);
    }

    #[test]
    fn get_packet_from_u8_rejects_runt() {
        assert!(get_packet_from_u8(&[0u8; 6]).is_err());
    }
}
