//! Wire codecs for the two link-layer protocols carried on the private
//! `0x4847` ethertype.
//!
//! * Discovery: a broadcast [`probe`] answered by device [`report`]s.
//! * OTA: stop-and-wait data [`chunk`]s answered by [`ack`]s.
//!
//! Nothing in here touches a socket; every function works on byte slices.

pub mod ack;
pub mod checksum;
pub mod chunk;
pub mod ethernet;
pub mod probe;
pub mod report;

pub use ethernet::{ETH_HDR_LEN, HG_ETHERTYPE};
