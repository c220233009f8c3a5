//! # Domain Models
//!
//! Values produced by the discovery scanner and consumed by the front end.
//!
//! ## Core Entities
//! * [`report::ScanReport`]: one device answer to a discovery probe.
//!
//! The network adapter model lives next to its enumerator in
//! [`crate::network::interface`].

pub mod report;
