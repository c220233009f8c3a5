//! Protocol engines.
//!
//! * [`scanner`]: probes every adapter in parallel and collects device reports.
//! * [`ota`]: pushes a firmware image to one device, one acknowledged chunk at a time.
//!
//! Both talk to the wire through the [`network::channel`] abstraction so they
//! can run against raw adapters or the in-memory [`network::mock`] links.

pub mod network;
pub mod ota;
pub mod scanner;
