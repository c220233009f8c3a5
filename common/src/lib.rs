//! Shared building blocks for the `hgota` workspace.
//!
//! Holds everything the protocol engines and the command line agree on:
//! the adapter and report models, configuration, the error taxonomy and
//! the cooperative cancellation token.

pub mod cancel;
pub mod config;
pub mod error;
pub mod models;
pub mod network;

pub use error::OtaError;
