//! omfsig-core
//!
//! Core library for building operand-blind routine fingerprints from OMF
//! library listings and for relocating those routines in another disassembly.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends; the CLI only parses arguments and writes output.

pub mod config;
pub mod fingerprint;
pub mod listing;
pub mod matcher;
pub mod model;
pub mod services;
pub mod store;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
