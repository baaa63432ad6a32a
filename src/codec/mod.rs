//! Boundary adapters between evidence networks and the outside world.
//!
//! - [`json`]: the flat JSON exchange schema ([`NetworkData`])
//! - [`extract`]: narrative to [`NetworkData`] through an external text generator

pub mod extract;
pub mod json;

pub use extract::{extract_network, CommandGenerator, TextGenerator};
pub use json::{Connection, EvidenceItem, HypothesisItem, NetworkData};
