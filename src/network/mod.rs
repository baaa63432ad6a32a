//! Network module: the evidence graph and the parameters attached to it.
//!
//! # Module Organization
//!
//! - [`graph`]: [`EvidenceGraph`], the directed graph of evidence and hypothesis nodes
//! - [`params`]: [`ParameterStore`], priors, truth probabilities and edge strengths
//!
//! ```rust
//! use evidence_net::network::{EvidenceGraph, ParameterStore};
//! ```

mod graph;
mod params;

pub use graph::EvidenceGraph;
pub use params::{ParameterStore, ReconcileStats};
