//! # evidence-net
//!
//! A small library for structuring analytic judgements as a directed network of **evidence** and
//! **hypotheses**, attaching qualitative probability labels to them, and computing log-odds
//! estimates and per-component truth tables over the result.
//!
//! ## Overview
//!
//! An evidence network is a directed graph whose nodes are either evidence (observations) or
//! hypotheses (claims). A connection `source -> target` means the source bears on the target.
//! Probabilities are expressed on a fixed seven-phrase scale ([`properties::Label`]), from
//! "Remote Chance" (5%) to "Almost Certain" (97.5%).
//!
//! Parameters live beside the graph, not on it:
//!
//! - a **prior** label per hypothesis
//! - a **truth probability** label per evidence node
//! - a positive **edge strength** (likelihood ratio) per connection
//!
//! ## Architecture
//!
//! - **[`properties`]**: the label scale, node groups, node ids and edge keys
//! - **[`network`]**: the validated graph ([`network::EvidenceGraph`]) and the parameter maps
//!   ([`network::ParameterStore`]), kept consistent by `reconcile`
//! - **[`engine`]**: the log-odds prior estimate and the component truth-table generator
//! - **[`codec`]**: the flat JSON exchange format and narrative extraction through an external
//!   text generator
//! - **[`session`]**: caller-owned state with atomic edit operations; [`commands`] wraps them in
//!   a serializable command interface
//! - **[`report`]**: per-node and per-edge summary rows
//! - **[`config`]**: TOML configuration (defaults, table limits, extractor command)
//!
//! ## Quick Start
//!
//! ```rust
//! use evidence_net::{properties::{Group, Label}, session::Session};
//!
//! # fn main() -> Result<(), evidence_net::EvidenceNetError> {
//! let mut session = Session::default();
//! session.add_node("E1", Group::Evidence, "Fuel stockpiled near the border", None)?;
//! session.add_node("H1", Group::Hypothesis, "An offensive is planned", None)?;
//! session.add_edge("E1", "H1")?; // default strength 2.0
//! session.set_prior("H1", Label::RealisticPossibility)?;
//! session.set_truth_prob("E1", Label::LikelyOrProbable)?;
//!
//! let p = session.calc_prior("H1").unwrap_or_default();
//! assert!((p - 0.562).abs() < 1e-3);
//!
//! for component in session.truth_tables() {
//!     if let Ok(outcome) = &component.outcome {
//!         if let Some(table) = outcome.table() {
//!             println!("{table}");
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **default**: the library
//! - **bin**: the `evnet` command line tool (`clap`, `tracing-subscriber`)

pub mod codec;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod network;
pub mod properties;
pub mod report;
pub mod session;

pub use error::*;
