//! Log-odds combination of a hypothesis prior with its evidence parents.
//!
//! ```text
//! p0 = clamp(decimal(prior), 0.0001, 0.9999)
//! z  = ln(p0 / (1 - p0)) + Σ ln(r_i) * t_i      over evidence parents with r_i > 0
//! P  = 1 / (1 + e^-z)
//! ```
//!
//! Only direct *evidence* parents contribute. Hypothesis parents are left out so that chains of
//! hypotheses never recurse; their influence is only visible through the truth tables, which do
//! include hypothesis parents.

use crate::{
    network::{EvidenceGraph, ParameterStore},
    properties::{EdgeKey, Label},
};

pub const PROBABILITY_FLOOR: f64 = 0.0001;
pub const PROBABILITY_CEILING: f64 = 0.9999;

/// Decimal used for the baseline when a truth table's hypothesis has no prior.
pub const DEFAULT_PRIOR_DECIMAL: f64 = 0.5;

pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING)
}

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// β0 for a prior decimal, clamped so it stays finite.
pub fn baseline_log_odds(prior: f64) -> f64 {
    logit(clamp_probability(prior))
}

/// Calculated probability of hypothesis `id`, or `None` when `id` is not a hypothesis or has no
/// prior.
pub fn calc_prior(id: &str, graph: &EvidenceGraph, store: &ParameterStore) -> Option<f64> {
    let node = graph.node(id).filter(|n| n.is_hypothesis())?;
    let prior = store.prior(id)?;
    let mut z = baseline_log_odds(prior.decimal());
    for parent in graph.predecessors(id).into_iter().filter(|p| p.is_evidence()) {
        let edge = EdgeKey::new(parent.id.clone(), node.id.clone());
        let r = match store.edge_strength(&edge) {
            Some(r) if r > 0.0 => r,
            _ => continue,
        };
        let t = store
            .truth_prob(&parent.id)
            .map(|l: Label| l.decimal())
            .unwrap_or(0.0);
        z += r.ln() * t;
    }
    Some(sigmoid(z))
}
