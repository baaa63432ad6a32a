//! Per-node and per-edge parameters of an evidence network.
//!
//! The store is keyed by [NodeId]s and [EdgeKey]s and is only ever valid relative to an
//! [EvidenceGraph]. [ParameterStore::reconcile] restores that invariant after the graph changes.

use crate::{
    error::EvidenceNetError,
    properties::{EdgeKey, Group, Label, NodeId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::EvidenceGraph;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterStore {
    priors: BTreeMap<NodeId, Label>,
    truth_probs: BTreeMap<NodeId, Label>,
    edge_strengths: BTreeMap<EdgeKey, f64>,
}

/// Per-map entry counts: removed by [ParameterStore::reconcile], or filled in by
/// [crate::session::Session::seed_defaults].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub priors: usize,
    pub truth_probs: usize,
    pub edge_strengths: usize,
}

impl ReconcileStats {
    pub fn total(&self) -> usize {
        self.priors + self.truth_probs + self.edge_strengths
    }
}

impl ParameterStore {
    pub fn new(
        priors: BTreeMap<NodeId, Label>,
        truth_probs: BTreeMap<NodeId, Label>,
        edge_strengths: BTreeMap<EdgeKey, f64>,
    ) -> Self {
        ParameterStore {
            priors,
            truth_probs,
            edge_strengths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.priors.is_empty() && self.truth_probs.is_empty() && self.edge_strengths.is_empty()
    }

    pub fn priors(&self) -> &BTreeMap<NodeId, Label> {
        &self.priors
    }

    pub fn truth_probs(&self) -> &BTreeMap<NodeId, Label> {
        &self.truth_probs
    }

    pub fn edge_strengths(&self) -> &BTreeMap<EdgeKey, f64> {
        &self.edge_strengths
    }

    pub fn prior(&self, id: &str) -> Option<Label> {
        self.priors.get(id).copied()
    }

    pub fn prior_or(&self, id: &str, default: Label) -> Label {
        self.prior(id).unwrap_or(default)
    }

    pub fn truth_prob(&self, id: &str) -> Option<Label> {
        self.truth_probs.get(id).copied()
    }

    pub fn truth_prob_or(&self, id: &str, default: Label) -> Label {
        self.truth_prob(id).unwrap_or(default)
    }

    pub fn edge_strength(&self, edge: &EdgeKey) -> Option<f64> {
        self.edge_strengths.get(edge).copied()
    }

    pub fn edge_strength_or(&self, edge: &EdgeKey, default: f64) -> f64 {
        self.edge_strength(edge).unwrap_or(default)
    }

    pub fn set_prior(&mut self, id: NodeId, label: Label) -> Option<Label> {
        self.priors.insert(id, label)
    }

    pub fn set_truth_prob(&mut self, id: NodeId, label: Label) -> Option<Label> {
        self.truth_probs.insert(id, label)
    }

    /// Strengths at or below zero are stored as given; the engine treats them as "no effect".
    /// Non-finite strengths are rejected.
    pub fn set_edge_strength(
        &mut self,
        edge: EdgeKey,
        strength: f64,
    ) -> Result<Option<f64>, EvidenceNetError> {
        if !strength.is_finite() {
            return Err(EvidenceNetError::InvalidParameter(format!(
                "edge strength for {edge} must be a finite number, got {strength}"
            )));
        }
        Ok(self.edge_strengths.insert(edge, strength))
    }

    pub fn remove_prior(&mut self, id: &str) -> Option<Label> {
        self.priors.remove(id)
    }

    pub fn remove_truth_prob(&mut self, id: &str) -> Option<Label> {
        self.truth_probs.remove(id)
    }

    pub fn remove_edge_strength(&mut self, edge: &EdgeKey) -> Option<f64> {
        self.edge_strengths.remove(edge)
    }

    /// Drop every entry that no longer matches `graph`: priors whose key is not a hypothesis,
    /// truth probabilities whose key is not evidence, and strengths whose edge is absent.
    pub fn reconcile(&mut self, graph: &EvidenceGraph) -> ReconcileStats {
        let before = (
            self.priors.len(),
            self.truth_probs.len(),
            self.edge_strengths.len(),
        );
        self.priors
            .retain(|id, _| graph.group(id) == Some(Group::Hypothesis));
        self.truth_probs
            .retain(|id, _| graph.group(id) == Some(Group::Evidence));
        self.edge_strengths.retain(|edge, _| graph.contains_edge(edge));
        let stats = ReconcileStats {
            priors: before.0 - self.priors.len(),
            truth_probs: before.1 - self.truth_probs.len(),
            edge_strengths: before.2 - self.edge_strengths.len(),
        };
        if stats.total() > 0 {
            tracing::warn!(
                "[ParameterStore::reconcile] pruned {} priors, {} truth probabilities, {} edge strengths",
                stats.priors,
                stats.truth_probs,
                stats.edge_strengths
            );
        }
        stats
    }
}
