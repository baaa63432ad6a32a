//! Flat per-node and per-edge summaries of a session, one row per node or connection.

use crate::{
    engine::calc_prior,
    network::{EvidenceGraph, ParameterStore},
    properties::{Group, Label, NodeId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: NodeId,
    pub group: Group,
    pub description: String,
    pub likelihood: Option<Label>,
    /// Hypotheses only.
    pub prior: Option<Label>,
    pub prior_percent: Option<f64>,
    /// Evidence only.
    pub truth_prob: Option<Label>,
    pub truth_percent: Option<f64>,
    pub calc_prior: Option<f64>,
}

fn approx_label(percent: Option<f64>) -> String {
    percent.map(|p| format!("≈ {p}%")).unwrap_or_default()
}

impl NodeRow {
    /// `"≈ 45%"`, or empty when unset.
    pub fn prior_display(&self) -> String {
        approx_label(self.prior_percent)
    }

    pub fn truth_display(&self) -> String {
        approx_label(self.truth_percent)
    }

    /// `"≈ 56.2%"`, or empty when undefined.
    pub fn calc_prior_display(&self) -> String {
        self.calc_prior
            .map(|p| format!("≈ {:.1}%", p * 100.0))
            .unwrap_or_default()
    }
}

impl fmt::Display for NodeRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.group,
            self.description,
            self.likelihood.map(|l| l.phrase()).unwrap_or_default(),
            self.prior.map(|l| l.phrase()).unwrap_or_default(),
            self.prior_display(),
            self.truth_prob.map(|l| l.phrase()).unwrap_or_default(),
            self.truth_display(),
            self.calc_prior_display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: Option<f64>,
}

impl fmt::Display for EdgeRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.weight {
            Some(w) => write!(f, "{}\t{}\t{}", self.source, self.target, w),
            None => write!(f, "{}\t{}\t", self.source, self.target),
        }
    }
}

pub const NODE_HEADER: &str =
    "ID\tType\tDescription\tLikelihood(node)\tPrior(text)\tPrior(%)\tTruth-Prob(text)\tTruth-Prob(%)\tCalc Prior(%)";
pub const EDGE_HEADER: &str = "From\tTo\tWeight";

pub fn node_rows(graph: &EvidenceGraph, store: &ParameterStore) -> Vec<NodeRow> {
    graph
        .nodes()
        .map(|node| {
            let (prior, truth_prob) = match node.group {
                Group::Hypothesis => (store.prior(&node.id), None),
                Group::Evidence => (None, store.truth_prob(&node.id)),
            };
            NodeRow {
                id: node.id.clone(),
                group: node.group,
                description: node.text.clone(),
                likelihood: node.likelihood,
                prior,
                prior_percent: prior.map(|l| l.percent()),
                truth_prob,
                truth_percent: truth_prob.map(|l| l.percent()),
                calc_prior: calc_prior(&node.id, graph, store),
            }
        })
        .collect()
}

/// One row per connection, in connection order.
pub fn edge_rows(graph: &EvidenceGraph, store: &ParameterStore) -> Vec<EdgeRow> {
    graph
        .edges()
        .map(|edge| EdgeRow {
            weight: store.edge_strength(&edge),
            source: edge.source,
            target: edge.target,
        })
        .collect()
}
