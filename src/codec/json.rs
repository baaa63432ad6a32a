//! The flat JSON exchange format.
//!
//! ```json
//! {
//!   "evidence":   [ {"id": "E1", "text": "..."} ],
//!   "hypotheses": [ {"id": "H1", "text": "...", "likelihood": "Likely or Probable"} ],
//!   "connections": [ {"source": "E1", "target": "H1"} ],
//!   "priors": { "H1": "Realistic Possibility" },
//!   "truth_probs": { "E1": "Likely or Probable" },
//!   "edge_strengths": { "E1->H1": 2.0 }
//! }
//! ```
//!
//! The three node/edge arrays are required on import and always written on export. The parameter
//! maps are optional on import. Unknown keys are ignored.

use crate::{
    error::EvidenceNetError,
    network::{EvidenceGraph, ParameterStore},
    properties::{EdgeKey, Group, Label, NodeId},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{read_to_string, write},
    path::Path,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: NodeId,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisItem {
    pub id: NodeId,
    #[serde(default)]
    pub text: String,
    #[serde(default, with = "likelihood_field")]
    pub likelihood: Option<Label>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}

impl From<&EdgeKey> for Connection {
    fn from(edge: &EdgeKey) -> Self {
        Connection {
            source: edge.source.clone(),
            target: edge.target.clone(),
        }
    }
}

impl From<&Connection> for EdgeKey {
    fn from(conn: &Connection) -> Self {
        EdgeKey::new(conn.source.clone(), conn.target.clone())
    }
}

/// An absent likelihood is written as the empty string, and both `""` and a missing field read
/// back as `None`.
pub(crate) mod likelihood_field {
    use crate::properties::Label;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &Option<Label>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(value.map(|l| l.phrase()).unwrap_or_default())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Label>, D::Error> {
        let raw = Option::<String>::deserialize(de)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse::<Label>()
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// Serialized form of an evidence network and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub evidence: Vec<EvidenceItem>,
    pub hypotheses: Vec<HypothesisItem>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub priors: BTreeMap<NodeId, Label>,
    #[serde(default)]
    pub truth_probs: BTreeMap<NodeId, Label>,
    #[serde(default)]
    pub edge_strengths: BTreeMap<EdgeKey, f64>,
}

impl NetworkData {
    pub fn from_json_str(raw: &str) -> Result<Self, EvidenceNetError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EvidenceNetError> {
        tracing::debug!("Reading network data from {:?}", path.as_ref());
        NetworkData::from_json_str(&read_to_string(path)?)
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json_string_pretty(&self) -> Result<String, EvidenceNetError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EvidenceNetError::Serialization(format!("JSON serialization error: {e}")))
    }

    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> Result<(), EvidenceNetError> {
        tracing::debug!("Writing network data to {:?}", path.as_ref());
        Ok(write(path, self.to_json_string_pretty()?)?)
    }

    pub fn build_graph(&self) -> Result<EvidenceGraph, EvidenceNetError> {
        EvidenceGraph::build(&self.evidence, &self.hypotheses, &self.connections)
    }

    /// Validate the data and split it into a graph and a reconciled parameter store. Parameters
    /// that name absent or wrongly-grouped nodes, or absent edges, are dropped.
    pub fn into_parts(self) -> Result<(EvidenceGraph, ParameterStore), EvidenceNetError> {
        let graph = self.build_graph()?;
        let mut store = ParameterStore::new(self.priors, self.truth_probs, BTreeMap::new());
        for (edge, strength) in self.edge_strengths {
            store.set_edge_strength(edge, strength)?;
        }
        store.reconcile(&graph);
        Ok((graph, store))
    }

    /// Export a graph and its parameters. Connections are listed in edge order, nodes in
    /// declaration order.
    pub fn from_parts(graph: &EvidenceGraph, store: &ParameterStore) -> Self {
        let mut out = NetworkData::from_graph(graph);
        out.priors = store.priors().clone();
        out.truth_probs = store.truth_probs().clone();
        out.edge_strengths = store.edge_strengths().clone();
        out
    }

    /// The node and edge lists of `graph`, without parameters.
    pub fn from_graph(graph: &EvidenceGraph) -> Self {
        let mut out = NetworkData::default();
        for node in graph.nodes() {
            match node.group {
                Group::Evidence => out.evidence.push(EvidenceItem {
                    id: node.id.clone(),
                    text: node.text.clone(),
                }),
                Group::Hypothesis => out.hypotheses.push(HypothesisItem {
                    id: node.id.clone(),
                    text: node.text.clone(),
                    likelihood: node.likelihood,
                }),
            }
        }
        out.connections = graph.edges().map(|e| Connection::from(&e)).collect();
        out
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.evidence
            .iter()
            .map(|e| &e.id)
            .chain(self.hypotheses.iter().map(|h| &h.id))
    }
}
