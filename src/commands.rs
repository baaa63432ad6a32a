use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::{
    codec::json::NetworkData,
    engine::{ComponentReport, TableOutcome},
    error::EvidenceNetError,
    network::ReconcileStats,
    properties::{EdgeKey, Group, Label},
    report::{EdgeRow, NodeRow},
    session::Session,
};

/// Command interface between a front end and a [Session].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    AddNode {
        id: String,
        group: Group,
        text: String,
        likelihood: Option<Label>,
    },
    /// Remove a node, its connections and its parameters
    DeleteNode(String),
    AddEdge {
        source: String,
        target: String,
    },
    DeleteEdge {
        source: String,
        target: String,
    },
    SetPrior(String, Label),
    SetTruthProb(String, Label),
    SetEdgeStrength {
        source: String,
        target: String,
        strength: f64,
    },
    /// Fill unset parameters from the engine defaults
    SeedDefaults,
    /// Replace the session's network
    Import(NetworkData),
    Export,
    CalcPrior(String),
    TruthTables,
    NodeTable,
    EdgeTable,
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Op::AddNode { id, group, .. } => write!(f, "AddNode({group} {id})"),
            Op::DeleteNode(id) => write!(f, "DeleteNode({id})"),
            Op::AddEdge { source, target } => write!(f, "AddEdge({source}->{target})"),
            Op::DeleteEdge { source, target } => write!(f, "DeleteEdge({source}->{target})"),
            Op::SetPrior(id, label) => write!(f, "SetPrior({id}: {label})"),
            Op::SetTruthProb(id, label) => write!(f, "SetTruthProb({id}: {label})"),
            Op::SetEdgeStrength {
                source,
                target,
                strength,
            } => write!(f, "SetEdgeStrength({source}->{target}: {strength})"),
            Op::SeedDefaults => write!(f, "SeedDefaults"),
            Op::Import(data) => write!(
                f,
                "Import({} evidence, {} hypotheses, {} connections)",
                data.evidence.len(),
                data.hypotheses.len(),
                data.connections.len()
            ),
            Op::Export => write!(f, "Export"),
            Op::CalcPrior(id) => write!(f, "CalcPrior({id})"),
            Op::TruthTables => write!(f, "TruthTables"),
            Op::NodeTable => write!(f, "NodeTable"),
            Op::EdgeTable => write!(f, "EdgeTable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpResult {
    Ok,
    Edge(EdgeKey),
    /// Previous value of a label parameter
    Label(Option<Label>),
    /// Previous value of an edge strength
    Strength(Option<f64>),
    Counts(ReconcileStats),
    Network(NetworkData),
    Probability(Option<f64>),
    Tables(Vec<ComponentReport>),
    Nodes(Vec<NodeRow>),
    Edges(Vec<EdgeRow>),
}

impl Display for OpResult {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            OpResult::Ok => write!(f, "Ok"),
            OpResult::Edge(edge) => write!(f, "Edge({edge})"),
            OpResult::Label(prev) => write!(
                f,
                "Label(previous: {})",
                prev.map(|l| l.phrase()).unwrap_or("unset")
            ),
            OpResult::Strength(prev) => match prev {
                Some(r) => write!(f, "Strength(previous: {r})"),
                None => write!(f, "Strength(previous: unset)"),
            },
            OpResult::Counts(c) => write!(
                f,
                "Counts(priors: {}, truth_probs: {}, edge_strengths: {})",
                c.priors, c.truth_probs, c.edge_strengths
            ),
            OpResult::Network(data) => write!(
                f,
                "Network({} evidence, {} hypotheses, {} connections)",
                data.evidence.len(),
                data.hypotheses.len(),
                data.connections.len()
            ),
            OpResult::Probability(p) => match p {
                Some(p) => write!(f, "Probability({:.1}%)", p * 100.0),
                None => write!(f, "Probability(undefined)"),
            },
            OpResult::Tables(reports) => write!(
                f,
                "Tables({} components, {} tables)",
                reports.len(),
                reports
                    .iter()
                    .filter(|r| matches!(r.outcome, Ok(TableOutcome::Table(_))))
                    .count()
            ),
            OpResult::Nodes(rows) => write!(f, "Nodes({})", rows.len()),
            OpResult::Edges(rows) => write!(f, "Edges({})", rows.len()),
        }
    }
}

impl Session {
    /// Run `op` against this session. Any failure is wrapped in
    /// [EvidenceNetError::Operation] naming the command.
    pub fn apply(&mut self, op: Op) -> Result<OpResult, EvidenceNetError> {
        tracing::debug!("[Session::apply] {op}");
        let label = op.to_string();
        self.dispatch(op).map_err(|e| e.during(label))
    }

    fn dispatch(&mut self, op: Op) -> Result<OpResult, EvidenceNetError> {
        Ok(match op {
            Op::AddNode {
                id,
                group,
                text,
                likelihood,
            } => {
                self.add_node(&id, group, &text, likelihood)?;
                OpResult::Ok
            }
            Op::DeleteNode(id) => OpResult::Counts(self.delete_node(&id)?),
            Op::AddEdge { source, target } => OpResult::Edge(self.add_edge(&source, &target)?),
            Op::DeleteEdge { source, target } => {
                self.delete_edge(&source, &target)?;
                OpResult::Ok
            }
            Op::SetPrior(id, label) => OpResult::Label(self.set_prior(&id, label)?),
            Op::SetTruthProb(id, label) => OpResult::Label(self.set_truth_prob(&id, label)?),
            Op::SetEdgeStrength {
                source,
                target,
                strength,
            } => OpResult::Strength(self.set_edge_strength(&source, &target, strength)?),
            Op::SeedDefaults => OpResult::Counts(self.seed_defaults()?),
            Op::Import(data) => {
                self.import(data)?;
                OpResult::Ok
            }
            Op::Export => OpResult::Network(self.export()),
            Op::CalcPrior(id) => {
                if !self.graph().contains_node(&id) {
                    return Err(EvidenceNetError::NotFound(format!("node '{id}'")));
                }
                OpResult::Probability(self.calc_prior(&id))
            }
            Op::TruthTables => OpResult::Tables(self.truth_tables()),
            Op::NodeTable => OpResult::Nodes(self.node_table()),
            Op::EdgeTable => OpResult::Edges(self.edge_table()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn add(id: &str, group: Group) -> Op {
        Op::AddNode {
            id: id.to_string(),
            group,
            text: String::new(),
            likelihood: None,
        }
    }

    #[test]
    fn commands_drive_a_session() {
        let mut session = Session::default();
        session.apply(add("E1", Group::Evidence)).unwrap();
        session.apply(add("H1", Group::Hypothesis)).unwrap();
        let edge = session
            .apply(Op::AddEdge {
                source: "E1".to_string(),
                target: "H1".to_string(),
            })
            .unwrap();
        assert_eq!(edge.to_string(), "Edge(E1->H1)");
        session
            .apply(Op::SetPrior("H1".to_string(), Label::RealisticPossibility))
            .unwrap();
        session
            .apply(Op::SetTruthProb("E1".to_string(), Label::LikelyOrProbable))
            .unwrap();
        let p = session.apply(Op::CalcPrior("H1".to_string())).unwrap();
        assert_eq!(p.to_string(), "Probability(56.2%)");
        let tables = session.apply(Op::TruthTables).unwrap();
        assert_eq!(tables.to_string(), "Tables(1 components, 1 tables)");
    }

    #[test]
    fn failures_name_the_operation() {
        let mut session = Session::default();
        let err = session
            .apply(Op::DeleteNode("E7".to_string()))
            .unwrap_err();
        match &err {
            EvidenceNetError::Operation { op, reason } => {
                assert_eq!(op, "DeleteNode(E7)");
                assert!(matches!(**reason, EvidenceNetError::NotFound(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().starts_with("DeleteNode(E7) failed: "));
        assert!(session
            .apply(Op::CalcPrior("H1".to_string()))
            .is_err());
    }

    #[test]
    fn ops_round_trip_through_json() {
        let op = Op::SetEdgeStrength {
            source: "E1".to_string(),
            target: "H1".to_string(),
            strength: 3.5,
        };
        let raw = serde_json::to_string(&op).unwrap();
        assert_eq!(serde_json::from_str::<Op>(&raw).unwrap(), op);
        assert_eq!(op.to_string(), "SetEdgeStrength(E1->H1: 3.5)");
    }
}
