//! Truth tables over the ancestors of each component's deepest hypothesis.
//!
//! For every weakly connected component that contains a hypothesis, the hypothesis with the
//! greatest topological depth is chosen (first in declaration order on ties). Every ancestor of
//! that hypothesis becomes a boolean input, evidence and hypotheses alike, and each of the 2^k
//! assignments gets
//!
//! ```text
//! P(H = true) = sigmoid(β0 + Σ β_i X_i)    over the direct parents i of H
//! ```
//!
//! where `β0` comes from the prior (0.5 when unset) and `β_i = ln(r_i)` from the edge strength
//! (1.0 when unset, no effect when `r_i <= 0`). Unlike [super::probability::calc_prior], direct
//! hypothesis parents take part here.

use crate::{
    error::EvidenceNetError,
    network::{EvidenceGraph, ParameterStore},
    properties::{EdgeKey, Group, NodeId},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use super::probability::{baseline_log_odds, sigmoid, DEFAULT_PRIOR_DECIMAL};

/// Edge strength assumed by truth tables for edges without one.
pub const DEFAULT_TABLE_STRENGTH: f64 = 1.0;

/// Hard ceiling on table inputs regardless of [TableLimits]. A 24-input table already has
/// sixteen million rows.
pub const MAX_TABLE_INPUTS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLimits {
    /// Largest ancestor set a table is generated for; the table has 2^max_inputs rows. Values
    /// above [MAX_TABLE_INPUTS] are clamped to it.
    pub max_inputs: usize,
}

impl Default for TableLimits {
    fn default() -> Self {
        TableLimits { max_inputs: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentWeight {
    pub parent: NodeId,
    pub beta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthRow {
    /// One value per input, in [TruthTable::inputs] order.
    pub assignment: Vec<bool>,
    pub probability: f64,
}

impl TruthRow {
    /// Probability as a percentage with two decimals, e.g. `"56.20%"`.
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTable {
    pub hypothesis: NodeId,
    pub depth: usize,
    pub inputs: Vec<NodeId>,
    pub baseline: f64,
    pub parents: Vec<ParentWeight>,
    pub rows: Vec<TruthRow>,
}

impl TruthTable {
    pub fn probability_header(&self) -> String {
        format!("P({}=True) (%)", self.hypothesis)
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut headers = self.inputs.iter().map(|i| i.to_string()).collect::<Vec<_>>();
        headers.push(self.probability_header());
        let widths = headers
            .iter()
            .map(|h| h.len().max("false".len()))
            .collect::<Vec<_>>();
        let render = |cells: Vec<String>| {
            cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, w)| format!("{cell:<width$}", width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        writeln!(f, "{}", render(headers))?;
        writeln!(
            f,
            "{}",
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-|-")
        )?;
        for row in self.rows.iter() {
            let mut cells = row
                .assignment
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>();
            cells.push(row.percent());
            writeln!(f, "{}", render(cells))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableOutcome {
    Table(TruthTable),
    /// The component has no hypothesis node; no table is produced.
    NoHypotheses,
    /// The deepest hypothesis has no ancestors to enumerate.
    NoInputs { hypothesis: NodeId, depth: usize },
}

impl TableOutcome {
    pub fn table(&self) -> Option<&TruthTable> {
        match self {
            TableOutcome::Table(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReport {
    /// 1-based position of the component.
    pub index: usize,
    pub nodes: Vec<NodeId>,
    pub outcome: Result<TableOutcome, EvidenceNetError>,
}

/// Depth of every node of the component: 0 without predecessors inside it, else one more than
/// its deepest predecessor.
fn depths(
    nodes: &[NodeId],
    graph: &EvidenceGraph,
) -> Result<BTreeMap<NodeId, usize>, EvidenceNetError> {
    let members = nodes.iter().collect::<BTreeSet<_>>();
    let mut depth: BTreeMap<NodeId, usize> = BTreeMap::new();
    for id in graph.topological_order(nodes)? {
        let d = graph
            .predecessors(&id)
            .into_iter()
            .filter(|p| members.contains(&p.id))
            .map(|p| depth.get(&p.id).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        depth.insert(id, d);
    }
    Ok(depth)
}

/// Generate the truth table of one component. `nodes` must list the component's members in
/// declaration order; that order breaks depth ties.
pub fn table_for_component(
    nodes: &[NodeId],
    graph: &EvidenceGraph,
    store: &ParameterStore,
    limits: TableLimits,
) -> Result<TableOutcome, EvidenceNetError> {
    let hypotheses = nodes
        .iter()
        .filter(|id| graph.group(id) == Some(Group::Hypothesis))
        .collect::<Vec<_>>();
    if hypotheses.is_empty() {
        return Ok(TableOutcome::NoHypotheses);
    }

    let depth = depths(nodes, graph)?;
    let mut deepest: Option<(&NodeId, usize)> = None;
    for id in hypotheses {
        let d = depth.get(id).copied().unwrap_or(0);
        if deepest.map_or(true, |(_, best)| d > best) {
            deepest = Some((id, d));
        }
    }
    let Some((hypothesis, hypothesis_depth)) = deepest else {
        return Ok(TableOutcome::NoHypotheses);
    };

    let members = nodes.iter().collect::<BTreeSet<_>>();
    let inputs = graph
        .ancestors(hypothesis)
        .into_iter()
        .filter(|id| members.contains(id))
        .collect::<Vec<_>>();
    if inputs.is_empty() {
        return Ok(TableOutcome::NoInputs {
            hypothesis: hypothesis.clone(),
            depth: hypothesis_depth,
        });
    }
    let limit = limits.max_inputs.min(MAX_TABLE_INPUTS);
    if inputs.len() > limit {
        return Err(EvidenceNetError::TableTooLarge {
            hypothesis: hypothesis.to_string(),
            inputs: inputs.len(),
            limit,
        });
    }

    let baseline = baseline_log_odds(
        store
            .prior(hypothesis)
            .map(|l| l.decimal())
            .unwrap_or(DEFAULT_PRIOR_DECIMAL),
    );
    let parents = graph
        .predecessors(hypothesis)
        .into_iter()
        .filter(|p| members.contains(&p.id))
        .map(|p| {
            let edge = EdgeKey::new(p.id.clone(), hypothesis.clone());
            let r = store.edge_strength_or(&edge, DEFAULT_TABLE_STRENGTH);
            ParentWeight {
                parent: p.id.clone(),
                beta: if r > 0.0 { r.ln() } else { 0.0 },
            }
        })
        .collect::<Vec<_>>();
    let parent_slots = parents
        .iter()
        .map(|pw| (inputs.iter().position(|i| i == &pw.parent), pw.beta))
        .collect::<Vec<_>>();

    let k = inputs.len();
    let rows = (0..(1usize << k))
        .map(|mask| {
            // The first input is the most significant bit, so false sorts before true.
            let assignment = (0..k)
                .map(|j| (mask >> (k - 1 - j)) & 1 == 1)
                .collect::<Vec<_>>();
            let z = parent_slots
                .iter()
                .fold(baseline, |z, (slot, beta)| match slot {
                    Some(pos) if assignment[*pos] => z + beta,
                    _ => z,
                });
            TruthRow {
                assignment,
                probability: sigmoid(z),
            }
        })
        .collect();

    tracing::debug!(
        "[truth_table] {} (depth {}) over {} inputs",
        hypothesis,
        hypothesis_depth,
        k
    );
    Ok(TableOutcome::Table(TruthTable {
        hypothesis: hypothesis.clone(),
        depth: hypothesis_depth,
        inputs,
        baseline,
        parents,
        rows,
    }))
}

/// Run [table_for_component] over every weakly connected component. A component that cannot be
/// tabulated (for example because it is cyclic) carries its error without affecting the others.
pub fn tables_by_component(
    graph: &EvidenceGraph,
    store: &ParameterStore,
    limits: TableLimits,
) -> Vec<ComponentReport> {
    graph
        .components()
        .into_iter()
        .enumerate()
        .map(|(i, nodes)| {
            let outcome = table_for_component(&nodes, graph, store, limits);
            if let Err(e) = &outcome {
                tracing::warn!("Component {} is not computable: {e}", i + 1);
            }
            ComponentReport {
                index: i + 1,
                nodes,
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::json::NetworkData;

    fn parts(raw: &str) -> (EvidenceGraph, ParameterStore) {
        NetworkData::from_json_str(raw)
            .unwrap()
            .into_parts()
            .unwrap()
    }

    fn ids(raw: &[&str]) -> Vec<NodeId> {
        raw.iter().map(|s| NodeId::try_from(*s).unwrap()).collect()
    }

    #[test]
    fn depth_follows_longest_path() {
        let (graph, _) = parts(
            r#"{
                "evidence": [{"id": "E1"}, {"id": "E2"}],
                "hypotheses": [{"id": "H1"}, {"id": "H2"}],
                "connections": [
                    {"source": "E1", "target": "H1"},
                    {"source": "H1", "target": "H2"},
                    {"source": "E2", "target": "H2"}
                ]
            }"#,
        );
        let depth = depths(&ids(&["E1", "E2", "H1", "H2"]), &graph).unwrap();
        assert_eq!(depth["E2"], 0);
        assert_eq!(depth["H1"], 1);
        assert_eq!(depth["H2"], 2);
    }

    #[test]
    fn single_parent_table() {
        let (graph, store) = parts(
            r#"{
                "evidence": [{"id": "E1"}],
                "hypotheses": [{"id": "H1"}],
                "connections": [{"source": "E1", "target": "H1"}],
                "priors": {"H1": "Realistic Possibility"},
                "edge_strengths": {"E1->H1": 2.0}
            }"#,
        );
        let outcome =
            table_for_component(&ids(&["E1", "H1"]), &graph, &store, TableLimits::default())
                .unwrap();
        let table = outcome.table().unwrap();
        assert_eq!(table.inputs, ids(&["E1"]));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].assignment, vec![false]);
        assert_eq!(table.rows[0].percent(), "45.00%");
        // odds 0.45/0.55 doubled
        assert_eq!(table.rows[1].percent(), "62.07%");
        assert_eq!(table.probability_header(), "P(H1=True) (%)");
    }

    #[test]
    fn missing_prior_and_strength_use_table_defaults() {
        let (graph, store) = parts(
            r#"{
                "evidence": [{"id": "E1"}],
                "hypotheses": [{"id": "H1"}],
                "connections": [{"source": "E1", "target": "H1"}]
            }"#,
        );
        let outcome =
            table_for_component(&ids(&["E1", "H1"]), &graph, &store, TableLimits::default())
                .unwrap();
        let table = outcome.table().unwrap();
        assert_eq!(table.parents[0].beta, 0.0);
        assert!(table.rows.iter().all(|r| r.percent() == "50.00%"));
    }

    #[test]
    fn hypothesis_parents_and_indirect_ancestors_are_inputs() {
        let (graph, store) = parts(
            r#"{
                "evidence": [{"id": "E1"}],
                "hypotheses": [{"id": "H1"}, {"id": "H2"}],
                "connections": [{"source": "E1", "target": "H1"}, {"source": "H1", "target": "H2"}],
                "priors": {"H2": "Unlikely"},
                "edge_strengths": {"E1->H1": 9.0, "H1->H2": 4.0}
            }"#,
        );
        let nodes = ids(&["E1", "H1", "H2"]);
        let outcome = table_for_component(&nodes, &graph, &store, TableLimits::default()).unwrap();
        let table = outcome.table().unwrap();
        assert_eq!(table.hypothesis.as_str(), "H2");
        assert_eq!(table.depth, 2);
        assert_eq!(table.inputs, ids(&["E1", "H1"]));
        assert_eq!(table.rows.len(), 4);
        // E1 is not a direct parent of H2, so it never moves the probability.
        assert_eq!(table.rows[0].probability, table.rows[2].probability);
        assert_eq!(table.rows[1].probability, table.rows[3].probability);
        assert!(table.rows[1].probability > table.rows[0].probability);
        assert_eq!(
            table
                .rows
                .iter()
                .map(|r| r.assignment.clone())
                .collect::<Vec<_>>(),
            vec![
                vec![false, false],
                vec![false, true],
                vec![true, false],
                vec![true, true]
            ]
        );
    }

    #[test]
    fn depth_ties_pick_first_declared_hypothesis() {
        let (graph, store) = parts(
            r#"{
                "evidence": [{"id": "E1"}],
                "hypotheses": [{"id": "H2"}, {"id": "H1"}],
                "connections": [{"source": "E1", "target": "H2"}, {"source": "E1", "target": "H1"}]
            }"#,
        );
        let nodes = graph.components().remove(0);
        let outcome = table_for_component(&nodes, &graph, &store, TableLimits::default()).unwrap();
        assert_eq!(outcome.table().unwrap().hypothesis.as_str(), "H2");
    }

    #[test]
    fn skips_and_failures_are_reported_per_component() {
        let (graph, store) = parts(
            r#"{
                "evidence": [{"id": "E1"}, {"id": "E2"}, {"id": "E3"}],
                "hypotheses": [{"id": "H1"}, {"id": "H2"}, {"id": "H3"}, {"id": "H4"}],
                "connections": [
                    {"source": "E1", "target": "E2"},
                    {"source": "H1", "target": "H2"},
                    {"source": "H2", "target": "H1"},
                    {"source": "E3", "target": "H3"}
                ]
            }"#,
        );
        let reports = tables_by_component(&graph, &store, TableLimits::default());
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].nodes, ids(&["E1", "E2"]));
        assert_eq!(reports[0].outcome, Ok(TableOutcome::NoHypotheses));
        assert_eq!(reports[1].nodes, ids(&["E3", "H3"]));
        assert!(reports[1].outcome.as_ref().unwrap().table().is_some());
        assert!(matches!(
            reports[2].outcome,
            Err(EvidenceNetError::CyclicComponent { .. })
        ));
        assert_eq!(
            reports[3].outcome,
            Ok(TableOutcome::NoInputs {
                hypothesis: NodeId::try_from("H4").unwrap(),
                depth: 0
            })
        );
    }

    #[test]
    fn oversized_ancestor_sets_are_refused() {
        let (graph, store) = parts(
            r#"{
                "evidence": [{"id": "E1"}, {"id": "E2"}, {"id": "E3"}],
                "hypotheses": [{"id": "H1"}],
                "connections": [
                    {"source": "E1", "target": "H1"},
                    {"source": "E2", "target": "H1"},
                    {"source": "E3", "target": "H1"}
                ]
            }"#,
        );
        let reports = tables_by_component(&graph, &store, TableLimits { max_inputs: 2 });
        assert!(matches!(
            reports[0].outcome,
            Err(EvidenceNetError::TableTooLarge { inputs: 3, limit: 2, .. })
        ));
    }

    #[test]
    fn limits_above_the_ceiling_are_clamped() {
        let evidence = (1..=25)
            .map(|i| format!(r#"{{"id": "E{i}"}}"#))
            .collect::<Vec<_>>()
            .join(", ");
        let connections = (1..=25)
            .map(|i| format!(r#"{{"source": "E{i}", "target": "H1"}}"#))
            .collect::<Vec<_>>()
            .join(", ");
        let (graph, store) = parts(&format!(
            r#"{{"evidence": [{evidence}], "hypotheses": [{{"id": "H1"}}],
                "connections": [{connections}]}}"#
        ));
        let reports = tables_by_component(&graph, &store, TableLimits { max_inputs: 40 });
        assert!(matches!(
            reports[0].outcome,
            Err(EvidenceNetError::TableTooLarge {
                inputs: 25,
                limit: MAX_TABLE_INPUTS,
                ..
            })
        ));
    }

    #[test]
    fn display_renders_header_and_rows() {
        let (graph, store) = parts(
            r#"{
                "evidence": [{"id": "E1"}],
                "hypotheses": [{"id": "H1"}],
                "connections": [{"source": "E1", "target": "H1"}]
            }"#,
        );
        let reports = tables_by_component(&graph, &store, TableLimits::default());
        let rendered = reports[0]
            .outcome
            .as_ref()
            .unwrap()
            .table()
            .unwrap()
            .to_string();
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("E1    | P(H1=True) (%)"));
        assert!(lines[2].starts_with("false | 50.00%"));
        assert!(lines[3].starts_with("true  | 50.00%"));
    }
}
