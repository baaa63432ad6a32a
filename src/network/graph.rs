//! Graph data structures for evidence networks.
//!
//! [`EvidenceGraph`] wraps a `petgraph::Graph` of [`EvidenceNode`]s plus an id index. Node and
//! edge iteration follow declaration order, which is what every deterministic ordering in the
//! engine (components, ancestors, truth-table columns) is derived from.

use crate::{
    codec::json::{Connection, EvidenceItem, HypothesisItem},
    error::EvidenceNetError,
    properties::{EdgeKey, EvidenceNode, Group, NodeId},
};
use petgraph::{
    algo::toposort,
    graph::NodeIndex,
    graphmap::DiGraphMap,
    unionfind::UnionFind,
    visit::{Bfs, EdgeRef, Reversed},
    Direction,
};
use std::{
    collections::{btree_map::Entry as BTreeEntry, BTreeMap, BTreeSet},
    fmt,
};

#[derive(Debug, Clone, Default)]
pub struct EvidenceGraph {
    graph: petgraph::Graph<EvidenceNode, ()>,
    index: BTreeMap<NodeId, NodeIndex>,
}

impl EvidenceGraph {
    /// Build a graph from the three flat collections of the exchange schema.
    ///
    /// Evidence nodes are inserted first, then hypotheses, then the connections in list order.
    /// An id declared twice (in either list) is rejected rather than overwritten, and every
    /// connection must name declared nodes. A connection listed twice collapses into one edge.
    pub fn build(
        evidence: &[EvidenceItem],
        hypotheses: &[HypothesisItem],
        connections: &[Connection],
    ) -> Result<Self, EvidenceNetError> {
        let mut out = EvidenceGraph::default();
        for item in evidence {
            out.insert_node(EvidenceNode {
                id: item.id.clone(),
                group: Group::Evidence,
                text: item.text.clone(),
                likelihood: None,
            })?;
        }
        for item in hypotheses {
            out.insert_node(EvidenceNode {
                id: item.id.clone(),
                group: Group::Hypothesis,
                text: item.text.clone(),
                likelihood: item.likelihood,
            })?;
        }
        for conn in connections {
            let source_idx = out.require(conn, &conn.source)?;
            let target_idx = out.require(conn, &conn.target)?;
            if out.graph.find_edge(source_idx, target_idx).is_some() {
                tracing::debug!(
                    "[EvidenceGraph::build] collapsing repeated connection {} -> {}",
                    conn.source,
                    conn.target
                );
                continue;
            }
            out.graph.add_edge(source_idx, target_idx, ());
        }
        tracing::debug!(
            "[EvidenceGraph::build] {} nodes, {} edges",
            out.node_count(),
            out.edge_count()
        );
        Ok(out)
    }

    fn insert_node(&mut self, node: EvidenceNode) -> Result<(), EvidenceNetError> {
        match self.index.entry(node.id.clone()) {
            BTreeEntry::Occupied(e) => Err(EvidenceNetError::DuplicateNode(e.key().to_string())),
            BTreeEntry::Vacant(e) => {
                e.insert(self.graph.add_node(node));
                Ok(())
            }
        }
    }

    fn require(&self, conn: &Connection, id: &NodeId) -> Result<NodeIndex, EvidenceNetError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| EvidenceNetError::DanglingConnection {
                source_id: conn.source.to_string(),
                target_id: conn.target.to_string(),
                missing: id.to_string(),
            })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &EvidenceNode> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Edges in connection order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.graph.raw_edges().iter().map(move |edge| {
            EdgeKey::new(
                self.graph[edge.source()].id.clone(),
                self.graph[edge.target()].id.clone(),
            )
        })
    }

    pub fn node(&self, id: &str) -> Option<&EvidenceNode> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    pub fn group(&self, id: &str) -> Option<Group> {
        self.node(id).map(|n| n.group)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn contains_edge(&self, edge: &EdgeKey) -> bool {
        match (self.index.get(&edge.source), self.index.get(&edge.target)) {
            (Some(s), Some(t)) => self.graph.find_edge(*s, *t).is_some(),
            _ => false,
        }
    }

    /// Direct parents of `id`, in the order their connections were declared. Unknown ids have no
    /// parents.
    pub fn predecessors(&self, id: &str) -> Vec<&EvidenceNode> {
        let Some(idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut incoming = self
            .graph
            .edges_directed(*idx, Direction::Incoming)
            .collect::<Vec<_>>();
        incoming.sort_by_key(|e| e.id().index());
        incoming
            .into_iter()
            .map(|e| &self.graph[e.source()])
            .collect()
    }

    /// Every node that can reach `id` by following edges forward, excluding `id` itself, in
    /// declaration order.
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        let Some(start) = self.index.get(id).copied() else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut found = BTreeSet::new();
        let mut bfs = Bfs::new(reversed, start);
        while let Some(idx) = bfs.next(reversed) {
            if idx != start {
                found.insert(idx);
            }
        }
        found
            .into_iter()
            .map(|idx| self.graph[idx].id.clone())
            .collect()
    }

    /// Weakly connected components. Components are ordered by their earliest declared member and
    /// members are listed in declaration order.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.raw_edges() {
            sets.union(edge.source().index(), edge.target().index());
        }
        let mut root_slot: BTreeMap<usize, usize> = BTreeMap::new();
        let mut components: Vec<Vec<NodeId>> = Vec::new();
        for idx in self.graph.node_indices() {
            let root = sets.find(idx.index());
            let slot = *root_slot.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(self.graph[idx].id.clone());
        }
        components
    }

    /// Topological order of the subgraph induced by `nodes`.
    ///
    /// The induced subgraph must be acyclic; a cycle (self-loops included) is reported as
    /// [EvidenceNetError::CyclicComponent] naming a node on the cycle.
    pub fn topological_order(&self, nodes: &[NodeId]) -> Result<Vec<NodeId>, EvidenceNetError> {
        let members = nodes
            .iter()
            .map(|id| {
                self.index
                    .get(id)
                    .copied()
                    .ok_or_else(|| EvidenceNetError::NotFound(format!("node '{id}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let member_set = members.iter().copied().collect::<BTreeSet<_>>();
        let mut induced = DiGraphMap::<NodeIndex, ()>::new();
        for idx in members.iter() {
            induced.add_node(*idx);
        }
        for edge in self.graph.raw_edges() {
            if member_set.contains(&edge.source()) && member_set.contains(&edge.target()) {
                induced.add_edge(edge.source(), edge.target(), ());
            }
        }
        toposort(&induced, None)
            .map(|order| {
                order
                    .into_iter()
                    .map(|idx| self.graph[idx].id.clone())
                    .collect()
            })
            .map_err(|cycle| EvidenceNetError::CyclicComponent {
                node: self.graph[cycle.node_id()].id.to_string(),
            })
    }
}

impl PartialEq for EvidenceGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.edges().eq(other.edges())
    }
}

impl fmt::Display for EvidenceGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let edge_tuple = self
            .edges()
            .map(|e| (e.source.to_string(), e.target.to_string()))
            .collect::<Vec<_>>();
        let source_max_len = edge_tuple
            .iter()
            .map(|elem| elem.0.len())
            .max()
            .unwrap_or_default();
        let edge_display = edge_tuple
            .iter()
            .map(|(source, target)| format!("{source:>source_max_len$} -> {target}"))
            .collect::<Vec<String>>()
            .join("\n- ");
        write!(
            f,
            "nodes:\n- {},\nedges:\n- {}",
            self.nodes()
                .map(|n| n.to_string())
                .collect::<Vec<String>>()
                .join(",\n- "),
            edge_display
        )
    }
}
