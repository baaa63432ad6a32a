//! The caller-owned state of one evidence network.
//!
//! A [Session] holds the validated [EvidenceGraph], its [ParameterStore] and the active
//! [EvidenceNetConfig]. Structural edits go through the flat [NetworkData] lists: the edited lists
//! are rebuilt into a new graph, and only a successful build replaces the current one, after which
//! the parameters are reconciled against it. A failed edit leaves the session untouched.

use crate::{
    codec::{
        extract::{extract_network, TextGenerator},
        json::{Connection, EvidenceItem, HypothesisItem, NetworkData},
    },
    config::EvidenceNetConfig,
    engine::{self, ComponentReport},
    error::EvidenceNetError,
    network::{EvidenceGraph, ParameterStore, ReconcileStats},
    properties::{EdgeKey, Group, Label, NodeId},
    report::{self, EdgeRow, NodeRow},
};

#[derive(Debug, Clone, Default)]
pub struct Session {
    graph: EvidenceGraph,
    store: ParameterStore,
    config: EvidenceNetConfig,
}

impl Session {
    /// Create an empty session. `config` is taken as given; [Session::from_data] and
    /// [Session::set_config] validate it first, and every edit that consumes a configured default
    /// leaves the session untouched when that default is rejected.
    pub fn new(config: EvidenceNetConfig) -> Self {
        Session {
            graph: EvidenceGraph::default(),
            store: ParameterStore::default(),
            config,
        }
    }

    pub fn from_data(
        data: NetworkData,
        config: EvidenceNetConfig,
    ) -> Result<Self, EvidenceNetError> {
        config.validate()?;
        let mut session = Session::new(config);
        session.import(data)?;
        Ok(session)
    }

    pub fn graph(&self) -> &EvidenceGraph {
        &self.graph
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn config(&self) -> &EvidenceNetConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EvidenceNetConfig) -> Result<(), EvidenceNetError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Build `data` into a graph and reconcile a copy of the parameters against it. Nothing is
    /// installed; see [Session::install].
    fn stage(
        &self,
        data: &NetworkData,
    ) -> Result<(EvidenceGraph, ParameterStore, ReconcileStats), EvidenceNetError> {
        let graph = data.build_graph()?;
        tracing::debug!(
            "[Session::stage] rebuilt graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        let mut store = self.store.clone();
        let stats = store.reconcile(&graph);
        Ok((graph, store, stats))
    }

    fn install(&mut self, graph: EvidenceGraph, store: ParameterStore) {
        self.graph = graph;
        self.store = store;
    }

    /// Stage `data` and install it.
    fn commit(&mut self, data: &NetworkData) -> Result<ReconcileStats, EvidenceNetError> {
        let (graph, store, stats) = self.stage(data)?;
        self.install(graph, store);
        Ok(stats)
    }

    fn node_id(raw: &str) -> Result<NodeId, EvidenceNetError> {
        NodeId::try_from(raw)
    }

    fn require_edge(&self, source: &str, target: &str) -> Result<EdgeKey, EvidenceNetError> {
        let edge = EdgeKey::new(Session::node_id(source)?, Session::node_id(target)?);
        if !self.graph.contains_edge(&edge) {
            return Err(EvidenceNetError::NotFound(format!("edge {edge}")));
        }
        Ok(edge)
    }

    fn require_group(&self, id: &str, group: Group) -> Result<NodeId, EvidenceNetError> {
        match self.graph.node(id) {
            None => Err(EvidenceNetError::NotFound(format!("node '{id}'"))),
            Some(node) if node.group != group => Err(EvidenceNetError::InvalidParameter(format!(
                "'{id}' is {} but the parameter applies to {group} nodes",
                node.group
            ))),
            Some(node) => Ok(node.id.clone()),
        }
    }

    /// Add a node. `likelihood` is only kept for hypotheses.
    pub fn add_node(
        &mut self,
        id: &str,
        group: Group,
        text: &str,
        likelihood: Option<Label>,
    ) -> Result<(), EvidenceNetError> {
        let id = Session::node_id(id)?;
        let mut data = NetworkData::from_graph(&self.graph);
        match group {
            Group::Evidence => {
                if likelihood.is_some() {
                    tracing::debug!("Ignoring likelihood on evidence node {id}");
                }
                data.evidence.push(EvidenceItem {
                    id,
                    text: text.to_string(),
                })
            }
            Group::Hypothesis => data.hypotheses.push(HypothesisItem {
                id,
                text: text.to_string(),
                likelihood,
            }),
        }
        self.commit(&data)?;
        Ok(())
    }

    /// Remove a node together with its connections and parameters.
    pub fn delete_node(&mut self, id: &str) -> Result<ReconcileStats, EvidenceNetError> {
        if !self.graph.contains_node(id) {
            return Err(EvidenceNetError::NotFound(format!("node '{id}'")));
        }
        let mut data = NetworkData::from_graph(&self.graph);
        data.evidence.retain(|e| e.id.as_str() != id);
        data.hypotheses.retain(|h| h.id.as_str() != id);
        data.connections
            .retain(|c| c.source.as_str() != id && c.target.as_str() != id);
        self.commit(&data)
    }

    /// Connect two existing nodes and give the new edge the configured default strength.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<EdgeKey, EvidenceNetError> {
        let edge = EdgeKey::new(Session::node_id(source)?, Session::node_id(target)?);
        if self.graph.contains_edge(&edge) {
            return Err(EvidenceNetError::DuplicateEdge(edge.to_string()));
        }
        let mut data = NetworkData::from_graph(&self.graph);
        data.connections.push(Connection::from(&edge));
        let (graph, mut store, _) = self.stage(&data)?;
        if store.edge_strength(&edge).is_none() {
            store.set_edge_strength(edge.clone(), self.config.engine.default_edge_strength)?;
        }
        self.install(graph, store);
        Ok(edge)
    }

    pub fn delete_edge(&mut self, source: &str, target: &str) -> Result<(), EvidenceNetError> {
        let edge = self.require_edge(source, target)?;
        let mut data = NetworkData::from_graph(&self.graph);
        data.connections.retain(|c| EdgeKey::from(c) != edge);
        self.commit(&data)?;
        Ok(())
    }

    pub fn set_prior(&mut self, id: &str, label: Label) -> Result<Option<Label>, EvidenceNetError> {
        let id = self.require_group(id, Group::Hypothesis)?;
        Ok(self.store.set_prior(id, label))
    }

    pub fn set_truth_prob(
        &mut self,
        id: &str,
        label: Label,
    ) -> Result<Option<Label>, EvidenceNetError> {
        let id = self.require_group(id, Group::Evidence)?;
        Ok(self.store.set_truth_prob(id, label))
    }

    pub fn set_edge_strength(
        &mut self,
        source: &str,
        target: &str,
        strength: f64,
    ) -> Result<Option<f64>, EvidenceNetError> {
        let edge = self.require_edge(source, target)?;
        self.store.set_edge_strength(edge, strength)
    }

    /// Fill every unset prior, truth probability and edge strength with the configured defaults.
    /// Returns how many entries of each map were filled.
    pub fn seed_defaults(&mut self) -> Result<ReconcileStats, EvidenceNetError> {
        let defaults = &self.config.engine;
        let mut store = self.store.clone();
        let mut seeded = ReconcileStats::default();
        for node in self.graph.nodes() {
            match node.group {
                Group::Hypothesis if store.prior(&node.id).is_none() => {
                    store.set_prior(node.id.clone(), defaults.default_prior);
                    seeded.priors += 1;
                }
                Group::Evidence if store.truth_prob(&node.id).is_none() => {
                    store.set_truth_prob(node.id.clone(), defaults.default_truth_prob);
                    seeded.truth_probs += 1;
                }
                _ => {}
            }
        }
        for edge in self.graph.edges() {
            if store.edge_strength(&edge).is_none() {
                store.set_edge_strength(edge, defaults.default_edge_strength)?;
                seeded.edge_strengths += 1;
            }
        }
        tracing::debug!("[Session::seed_defaults] seeded {} entries", seeded.total());
        self.store = store;
        Ok(seeded)
    }

    /// Replace the whole network. On failure the previous network is kept.
    pub fn import(&mut self, data: NetworkData) -> Result<(), EvidenceNetError> {
        let (graph, store) = data.into_parts()?;
        tracing::info!(
            "Imported network with {} nodes, {} edges and {} parameters",
            graph.node_count(),
            graph.edge_count(),
            store.priors().len() + store.truth_probs().len() + store.edge_strengths().len()
        );
        self.graph = graph;
        self.store = store;
        Ok(())
    }

    pub fn import_json(&mut self, raw: &str) -> Result<(), EvidenceNetError> {
        self.import(NetworkData::from_json_str(raw)?)
    }

    /// Structure `narrative` with `generator` and import the result. Extracted networks carry no
    /// parameters.
    pub fn import_extracted<G: TextGenerator + ?Sized>(
        &mut self,
        generator: &G,
        narrative: &str,
    ) -> Result<(), EvidenceNetError> {
        let data = extract_network(generator, narrative)?;
        self.import(data)
    }

    pub fn export(&self) -> NetworkData {
        NetworkData::from_parts(&self.graph, &self.store)
    }

    pub fn export_json(&self) -> Result<String, EvidenceNetError> {
        self.export().to_json_string_pretty()
    }

    pub fn calc_prior(&self, id: &str) -> Option<f64> {
        engine::calc_prior(id, &self.graph, &self.store)
    }

    pub fn truth_tables(&self) -> Vec<ComponentReport> {
        engine::tables_by_component(&self.graph, &self.store, self.config.tables)
    }

    pub fn node_table(&self) -> Vec<NodeRow> {
        report::node_rows(&self.graph, &self.store)
    }

    pub fn edge_table(&self) -> Vec<EdgeRow> {
        report::edge_rows(&self.graph, &self.store)
    }
}
