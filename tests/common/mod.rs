//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use evidence_net::{codec::json::NetworkData, session::Session};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// One evidence item bearing on one hypothesis, fully parameterized:
/// prior 45%, truth 65%, strength 2.0.
#[allow(dead_code)]
pub const SCENARIO: &str = r#"{
  "evidence": [{"id": "E1", "text": "Fuel stockpiled near the border"}],
  "hypotheses": [{"id": "H1", "text": "An offensive is planned", "likelihood": ""}],
  "connections": [{"source": "E1", "target": "H1"}],
  "priors": {"H1": "Realistic Possibility"},
  "truth_probs": {"E1": "Likely or Probable"},
  "edge_strengths": {"E1->H1": 2.0}
}"#;

/// Three components:
/// 1. E1, E2 -> H1 -> H2 <- E3 (with H2 the deepest hypothesis)
/// 2. E4 -> E5 (no hypotheses)
/// 3. H3 <-> H4 (cyclic)
#[allow(dead_code)]
pub const MIXED: &str = r#"{
  "evidence": [
    {"id": "E1", "text": "Troop movements"},
    {"id": "E2", "text": "Leave cancelled"},
    {"id": "E3", "text": "Bridging equipment forward"},
    {"id": "E4", "text": "Unrelated report"},
    {"id": "E5", "text": "Follow-up report"}
  ],
  "hypotheses": [
    {"id": "H1", "text": "Mobilisation", "likelihood": "Likely or Probable"},
    {"id": "H2", "text": "River crossing", "likelihood": ""},
    {"id": "H3", "text": "Feint"},
    {"id": "H4", "text": "Counter-feint"}
  ],
  "connections": [
    {"source": "E1", "target": "H1"},
    {"source": "E2", "target": "H1"},
    {"source": "H1", "target": "H2"},
    {"source": "E3", "target": "H2"},
    {"source": "E4", "target": "E5"},
    {"source": "H3", "target": "H4"},
    {"source": "H4", "target": "H3"}
  ],
  "priors": {"H1": "Unlikely", "H2": "Highly Unlikely"},
  "truth_probs": {"E1": "Highly Likely", "E2": "Likely or Probable", "E3": "Unlikely"},
  "edge_strengths": {"E1->H1": 3.0, "E2->H1": 1.5, "H1->H2": 4.0, "E3->H2": 0.5}
}"#;

#[allow(dead_code)]
pub fn session_from(raw: &str) -> Session {
    let mut session = Session::default();
    session.import_json(raw).unwrap();
    session
}

#[allow(dead_code)]
pub fn data_from(raw: &str) -> NetworkData {
    NetworkData::from_json_str(raw).unwrap()
}
