//! Narrative extraction: turn free analytic text into [NetworkData] through an external text
//! generation service.
//!
//! The service is a black box behind [TextGenerator]. It receives [PROMPT_TEMPLATE] with the
//! narrative substituted for `{payload}` and must reply with the three-array schema only. Every
//! failure, including an unparseable or inconsistent reply, surfaces as
//! [EvidenceNetError::Extraction].
//!
//! A reply is held to the same rules as an imported network and nothing more: id prefixes must
//! match the arrays, and every connection must name known, distinct endpoints. The prompt asks for
//! evidence-to-hypothesis and hypothesis-to-hypothesis links, but a reply that also links into
//! evidence is accepted, since the graph and the truth-table engine handle any direction.

use crate::{
    codec::json::{Connection, EvidenceItem, HypothesisItem, NetworkData},
    error::EvidenceNetError,
};
use serde::Deserialize;
use std::{
    io::Write,
    process::{Command, Stdio},
    thread,
};

pub const PROMPT_TEMPLATE: &str = r#"You will receive an analytic text.
Task: extract **evidence** items and **hypotheses** items, then return
ONE JSON object with exactly three arrays:

{
  "evidence":   [ {"id": "E1", "text": "..."} ],
  "hypotheses": [ {"id": "H1", "text": "...", "likelihood": "Likely or Probable"} ],
  "connections": [ {"source": "E1", "target": "H1"},
                   {"source": "H1", "target": "H2"} ]
}

Rules:
• Evidence IDs start with "E"; hypothesis IDs start with "H".
• A connection links an evidence to a hypothesis OR a hypothesis to another hypothesis.
• Include a "likelihood" field only if the source text states one value must be one of:
    Remote Chance, Highly Unlikely, Unlikely, Realistic Possibility,
    Likely or Probable, Highly Likely, Almost Certain.

Return **nothing** except this JSON.

Apply the rules to:
{payload}
"#;

pub const EVIDENCE_PREFIX: char = 'E';
pub const HYPOTHESIS_PREFIX: char = 'H';

pub fn render_prompt(narrative: &str) -> String {
    PROMPT_TEMPLATE.replace("{payload}", narrative)
}

/// A text generation backend.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, EvidenceNetError>;
}

/// Runs an external program per request: the prompt is written to its stdin and its stdout is
/// taken as the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGenerator {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandGenerator {
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        CommandGenerator {
            program: program.into(),
            args,
        }
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String, EvidenceNetError> {
        tracing::debug!("Running text generator '{}' {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                EvidenceNetError::Extraction(format!("could not start '{}': {e}", self.program))
            })?;
        // The prompt is fed from its own thread so a child that writes before it has read all of
        // its input cannot block on a full stdout pipe while we block on a full stdin pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });
        // Reaps the child on every path, including when the writer fails.
        let output = child.wait_with_output().map_err(|e| {
            EvidenceNetError::Extraction(format!("'{}' did not complete: {e}", self.program))
        })?;
        let sent = match writer {
            Some(handle) => handle.join().map_err(|_| {
                EvidenceNetError::Extraction("prompt writer thread panicked".to_string())
            })?,
            None => Ok(()),
        };
        if !output.status.success() {
            return Err(EvidenceNetError::Extraction(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        sent.map_err(|e| EvidenceNetError::Extraction(format!("could not send prompt: {e}")))?;
        String::from_utf8(output.stdout)
            .map_err(|e| EvidenceNetError::Extraction(format!("reply is not UTF-8: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct ExtractedNetwork {
    evidence: Vec<EvidenceItem>,
    hypotheses: Vec<HypothesisItem>,
    connections: Vec<Connection>,
}

/// Parse and validate a generator reply. Parameters are never part of a reply, so the returned
/// data has empty prior, truth-probability and edge-strength maps.
pub fn parse_reply(reply: &str) -> Result<NetworkData, EvidenceNetError> {
    let extracted: ExtractedNetwork = serde_json::from_str(reply.trim()).map_err(|e| {
        EvidenceNetError::Extraction(format!("reply is not valid network JSON: {e}"))
    })?;
    for item in extracted.evidence.iter() {
        if !item.id.starts_with(EVIDENCE_PREFIX) {
            return Err(EvidenceNetError::Extraction(format!(
                "evidence id '{}' must start with '{EVIDENCE_PREFIX}'",
                item.id
            )));
        }
    }
    for item in extracted.hypotheses.iter() {
        if !item.id.starts_with(HYPOTHESIS_PREFIX) {
            return Err(EvidenceNetError::Extraction(format!(
                "hypothesis id '{}' must start with '{HYPOTHESIS_PREFIX}'",
                item.id
            )));
        }
    }
    let data = NetworkData {
        evidence: extracted.evidence,
        hypotheses: extracted.hypotheses,
        connections: extracted.connections,
        ..Default::default()
    };
    data.build_graph()
        .map_err(|e| EvidenceNetError::Extraction(format!("inconsistent reply: {e}")))?;
    Ok(data)
}

/// Ask `generator` to structure `narrative`.
pub fn extract_network<G: TextGenerator + ?Sized>(
    generator: &G,
    narrative: &str,
) -> Result<NetworkData, EvidenceNetError> {
    let reply = generator
        .generate(&render_prompt(narrative))
        .map_err(|e| match e {
            EvidenceNetError::Extraction(_) => e,
            other => EvidenceNetError::Extraction(other.to_string()),
        })?;
    let data = parse_reply(&reply)?;
    tracing::info!(
        "Extracted {} evidence, {} hypotheses, {} connections",
        data.evidence.len(),
        data.hypotheses.len(),
        data.connections.len()
    );
    Ok(data)
}
