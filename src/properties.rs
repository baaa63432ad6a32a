//! [crate::properties] contains the basic building blocks of an evidence network: the qualitative
//! probability [Label] scale, node identifiers, node groups and the ordered [EdgeKey] pair.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    borrow::Borrow,
    fmt::{Display, Formatter},
    ops::Deref,
    str::FromStr,
};

use crate::error::EvidenceNetError;

/// Separator between source and target id in the canonical edge encoding.
pub const EDGE_SEPARATOR: &str = "->";

/// One of the seven qualitative probability phrases.
///
/// The variant order is the order of the scale, from least to most likely. Every label carries a
/// fixed percentage and decimal probability; see [Label::percent] and [Label::decimal].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Remote Chance")]
    RemoteChance,
    #[serde(rename = "Highly Unlikely")]
    HighlyUnlikely,
    #[serde(rename = "Unlikely")]
    Unlikely,
    #[serde(rename = "Realistic Possibility")]
    RealisticPossibility,
    #[serde(rename = "Likely or Probable")]
    LikelyOrProbable,
    #[serde(rename = "Highly Likely")]
    HighlyLikely,
    #[serde(rename = "Almost Certain")]
    AlmostCertain,
}

impl Label {
    pub const SCALE: [Label; 7] = [
        Label::RemoteChance,
        Label::HighlyUnlikely,
        Label::Unlikely,
        Label::RealisticPossibility,
        Label::LikelyOrProbable,
        Label::HighlyLikely,
        Label::AlmostCertain,
    ];

    pub fn phrase(&self) -> &'static str {
        match self {
            Label::RemoteChance => "Remote Chance",
            Label::HighlyUnlikely => "Highly Unlikely",
            Label::Unlikely => "Unlikely",
            Label::RealisticPossibility => "Realistic Possibility",
            Label::LikelyOrProbable => "Likely or Probable",
            Label::HighlyLikely => "Highly Likely",
            Label::AlmostCertain => "Almost Certain",
        }
    }

    /// Percentage in [0, 100].
    pub fn percent(&self) -> f64 {
        match self {
            Label::RemoteChance => 5.0,
            Label::HighlyUnlikely => 15.0,
            Label::Unlikely => 30.0,
            Label::RealisticPossibility => 45.0,
            Label::LikelyOrProbable => 65.0,
            Label::HighlyLikely => 85.0,
            Label::AlmostCertain => 97.5,
        }
    }

    /// Decimal probability in (0, 1).
    pub fn decimal(&self) -> f64 {
        match self {
            Label::RemoteChance => 0.05,
            Label::HighlyUnlikely => 0.15,
            Label::Unlikely => 0.30,
            Label::RealisticPossibility => 0.45,
            Label::LikelyOrProbable => 0.65,
            Label::HighlyLikely => 0.85,
            Label::AlmostCertain => 0.975,
        }
    }

    /// Position within [Label::SCALE].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_phrase(phrase: &str) -> Option<Label> {
        Label::SCALE.into_iter().find(|l| l.phrase() == phrase)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.phrase())
    }
}

impl FromStr for Label {
    type Err = EvidenceNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::from_phrase(s).ok_or_else(|| EvidenceNetError::UnknownLabel(s.to_string()))
    }
}

/// Percentage for a phrase, or `None` when the phrase is not on the scale.
pub fn percent_of(phrase: &str) -> Option<f64> {
    Label::from_phrase(phrase).map(|l| l.percent())
}

/// Decimal probability for a phrase, or `None` when the phrase is not on the scale.
pub fn decimal_of(phrase: &str) -> Option<f64> {
    Label::from_phrase(phrase).map(|l| l.decimal())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Evidence,
    Hypothesis,
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Group::Evidence => write!(f, "evidence"),
            Group::Hypothesis => write!(f, "hypothesis"),
        }
    }
}

impl FromStr for Group {
    type Err = EvidenceNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evidence" => Ok(Group::Evidence),
            "hypothesis" => Ok(Group::Hypothesis),
            _ => Err(EvidenceNetError::Command(format!(
                "unknown node group '{s}', expected 'evidence' or 'hypothesis'"
            ))),
        }
    }
}

/// Node identifier. Never empty, and never contains [EDGE_SEPARATOR] so that edge keys can be
/// encoded as `source->target` without ambiguity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeId {
    type Error = EvidenceNetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() || value.contains(EDGE_SEPARATOR) {
            return Err(EvidenceNetError::InvalidId(value));
        }
        Ok(NodeId(value))
    }
}

impl TryFrom<&str> for NodeId {
    type Error = EvidenceNetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        NodeId::try_from(value.to_string())
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> String {
        id.0
    }
}

impl Deref for NodeId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed edge identified by its ordered endpoints. `source -> target` means the source is an
/// evidentiary or causal input to the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
}

impl EdgeKey {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        EdgeKey { source, target }
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}

impl Display for EdgeKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}{}{}", self.source, EDGE_SEPARATOR, self.target)
    }
}

impl FromStr for EdgeKey {
    type Err = EvidenceNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = s.split_once(EDGE_SEPARATOR).ok_or_else(|| {
            EvidenceNetError::MalformedImport(format!(
                "edge key '{s}' is missing the '{EDGE_SEPARATOR}' separator"
            ))
        })?;
        Ok(EdgeKey {
            source: NodeId::try_from(source)?,
            target: NodeId::try_from(target)?,
        })
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeKey {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(de)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A node of the evidence graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceNode {
    pub id: NodeId,
    pub group: Group,
    pub text: String,
    /// Advisory likelihood stated by the source material. Display only.
    pub likelihood: Option<Label>,
}

impl EvidenceNode {
    pub fn is_hypothesis(&self) -> bool {
        self.group == Group::Hypothesis
    }

    pub fn is_evidence(&self) -> bool {
        self.group == Group::Evidence
    }
}

impl Display for EvidenceNode {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.group)
    }
}
