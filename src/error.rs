use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum EvidenceNetError {
    #[error("Invalid command: {0}")]
    Command(String),
    #[error("Connection {source_id} -> {target_id} references unknown node '{missing}'")]
    DanglingConnection {
        source_id: String,
        target_id: String,
        missing: String,
    },
    #[error("Duplicate connection: {0}")]
    DuplicateEdge(String),
    #[error("Node id '{0}' is declared more than once")]
    DuplicateNode(String),
    #[error("Component containing '{node}' has a cycle and cannot be topologically sorted")]
    CyclicComponent { node: String },
    #[error("Text extraction failed: {0}")]
    Extraction(String),
    #[error("Invalid node id '{0}': ids must be non-empty and must not contain '->'")]
    InvalidId(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Malformed network data: {0}")]
    MalformedImport(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("{op} failed: {reason}")]
    Operation {
        op: String,
        reason: Box<EvidenceNetError>,
    },
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error(
        "Truth table for '{hypothesis}' needs {inputs} inputs, above the configured limit of {limit}"
    )]
    TableTooLarge {
        hypothesis: String,
        inputs: usize,
        limit: usize,
    },
    #[error("Unknown probability label '{0}'")]
    UnknownLabel(String),
}

impl EvidenceNetError {
    /// Attach the name of the operation that produced this error.
    pub fn during<S: fmt::Display>(self, op: S) -> Self {
        EvidenceNetError::Operation {
            op: op.to_string(),
            reason: Box::new(self),
        }
    }

    /// True for failures caused by the supplied input rather than the environment, i.e. the
    /// caller can correct the data and retry.
    pub fn is_validation(&self) -> bool {
        match self {
            EvidenceNetError::Operation { reason, .. } => reason.is_validation(),
            EvidenceNetError::Io(_)
            | EvidenceNetError::FileNotFound(_)
            | EvidenceNetError::Extraction(_) => false,
            _ => true,
        }
    }
}

impl From<JsonError> for EvidenceNetError {
    fn from(src: JsonError) -> EvidenceNetError {
        if src.is_io() {
            EvidenceNetError::Io(format!("JSON io error: {src}"))
        } else {
            EvidenceNetError::MalformedImport(format!("{src}"))
        }
    }
}

impl From<toml::de::Error> for EvidenceNetError {
    fn from(src: toml::de::Error) -> EvidenceNetError {
        EvidenceNetError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for EvidenceNetError {
    fn from(src: toml::ser::Error) -> EvidenceNetError {
        EvidenceNetError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<io::Error> for EvidenceNetError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => EvidenceNetError::FileNotFound(format!("{x}")),
            _ => EvidenceNetError::Io(format!("IOError: {}: {x}", x.kind())),
        }
    }
}

impl From<fmt::Error> for EvidenceNetError {
    fn from(x: fmt::Error) -> Self {
        EvidenceNetError::Serialization(format!("{x}"))
    }
}
