use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

use crate::tree::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum AnnotateError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Malformed document tree: {0}")]
    MalformedTree(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl AnnotateError {
    /// A node was reached twice while walking, either through a cycle or because two parents
    /// list it as a child.
    pub fn revisited(node: NodeId) -> AnnotateError {
        AnnotateError::MalformedTree(format!(
            "node {node} is reachable through more than one path (cycle or shared child)"
        ))
    }

    pub fn dangling_child(parent: NodeId, child: NodeId) -> AnnotateError {
        AnnotateError::MalformedTree(format!(
            "node {parent} lists child {child}, which is not in the document arena"
        ))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AnnotateError::MalformedTree(_))
    }
}

impl From<toml::de::Error> for AnnotateError {
    fn from(src: toml::de::Error) -> AnnotateError {
        AnnotateError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for AnnotateError {
    fn from(src: toml::ser::Error) -> AnnotateError {
        AnnotateError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for AnnotateError {
    fn from(src: JsonError) -> AnnotateError {
        AnnotateError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for AnnotateError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => AnnotateError::NotFound(format!("{x}")),
            _ => AnnotateError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for AnnotateError {
    fn from(x: fmt::Error) -> Self {
        AnnotateError::Serialization(format!("{x}"))
    }
}
