//! Typed errors
//!
//! Each layer has its own error type so hosts can tell a rejected document
//! transaction apart from a configuration problem or a handler defect.

use thiserror::Error;

use crate::document::{NodeId, SelectionPoint};

/// Errors from a [`DocumentTree`](crate::document::DocumentTree) adapter
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    #[error("Node {0} is not an element")]
    NotElement(NodeId),

    #[error("Node {0} is not attached to a parent")]
    Detached(NodeId),

    #[error("Node id already in use: {0}")]
    DuplicateNode(NodeId),

    #[error("Selection out of bounds: {0:?}")]
    InvalidSelection(SelectionPoint),

    #[error("No active selection")]
    NoSelection,
}

/// Errors from loading or saving [`MentionConfig`](crate::config::MentionConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors surfaced by [`MentionEditor`](crate::mentions::MentionEditor)
#[derive(Debug, Error)]
pub enum MentionError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for MentionError {
    fn from(err: anyhow::Error) -> Self {
        // Handlers propagate adapter errors through anyhow; recover the type
        match err.downcast::<DocumentError>() {
            Ok(doc) => MentionError::Document(doc),
            Err(other) => MentionError::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anyhow_document_error_is_recovered() {
        let err: anyhow::Error = DocumentError::NotText(NodeId(4)).into();
        let mention: MentionError = err.into();
        assert!(matches!(
            mention,
            MentionError::Document(DocumentError::NotText(NodeId(4)))
        ));
    }

    #[test]
    fn test_other_errors_stay_opaque() {
        let mention: MentionError = anyhow::anyhow!("boom").into();
        assert!(matches!(mention, MentionError::Other(_)));
        assert_eq!(mention.to_string(), "boom");
    }
}
