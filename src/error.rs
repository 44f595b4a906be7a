//! Error types for graph operations

use crate::client::executor::{DatabaseError, ERROR_DOCUMENT_NOT_FOUND, ERROR_UNIQUE_CONSTRAINT_VIOLATED};
use thiserror::Error;

/// Errors that can occur while translating, pairing or validating graph elements
#[derive(Error, Debug)]
pub enum GraphError {
    /// Relation text does not match `label:from->to`
    #[error("Malformed relation: {0}")]
    MalformedRelation(String),

    /// A relation or element names a collection that is not configured
    #[error("{relation} references unknown collection {collection}")]
    UnknownCollection { relation: String, collection: String },

    /// Handle or revision requested on an element that was never persisted
    #[error("Element is not paired with a document: {0}")]
    ElementNotPaired(String),

    /// Insert attempted on an element that is already persisted
    #[error("Element is already paired with document {0}")]
    ElementAlreadyPaired(String),

    /// The database rejected an insert because the key is taken
    #[error("Element already exists: {0}")]
    ElementAlreadyExists(String),

    /// The database has no document for the requested handle
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A single value was requested for a key holding several
    #[error("Property {0} has multiple values")]
    AmbiguousCardinality(String),

    /// Configured vertex collection missing from the live graph
    #[error("Vertex collection {0} is not part of the existing graph")]
    MissingVertexCollection(String),

    /// Live graph has a vertex collection the configuration does not declare
    #[error("Existing graph has undeclared vertex collection {0}")]
    SurplusVertexCollection(String),

    /// Live edge definition with no configured counterpart
    #[error("Existing graph edge definition {0} is not configured")]
    MissingEdgeDefinition(String),

    /// Configured edge definition with no live counterpart
    #[error("Configured edge definition {0} is not part of the existing graph")]
    SurplusEdgeDefinition(String),

    /// Same edge collection, different from/to sets
    #[error("Edge definition {collection} is incompatible: configured {expected}, existing {found}")]
    IncompatibleEdgeDefinition {
        collection: String,
        expected: String,
        found: String,
    },

    /// The named graph is not registered in the database
    #[error("Graph {0} not found")]
    GraphNotFound(String),

    /// The graph metadata document is absent
    #[error("Graph variables for {0} not found")]
    VariablesNotFound(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document could not be mapped to a graph element
    #[error("Codec error: {0}")]
    Codec(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by the database client
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl GraphError {
    /// Translate a database failure, mapping the conflicts callers act on
    /// into their own variants and wrapping everything else.
    pub fn from_database(err: DatabaseError, subject: &str) -> Self {
        match err.error_num {
            Some(ERROR_UNIQUE_CONSTRAINT_VIOLATED) => {
                GraphError::ElementAlreadyExists(subject.to_string())
            }
            Some(ERROR_DOCUMENT_NOT_FOUND) => GraphError::ElementNotFound(subject.to_string()),
            _ => GraphError::Database(err),
        }
    }

    /// Whether this error came from the schema check at graph open
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            GraphError::MissingVertexCollection(_)
                | GraphError::SurplusVertexCollection(_)
                | GraphError::MissingEdgeDefinition(_)
                | GraphError::SurplusEdgeDefinition(_)
                | GraphError::IncompatibleEdgeDefinition { .. }
        )
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_translated() {
        let err = DatabaseError::new("unique constraint violated")
            .with_code(409)
            .with_error_num(ERROR_UNIQUE_CONSTRAINT_VIOLATED);
        let translated = GraphError::from_database(err, "person/marko");
        assert!(matches!(translated, GraphError::ElementAlreadyExists(ref s) if s == "person/marko"));
    }

    #[test]
    fn test_transport_error_preserved() {
        let err = DatabaseError::new("connection reset");
        let translated = GraphError::from_database(err, "person/marko");
        match translated {
            GraphError::Database(inner) => assert_eq!(inner.message, "connection reset"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_schema_mismatch_classification() {
        assert!(GraphError::MissingVertexCollection("person".into()).is_schema_mismatch());
        assert!(!GraphError::GraphNotFound("g".into()).is_schema_mismatch());
    }
}
