//! Arangraph
//!
//! A labeled property graph (vertices, edges, multi-valued properties) on top
//! of a document database that only knows collections, documents and AQL.
//!
//! # Layers
//!
//! - `graph`: element model. Vertices and edges pair with database documents
//!   (handle, key, revision) and carry cardinality-typed properties.
//! - `query`: traversal requests rendered to AQL text plus bind variables.
//! - `schema`: the relation grammar, default edge definitions, and the check
//!   against a graph already registered in the database.
//! - `client`: the narrow execution boundary and the [`ArangoGraph`] session.
//!
//! ## Example Usage
//!
//! ```rust
//! use arangraph::{ArangoGraph, Direction, GraphConfig, PropertyFilter, ScriptedDatabase, Vertex};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let db = Arc::new(ScriptedDatabase::new());
//! // Graph lookup finds nothing, variables already exist.
//! db.push_empty()
//!     .push_rows(vec![json!({"_id": "graph_variables/modern", "_key": "modern", "_rev": "1"})]);
//!
//! let config = GraphConfig::new("modern")
//!     .with_vertex_collection("person")
//!     .with_edge_collection("knows")
//!     .with_create_graph(true);
//! let graph = ArangoGraph::open(db.clone(), config).unwrap();
//!
//! let mut marko = Vertex::with_key("person", "marko");
//! marko.set_property("name", "marko");
//! db.push_rows(vec![json!({"_id": "modern_person/marko", "_key": "marko", "_rev": "2"})]);
//! graph.insert_vertex(&mut marko).unwrap();
//!
//! let neighbors = graph
//!     .vertex_neighbors(&marko, Direction::Out, &[], &PropertyFilter::new())
//!     .unwrap();
//! assert!(neighbors.is_empty());
//! assert!(db.last_query().unwrap().query.contains("OUTBOUND @startId"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod query;
pub mod schema;

// Re-export main types for convenience
pub use client::{
    ArangoGraph, CollectionNaming, Cursor, DatabaseClient, DatabaseError, GraphVariables,
    QueryOptions, ScriptedDatabase,
};

pub use config::GraphConfig;

pub use error::{GraphError, GraphResult};

pub use graph::{
    Cardinality, Direction, DocumentHandle, Edge, Element, ElementCodec, ElementKind,
    PairingState, PropertyMap, PropertyValue, Vertex,
};

pub use query::{
    BindVars, Comparator, PropertyFilter, QueryBuilder, QueryContext, QueryDescriptor, RenderedQuery,
};

pub use schema::{EdgeDefinition, GraphDefinition};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
