//! Database boundary and the graph session
//!
//! - [`DatabaseClient`]: run a query, get a cursor
//! - [`CollectionNaming`]: labels to on-database collection names
//! - [`ArangoGraph`]: the session object owning client, schema and caches
//! - [`ScriptedDatabase`]: in-process client replaying queued responses

pub mod executor;
pub mod graph;
pub mod naming;
pub mod scripted;
pub mod variables;

// Re-export main types
pub use executor::{Cursor, DatabaseClient, DatabaseError, QueryOptions, TypedCursor};
pub use graph::ArangoGraph;
pub use naming::CollectionNaming;
pub use scripted::{ExecutedQuery, ScriptedDatabase};
pub use variables::{GraphVariables, VariablesCache, VARIABLES_COLLECTION};
