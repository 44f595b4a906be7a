//! Graph schema: edge definitions and validation against the database

pub mod edge_definition;
pub mod validator;

pub use edge_definition::{EdgeDefinition, GraphDefinition};
pub use validator::SchemaValidator;
