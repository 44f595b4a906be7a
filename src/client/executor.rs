//! Database execution boundary
//!
//! The library never talks to the network. Everything it needs from the
//! database goes through [`DatabaseClient`]: run one query with bind variables
//! and get a cursor back, or register a named graph.

use crate::error::{GraphError, GraphResult};
use crate::query::builder::BindVars;
use crate::schema::edge_definition::GraphDefinition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::marker::PhantomData;
use thiserror::Error;

/// Unique constraint violated (duplicate `_key`)
pub const ERROR_UNIQUE_CONSTRAINT_VIOLATED: u32 = 1210;
/// Document not found
pub const ERROR_DOCUMENT_NOT_FOUND: u32 = 1202;
/// Write-write conflict on `_rev`
pub const ERROR_CONFLICT: u32 = 1200;

/// Failure reported by a [`DatabaseClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DatabaseError {
    /// HTTP-level status, when the client has one
    pub code: Option<u16>,
    /// Database error number
    pub error_num: Option<u32>,
    pub message: String,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            error_num: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_error_num(mut self, error_num: u32) -> Self {
        self.error_num = Some(error_num);
        self
    }
}

/// Per-query cursor options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub batch_size: Option<u32>,
    pub count: bool,
    pub full_count: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: Option<u32>) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }
}

/// Rows returned by one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    rows: VecDeque<Value>,
    count: Option<usize>,
}

impl Cursor {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            count: Some(rows.len()),
            rows: rows.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Total reported by the server, if counting was requested
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn with_count(mut self, count: Option<usize>) -> Self {
        self.count = count;
        self
    }

    /// Rows not yet consumed
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deserialize each remaining row into `T`
    pub fn into_typed<T: DeserializeOwned>(self) -> TypedCursor<T> {
        TypedCursor {
            inner: self,
            _marker: PhantomData,
        }
    }
}

impl Iterator for Cursor {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.rows.pop_front()
    }
}

/// Cursor whose rows are deserialized on the way out
#[derive(Debug)]
pub struct TypedCursor<T> {
    inner: Cursor,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> Iterator for TypedCursor<T> {
    type Item = GraphResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|row| serde_json::from_value(row).map_err(GraphError::from))
    }
}

/// Narrow contract to the document database
pub trait DatabaseClient: Send + Sync {
    /// Run one query and return its rows
    fn execute(&self, query: &str, bind_vars: &BindVars, options: &QueryOptions) -> Result<Cursor, DatabaseError>;

    /// Register a named graph with the given edge definitions
    fn create_graph(&self, definition: &GraphDefinition) -> Result<(), DatabaseError>;
}
