//! In-process database stand-in
//!
//! [`ScriptedDatabase`] answers queries from a queue of prepared responses and
//! records everything it was asked. It backs the integration tests and lets
//! the CLI show what a session would send without a server.

use super::executor::{Cursor, DatabaseClient, DatabaseError, QueryOptions};
use crate::query::builder::BindVars;
use crate::schema::edge_definition::GraphDefinition;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// A query as received by the database
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedQuery {
    pub query: String,
    pub bind_vars: BindVars,
    pub options: QueryOptions,
}

#[derive(Debug, Default)]
pub struct ScriptedDatabase {
    responses: Mutex<VecDeque<Result<Cursor, DatabaseError>>>,
    executed: Mutex<Vec<ExecutedQuery>>,
    graphs: Mutex<Vec<GraphDefinition>>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next unanswered query
    pub fn push_rows(&self, rows: Vec<Value>) -> &Self {
        self.push(Ok(Cursor::new(rows)))
    }

    /// Queue an empty result
    pub fn push_empty(&self) -> &Self {
        self.push(Ok(Cursor::empty()))
    }

    /// Queue a failure
    pub fn push_error(&self, error: DatabaseError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, response: Result<Cursor, DatabaseError>) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    /// Responses not consumed yet
    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every query executed so far, oldest first
    pub fn executed(&self) -> Vec<ExecutedQuery> {
        self.executed.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_query(&self) -> Option<ExecutedQuery> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Graphs registered through [`DatabaseClient::create_graph`]
    pub fn created_graphs(&self) -> Vec<GraphDefinition> {
        self.graphs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DatabaseClient for ScriptedDatabase {
    /// Answers with the next queued response, or an empty cursor
    fn execute(&self, query: &str, bind_vars: &BindVars, options: &QueryOptions) -> Result<Cursor, DatabaseError> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecutedQuery {
                query: query.to_string(),
                bind_vars: bind_vars.clone(),
                options: *options,
            });
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(Cursor::empty()))
    }

    fn create_graph(&self, definition: &GraphDefinition) -> Result<(), DatabaseError> {
        self.graphs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(definition.clone());
        Ok(())
    }
}
