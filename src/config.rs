//! Graph configuration
//!
//! Loaded from YAML or built in code:
//!
//! ```yaml
//! graph_name: modern
//! vertex_collections: [person, software]
//! edge_collections: [knows, created]
//! relations:
//!   - knows:person->person
//!   - created:person->software
//! create_graph: true
//! ```

use crate::error::{GraphError, GraphResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

const DEFAULT_DATABASE: &str = "_system";

fn collection_name_pattern() -> GraphResult<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$"))
        .as_ref()
        .map_err(|e| GraphError::Config(e.to_string()))
}

/// Configuration of one graph session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Name the graph is registered under
    pub graph_name: String,
    /// Database holding the graph
    pub database_name: String,
    /// Vertex collection labels
    pub vertex_collections: Vec<String>,
    /// Edge collection labels
    pub edge_collections: Vec<String>,
    /// Relations in `label:from->to` form; empty means full mesh
    pub relations: Vec<String>,
    /// Vertex collections registered without edge definitions
    pub orphan_collections: Vec<String>,
    /// Prefix on-database collection names with the graph name
    pub prefix_collection_names: bool,
    /// Create the graph when it does not exist
    pub create_graph: bool,
    /// Cursor batch size passed to every query
    pub batch_size: Option<u32>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            graph_name: String::new(),
            database_name: DEFAULT_DATABASE.to_string(),
            vertex_collections: Vec::new(),
            edge_collections: Vec::new(),
            relations: Vec::new(),
            orphan_collections: Vec::new(),
            prefix_collection_names: true,
            create_graph: false,
            batch_size: None,
        }
    }
}

impl GraphConfig {
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(text: &str) -> GraphResult<Self> {
        serde_yaml::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn with_database(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }

    pub fn with_vertex_collection(mut self, label: impl Into<String>) -> Self {
        self.vertex_collections.push(label.into());
        self
    }

    pub fn with_edge_collection(mut self, label: impl Into<String>) -> Self {
        self.edge_collections.push(label.into());
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relations.push(relation.into());
        self
    }

    pub fn with_orphan_collection(mut self, label: impl Into<String>) -> Self {
        self.orphan_collections.push(label.into());
        self
    }

    pub fn with_prefix_collection_names(mut self, prefix: bool) -> Self {
        self.prefix_collection_names = prefix;
        self
    }

    pub fn with_create_graph(mut self, create: bool) -> Self {
        self.create_graph = create;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.graph_name.trim().is_empty() {
            return Err(GraphError::Config("graph name must not be empty".to_string()));
        }
        check_name("graph", &self.graph_name)?;
        if self.vertex_collections.is_empty() {
            return Err(GraphError::Config(
                "at least one vertex collection is required".to_string(),
            ));
        }
        if !self.relations.is_empty() && self.edge_collections.is_empty() {
            return Err(GraphError::Config(
                "relations are configured but no edge collections".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in self
            .vertex_collections
            .iter()
            .chain(&self.edge_collections)
            .chain(&self.orphan_collections)
        {
            check_name("collection", name)?;
            if !seen.insert(name.as_str()) {
                return Err(GraphError::Config(format!("duplicate collection: {}", name)));
            }
        }
        if self.batch_size == Some(0) {
            return Err(GraphError::Config("batch size must be positive".to_string()));
        }
        Ok(())
    }
}

fn check_name(what: &str, name: &str) -> GraphResult<()> {
    if collection_name_pattern()?.is_match(name) {
        Ok(())
    } else {
        Err(GraphError::Config(format!("invalid {} name: {:?}", what, name)))
    }
}
