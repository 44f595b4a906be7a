//! Graph session
//!
//! An [`ArangoGraph`] binds a configuration to a named graph in the database.
//! Opening it resolves the edge definitions, pairs with (or creates) the
//! registered graph, and loads the graph variables. Every operation builds
//! one query and makes one round trip through the [`DatabaseClient`].

use super::executor::{Cursor, DatabaseClient, QueryOptions};
use super::naming::CollectionNaming;
use super::variables::{GraphVariables, VariablesCache, VARIABLES_COLLECTION};
use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::graph::codec::{Element, ElementCodec, REV_FIELD};
use crate::graph::edge::Edge;
use crate::graph::element::DocumentMeta;
use crate::graph::types::{Direction, DocumentHandle};
use crate::graph::vertex::Vertex;
use crate::query::builder::{QueryBuilder, RenderedQuery};
use crate::query::descriptor::{QueryContext, QueryDescriptor};
use crate::query::filter::PropertyFilter;
use crate::schema::edge_definition::{EdgeDefinition, GraphDefinition};
use crate::schema::validator::SchemaValidator;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// System collection listing the registered graphs
const GRAPHS_COLLECTION: &str = "_graphs";

pub struct ArangoGraph {
    client: Arc<dyn DatabaseClient>,
    config: GraphConfig,
    ctx: QueryContext,
    /// Resolved edge definitions, by label
    edge_definitions: Vec<EdgeDefinition>,
    codec: ElementCodec,
    variables: VariablesCache,
    options: QueryOptions,
}

impl fmt::Debug for ArangoGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArangoGraph")
            .field("config", &self.config)
            .field("edge_definitions", &self.edge_definitions)
            .finish_non_exhaustive()
    }
}

impl ArangoGraph {
    /// Open the configured graph with the default value codec
    pub fn open(client: Arc<dyn DatabaseClient>, config: GraphConfig) -> GraphResult<Self> {
        Self::open_with_codec(client, config, ElementCodec::default())
    }

    pub fn open_with_codec(
        client: Arc<dyn DatabaseClient>,
        config: GraphConfig,
        codec: ElementCodec,
    ) -> GraphResult<Self> {
        config.validate()?;
        let edge_definitions = EdgeDefinition::resolve(
            &config.relations,
            &config.vertex_collections,
            &config.edge_collections,
        )?;
        let naming = CollectionNaming::new(config.graph_name.clone(), config.prefix_collection_names);
        let ctx = QueryContext::new(naming, &config.vertex_collections, &config.edge_collections);
        let options = QueryOptions::new().with_batch_size(config.batch_size);

        let graph = Self {
            client,
            config,
            ctx,
            edge_definitions,
            codec,
            variables: VariablesCache::new(),
            options,
        };
        graph.pair_graph()?;
        graph.pair_variables()?;
        info!(
            "Opened graph {} in database {}",
            graph.name(),
            graph.config.database_name
        );
        Ok(graph)
    }

    pub fn name(&self) -> &str {
        &self.config.graph_name
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn naming(&self) -> &CollectionNaming {
        self.ctx.naming()
    }

    pub fn context(&self) -> &QueryContext {
        &self.ctx
    }

    /// Edge definitions by label
    pub fn edge_definitions(&self) -> &[EdgeDefinition] {
        &self.edge_definitions
    }

    pub fn codec(&self) -> &ElementCodec {
        &self.codec
    }

    // ========== Graph pairing ==========

    fn pair_graph(&self) -> GraphResult<()> {
        let naming = self.ctx.naming();
        let definitions: Vec<EdgeDefinition> = self
            .edge_definitions
            .iter()
            .map(|d| d.to_database(naming))
            .collect();
        let orphans = naming.resolve_all(&self.config.orphan_collections);

        match self.find_graph()? {
            Some(live) => {
                SchemaValidator::new(self.ctx.vertex_collections(), &orphans, &definitions).validate(&live)?;
                info!("Paired with existing graph {}", live.name);
            }
            None if self.config.create_graph => {
                let definition =
                    GraphDefinition::new(self.name(), definitions, self.ctx.vertex_collections(), &orphans);
                self.client.create_graph(&definition)?;
                info!(
                    "Created graph {} with {} edge definitions",
                    definition.name,
                    definition.edge_definitions.len()
                );
            }
            None => return Err(GraphError::GraphNotFound(self.name().to_string())),
        }
        Ok(())
    }

    fn find_graph(&self) -> GraphResult<Option<GraphDefinition>> {
        let mut qb = QueryBuilder::new();
        qb.iterate_collection("g", GRAPHS_COLLECTION);
        let name = qb.bind("graphName", self.name());
        qb.filter(&format!("g._key == {}", name)).ret(
            "{name: g._key, edgeDefinitions: g.edgeDefinitions, orphanCollections: g.orphanCollections}",
        );
        let mut cursor = self.run(qb.build(), self.name())?;
        cursor
            .next()
            .map(serde_json::from_value::<GraphDefinition>)
            .transpose()
            .map_err(GraphError::from)
    }

    fn pair_variables(&self) -> GraphResult<()> {
        match self.variables() {
            Ok(_) => Ok(()),
            Err(GraphError::VariablesNotFound(_)) => {
                let mut fresh = GraphVariables::new(self.name());
                self.insert_variables(&mut fresh)
            }
            Err(e) => Err(e),
        }
    }

    // ========== Vertex operations ==========

    pub fn insert_vertex(&self, vertex: &mut Vertex) -> GraphResult<()> {
        vertex.data().ensure_insertable()?;
        let subject = vertex.data().describe();
        let collection = self.vertex_collection(&vertex.label(), &subject)?;
        let document = self.codec.encode_vertex(vertex)?;
        let meta = self.insert_document(&collection, document, &subject)?;
        vertex.pair(meta, &collection)?;
        debug!("Inserted vertex {}", vertex.data().describe());
        Ok(())
    }

    /// Replace the stored vertex with the in-memory one
    pub fn update_vertex(&self, vertex: &mut Vertex) -> GraphResult<()> {
        let handle = vertex.handle()?.clone();
        let document = with_revision(self.codec.encode_vertex(vertex)?, vertex.revision()?);
        let meta = self.replace_document(handle.collection(), document, handle.as_str())?;
        vertex.data_mut().update_revision(meta.revision)?;
        debug!("Updated vertex {}", handle);
        Ok(())
    }

    /// Remove a vertex and, in the same query, every edge touching it
    pub fn remove_vertex(&self, vertex: &mut Vertex) -> GraphResult<()> {
        let handle = vertex.handle()?.clone();
        let key = paired_key(vertex.key(), &handle)?;

        let mut qb = QueryBuilder::new();
        let edge_collections = self.ctx.edge_collections();
        if !edge_collections.is_empty() {
            let start = qb.bind("handle", handle.as_str());
            for (idx, collection) in edge_collections.iter().enumerate() {
                let col = qb.bind_collection(collection);
                qb.append(&format!(
                    "LET edges{} = (FOR e IN {} FILTER e._from == {} OR e._to == {} REMOVE e IN {})",
                    idx, col, start, start, col
                ));
            }
        }
        let col = qb.bind_collection(handle.collection());
        let key = qb.bind("key", key);
        qb.append(&format!("REMOVE {} IN {}", key, col)).ret("OLD");

        let cursor = self.run(qb.build(), handle.as_str())?;
        if cursor.is_empty() {
            warn!("Removing vertex {} reported no document", handle);
        }
        vertex.data_mut().unpair();
        debug!("Removed vertex {} and its incident edges", handle);
        Ok(())
    }

    // ========== Edge operations ==========

    /// Insert an edge; its endpoints must fit the edge definition
    pub fn insert_edge(&self, edge: &mut Edge) -> GraphResult<()> {
        edge.data().ensure_insertable()?;
        let label = edge.label();
        let subject = edge.data().describe();
        let definition = self
            .edge_definitions
            .iter()
            .find(|d| d.collection == label)
            .ok_or_else(|| GraphError::UnknownCollection {
                relation: subject.clone(),
                collection: label.clone(),
            })?;
        for (endpoint, allowed) in [(edge.from(), &definition.from), (edge.to(), &definition.to)] {
            let endpoint_label = self.ctx.naming().label_from_handle(endpoint);
            if !allowed.contains(&endpoint_label) {
                return Err(GraphError::UnknownCollection {
                    relation: definition.to_string(),
                    collection: endpoint_label,
                });
            }
        }

        let document = self.codec.encode_edge(edge)?;
        let collection = self.ctx.naming().resolve(&label);
        let meta = self.insert_document(&collection, document, &subject)?;
        edge.pair(meta, &collection)?;
        debug!("Inserted edge {} from {} to {}", edge.data().describe(), edge.from(), edge.to());
        Ok(())
    }

    pub fn update_edge(&self, edge: &mut Edge) -> GraphResult<()> {
        let handle = edge.handle()?.clone();
        let document = with_revision(self.codec.encode_edge(edge)?, edge.revision()?);
        let meta = self.replace_document(handle.collection(), document, handle.as_str())?;
        edge.data_mut().update_revision(meta.revision)?;
        debug!("Updated edge {}", handle);
        Ok(())
    }

    pub fn remove_edge(&self, edge: &mut Edge) -> GraphResult<()> {
        let handle = edge.handle()?.clone();
        let key = paired_key(edge.key(), &handle)?;
        let cursor = self.remove_document(handle.collection(), &key, handle.as_str(), false)?;
        if cursor.is_empty() {
            warn!("Removing edge {} reported no document", handle);
        }
        edge.data_mut().unpair();
        debug!("Removed edge {}", handle);
        Ok(())
    }

    // ========== Reads ==========

    pub fn vertex(&self, key: &str) -> GraphResult<Option<Vertex>> {
        Ok(self.vertices(&[key.to_string()])?.into_iter().next())
    }

    /// Vertices with the given keys, or all vertices when `keys` is empty
    pub fn vertices(&self, keys: &[String]) -> GraphResult<Vec<Vertex>> {
        self.query(&QueryDescriptor::vertices().with_keys(keys.iter().cloned()))?
            .into_iter()
            .map(Element::into_vertex)
            .collect()
    }

    /// Edges with the given keys, or all edges when `keys` is empty
    pub fn edges(&self, keys: &[String]) -> GraphResult<Vec<Edge>> {
        self.query(&QueryDescriptor::edges().with_keys(keys.iter().cloned()))?
            .into_iter()
            .map(Element::into_edge)
            .collect()
    }

    /// Edges incident to `vertex`, restricted by edge label and properties
    pub fn vertex_edges(
        &self,
        vertex: &Vertex,
        direction: Direction,
        labels: &[String],
        filter: &PropertyFilter,
    ) -> GraphResult<Vec<Edge>> {
        let descriptor = QueryDescriptor::vertex_edges(vertex.handle()?.clone(), direction)
            .with_labels(labels.iter().cloned())
            .with_filter(filter.clone());
        self.query(&descriptor)?
            .into_iter()
            .map(Element::into_edge)
            .collect()
    }

    /// Vertices adjacent to `vertex`, each returned once
    pub fn vertex_neighbors(
        &self,
        vertex: &Vertex,
        direction: Direction,
        labels: &[String],
        filter: &PropertyFilter,
    ) -> GraphResult<Vec<Vertex>> {
        let descriptor = QueryDescriptor::vertex_neighbors(vertex.handle()?.clone(), direction)
            .with_labels(labels.iter().cloned())
            .with_filter(filter.clone());
        self.query(&descriptor)?
            .into_iter()
            .map(Element::into_vertex)
            .collect()
    }

    pub fn count_vertices(&self, labels: &[String]) -> GraphResult<u64> {
        self.count(QueryDescriptor::vertices().with_labels(labels.iter().cloned()))
    }

    pub fn count_edges(&self, labels: &[String]) -> GraphResult<u64> {
        self.count(QueryDescriptor::edges().with_labels(labels.iter().cloned()))
    }

    /// Run a descriptor and decode every row into an element
    pub fn query(&self, descriptor: &QueryDescriptor) -> GraphResult<Vec<Element>> {
        descriptor
            .execute(&self.ctx, self.client.as_ref(), &self.options)?
            .map(|doc| self.codec.decode(doc, self.ctx.naming()))
            .collect()
    }

    /// Number of matches of a descriptor
    pub fn count(&self, descriptor: QueryDescriptor) -> GraphResult<u64> {
        descriptor
            .with_count(true)
            .execute(&self.ctx, self.client.as_ref(), &self.options)?
            .into_typed::<u64>()
            .next()
            .unwrap_or(Ok(0))
    }

    /// Elements by document handle; handles that resolve to nothing are skipped
    pub fn documents(&self, handles: &[DocumentHandle]) -> GraphResult<Vec<Element>> {
        if handles.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::new();
        qb.documents_by_id(handles, "d").ret("d");
        self.run(qb.build(), "document lookup")?
            .map(|doc| self.codec.decode(doc, self.ctx.naming()))
            .collect()
    }

    // ========== Graph variables ==========

    /// Cached variables, looked up on first use
    pub fn variables(&self) -> GraphResult<GraphVariables> {
        self.variables.get_or_try_insert_with(|| self.fetch_variables())
    }

    fn fetch_variables(&self) -> GraphResult<GraphVariables> {
        let mut qb = QueryBuilder::new();
        qb.iterate_collection("d", VARIABLES_COLLECTION);
        let key = qb.bind("key", self.name());
        qb.filter(&format!("d._key == {}", key)).ret("d");
        match self.run(qb.build(), self.name())?.next() {
            Some(doc) => {
                let variables = GraphVariables::from_document(&doc)?;
                info!("Loaded variables of graph {}", self.name());
                Ok(variables)
            }
            None => Err(GraphError::VariablesNotFound(self.name().to_string())),
        }
    }

    pub fn insert_variables(&self, variables: &mut GraphVariables) -> GraphResult<()> {
        variables.data().ensure_insertable()?;
        let subject = variables.data().describe();
        let meta = self.insert_document(VARIABLES_COLLECTION, variables.to_document(), &subject)?;
        variables.data_mut().pair(meta, VARIABLES_COLLECTION)?;
        self.variables.put(variables.clone());
        info!("Inserted variables of graph {}", variables.graph_name());
        Ok(())
    }

    pub fn update_variables(&self, variables: &mut GraphVariables) -> GraphResult<()> {
        let handle = variables.data().handle()?.clone();
        let meta = self.replace_document(VARIABLES_COLLECTION, variables.to_document(), handle.as_str())?;
        variables.data_mut().update_revision(meta.revision)?;
        self.variables.put(variables.clone());
        info!("Updated variables of graph {}", variables.graph_name());
        Ok(())
    }

    /// Delete the variables document; the cached copy is evicted even when
    /// the delete fails
    pub fn delete_variables(&self, variables: &mut GraphVariables) -> GraphResult<()> {
        let handle = variables.data().handle()?.clone();
        let result = self.remove_document(VARIABLES_COLLECTION, variables.graph_name(), handle.as_str(), true);
        self.variables.invalidate();
        variables.data_mut().unpair();

        if result?.is_empty() {
            warn!("Deleting variables {} removed nothing", handle);
        } else {
            info!("Deleted variables of graph {}", variables.graph_name());
        }
        Ok(())
    }

    // ========== Document primitives ==========

    fn vertex_collection(&self, label: &str, subject: &str) -> GraphResult<String> {
        if self.config.vertex_collections.iter().any(|c| c == label) {
            Ok(self.ctx.naming().resolve(label))
        } else {
            Err(GraphError::UnknownCollection {
                relation: subject.to_string(),
                collection: label.to_string(),
            })
        }
    }

    fn insert_document(&self, collection: &str, document: Value, subject: &str) -> GraphResult<DocumentMeta> {
        let mut qb = QueryBuilder::new();
        let col = qb.bind_collection(collection);
        let doc = qb.bind("document", document);
        qb.append(&format!("INSERT {} INTO {}", doc, col)).ret("NEW");
        first_document(self.run(qb.build(), subject)?, subject)
    }

    fn replace_document(&self, collection: &str, document: Value, subject: &str) -> GraphResult<DocumentMeta> {
        let mut qb = QueryBuilder::new();
        let col = qb.bind_collection(collection);
        let doc = qb.bind("document", document);
        qb.append(&format!("REPLACE {} IN {} OPTIONS {{ignoreRevs: false}}", doc, col))
            .ret("NEW");
        first_document(self.run(qb.build(), subject)?, subject)
    }

    fn remove_document(&self, collection: &str, key: &str, subject: &str, ignore_missing: bool) -> GraphResult<Cursor> {
        let mut qb = QueryBuilder::new();
        let col = qb.bind_collection(collection);
        let key = qb.bind("key", key);
        let options = if ignore_missing { " OPTIONS {ignoreErrors: true}" } else { "" };
        qb.append(&format!("REMOVE {} IN {}{}", key, col, options)).ret("OLD");
        self.run(qb.build(), subject)
    }

    fn run(&self, rendered: RenderedQuery, subject: &str) -> GraphResult<Cursor> {
        debug!(
            "Executing query: {} (bind vars: {:?})",
            rendered.query,
            rendered.bind_vars.keys().collect::<Vec<_>>()
        );
        self.client
            .execute(&rendered.query, &rendered.bind_vars, &self.options)
            .map_err(|e| GraphError::from_database(e, subject))
    }
}

fn first_document(mut cursor: Cursor, subject: &str) -> GraphResult<DocumentMeta> {
    let doc = cursor
        .next()
        .ok_or_else(|| GraphError::Codec(format!("write of {} returned no document", subject)))?;
    DocumentMeta::from_document(&doc)
}

fn with_revision(mut document: Value, revision: &str) -> Value {
    if let Value::Object(fields) = &mut document {
        fields.insert(REV_FIELD.to_string(), Value::String(revision.to_string()));
    }
    document
}

fn paired_key(key: Option<&str>, handle: &DocumentHandle) -> GraphResult<String> {
    key.map(str::to_string)
        .ok_or_else(|| GraphError::ElementNotPaired(handle.to_string()))
}
