//! Query descriptors
//!
//! A [`QueryDescriptor`] names one query shape plus its filters and renders
//! it to AQL. The four shapes are:
//!
//! - all vertices, optionally restricted by label and key
//! - all edges, optionally restricted by label and key
//! - the edges incident to one vertex (depth-1 traversal returning `e`)
//! - the neighbours of one vertex (depth-1 traversal returning `v`)
//!
//! Clause order is fixed per shape and matters for AQL semantics.

use super::builder::{QueryBuilder, RenderedQuery, TraversalOptions};
use super::filter::{Comparator, PropertyFilter};
use crate::client::executor::{Cursor, DatabaseClient, QueryOptions};
use crate::client::naming::CollectionNaming;
use crate::error::GraphResult;
use crate::graph::property::PropertyValue;
use crate::graph::types::{Direction, DocumentHandle};
use tracing::debug;

const VERTEX_VAR: &str = "v";
const EDGE_VAR: &str = "e";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Vertices,
    Edges,
    Neighbors,
}

/// What a descriptor needs to know about the graph it runs against
#[derive(Debug, Clone)]
pub struct QueryContext {
    naming: CollectionNaming,
    vertex_collections: Vec<String>,
    edge_collections: Vec<String>,
}

impl QueryContext {
    /// Context over configured labels; names are resolved here
    pub fn new(naming: CollectionNaming, vertex_labels: &[String], edge_labels: &[String]) -> Self {
        Self {
            vertex_collections: naming.resolve_all(vertex_labels),
            edge_collections: naming.resolve_all(edge_labels),
            naming,
        }
    }

    pub fn graph_name(&self) -> &str {
        self.naming.graph_name()
    }

    pub fn naming(&self) -> &CollectionNaming {
        &self.naming
    }

    /// On-database vertex collection names
    pub fn vertex_collections(&self) -> &[String] {
        &self.vertex_collections
    }

    /// On-database edge collection names
    pub fn edge_collections(&self) -> &[String] {
        &self.edge_collections
    }

    // Resolve labels, keeping only configured collections in configured order.
    fn restrict(&self, all: &[String], labels: &[String]) -> Vec<String> {
        if labels.is_empty() {
            return all.to_vec();
        }
        let wanted = self.naming.resolve_all(labels);
        all.iter().filter(|c| wanted.contains(c)).cloned().collect()
    }
}

/// One query, described before it is rendered
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    kind: QueryKind,
    start_vertex: Option<DocumentHandle>,
    direction: Direction,
    labels: Vec<String>,
    keys: Vec<String>,
    filter: PropertyFilter,
    limit: Option<u32>,
    count: bool,
}

impl QueryDescriptor {
    fn of(kind: QueryKind, start_vertex: Option<DocumentHandle>, direction: Direction) -> Self {
        Self {
            kind,
            start_vertex,
            direction,
            labels: Vec::new(),
            keys: Vec::new(),
            filter: PropertyFilter::new(),
            limit: None,
            count: false,
        }
    }

    pub fn vertices() -> Self {
        Self::of(QueryKind::Vertices, None, Direction::Both)
    }

    pub fn edges() -> Self {
        Self::of(QueryKind::Edges, None, Direction::Both)
    }

    /// Edges incident to `start`
    pub fn vertex_edges(start: DocumentHandle, direction: Direction) -> Self {
        Self::of(QueryKind::Edges, Some(start), direction)
    }

    /// Vertices one edge away from `start`
    pub fn vertex_neighbors(start: DocumentHandle, direction: Direction) -> Self {
        Self::of(QueryKind::Neighbors, Some(start), direction)
    }

    /// Restrict by collection label
    ///
    /// For traversals the labels name edge collections.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn has(mut self, key: impl Into<String>, value: impl Into<PropertyValue>, comparator: Comparator) -> Self {
        self.filter.has(key, value, comparator);
        self
    }

    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Return the number of matches instead of the matches
    pub fn with_count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    pub fn start_vertex(&self) -> Option<&DocumentHandle> {
        self.start_vertex.as_ref()
    }

    pub fn render(&self, ctx: &QueryContext) -> RenderedQuery {
        let mut qb = QueryBuilder::new();
        match (self.kind, &self.start_vertex) {
            (QueryKind::Vertices, _) | (QueryKind::Neighbors, None) => {
                let collections = ctx.restrict(ctx.vertex_collections(), &self.labels);
                self.open_count(&mut qb);
                qb.union(&collections, VERTEX_VAR)
                    .filter_keys(VERTEX_VAR, &self.keys)
                    .filter_properties(&self.filter, VERTEX_VAR);
                self.close(&mut qb, VERTEX_VAR);
            }
            (QueryKind::Edges, None) => {
                let collections = ctx.restrict(ctx.edge_collections(), &self.labels);
                self.open_count(&mut qb);
                qb.union(&collections, EDGE_VAR)
                    .filter_keys(EDGE_VAR, &self.keys)
                    .filter_properties(&self.filter, EDGE_VAR);
                self.close(&mut qb, EDGE_VAR);
            }
            (QueryKind::Edges, Some(start)) => {
                let labels = ctx.naming().resolve_all(&self.labels);
                qb.with(ctx.vertex_collections());
                self.open_count(&mut qb);
                qb.iterate_graph(
                    ctx.graph_name(),
                    VERTEX_VAR,
                    EDGE_VAR,
                    start,
                    self.direction,
                    TraversalOptions { bfs: true, unique_vertices_global: false },
                )
                .filter_keys(EDGE_VAR, &self.keys)
                .filter_same_collections(EDGE_VAR, &labels)
                .filter_properties(&self.filter, EDGE_VAR);
                self.close(&mut qb, &format!("DISTINCT {}", EDGE_VAR));
            }
            (QueryKind::Neighbors, Some(start)) => {
                let labels = ctx.naming().resolve_all(&self.labels);
                qb.with(ctx.vertex_collections());
                self.open_count(&mut qb);
                qb.iterate_graph(
                    ctx.graph_name(),
                    VERTEX_VAR,
                    EDGE_VAR,
                    start,
                    self.direction,
                    TraversalOptions { bfs: true, unique_vertices_global: true },
                )
                .filter_same_collections(EDGE_VAR, &labels)
                .filter_keys(VERTEX_VAR, &self.keys)
                .filter_properties(&self.filter, VERTEX_VAR);
                self.close(&mut qb, VERTEX_VAR);
            }
        }
        qb.build()
    }

    /// Render and run through `client`
    pub fn execute(
        &self,
        ctx: &QueryContext,
        client: &dyn DatabaseClient,
        options: &QueryOptions,
    ) -> GraphResult<Cursor> {
        let rendered = self.render(ctx);
        debug!(
            "Executing {:?} query: {} (bind vars: {:?})",
            self.kind,
            rendered.query,
            rendered.bind_vars.keys().collect::<Vec<_>>()
        );
        Ok(client.execute(&rendered.query, &rendered.bind_vars, options)?)
    }

    fn open_count(&self, qb: &mut QueryBuilder) {
        if self.count {
            qb.append("LET results = (");
        }
    }

    fn close(&self, qb: &mut QueryBuilder, ret: &str) {
        if let Some(limit) = self.limit {
            qb.limit(limit);
        }
        qb.ret(ret);
        if self.count {
            qb.append(")").ret("LENGTH(results)");
        }
    }
}
