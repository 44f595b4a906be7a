//! AQL text accumulator
//!
//! A [`QueryBuilder`] is used for exactly one query. Collections are never
//! interpolated: each one is bound as `@@colN`, where `N` comes from a counter
//! owned by the builder instance, so nested or repeated iterations cannot
//! collide. Value parameters the builder generates itself are numbered the
//! same way, one counter per name prefix (`keys0`, `startId0`, `label1`,
//! `property2`). Every placeholder written has a binding by the time the
//! query is taken out of the builder.

use super::filter::{PropertyFilter, PROPERTY_PREFIX};
use crate::graph::types::{Direction, DocumentHandle};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Bind variables of one query; collection parameters are keyed `@name`
pub type BindVars = IndexMap<String, Value>;

/// A finished query: text plus bind variables
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub query: String,
    pub bind_vars: BindVars,
}

impl fmt::Display for RenderedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

/// Traversal options rendered into `OPTIONS {...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraversalOptions {
    pub bfs: bool,
    pub unique_vertices_global: bool,
}

impl TraversalOptions {
    fn render(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.bfs {
            parts.push("bfs: true");
        }
        if self.unique_vertices_global {
            parts.push("uniqueVertices: 'global'");
        }
        if parts.is_empty() {
            None
        } else {
            Some(format!("{{{}}}", parts.join(", ")))
        }
    }
}

#[derive(Debug, Default)]
pub struct QueryBuilder {
    query: String,
    bind_vars: BindVars,
    collection_cnt: usize,
    value_cnt: HashMap<String, usize>,
    filter_open: bool,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a collection name, returning its `@@colN` placeholder
    pub fn bind_collection(&mut self, collection: &str) -> String {
        let name = format!("col{}", self.collection_cnt);
        self.collection_cnt += 1;
        self.bind_vars
            .insert(format!("@{}", name), Value::String(collection.to_string()));
        format!("@@{}", name)
    }

    /// Bind a value under a fixed name, returning its `@name` placeholder
    ///
    /// A name already bound in this query is never overwritten; the value is
    /// numbered instead.
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> String {
        if self.bind_vars.contains_key(name) {
            return self.bind_numbered(name, value);
        }
        self.bind_vars.insert(name.to_string(), value.into());
        format!("@{}", name)
    }

    /// Bind a value under `<prefix>N`, returning its placeholder
    pub fn bind_numbered(&mut self, prefix: &str, value: impl Into<Value>) -> String {
        let name = loop {
            let candidate = format!("{}{}", prefix, self.reserve(prefix, 1));
            if !self.bind_vars.contains_key(&candidate) {
                break candidate;
            }
        };
        self.bind_vars.insert(name.clone(), value.into());
        format!("@{}", name)
    }

    /// Take `count` consecutive numbers from the counter of `prefix`
    fn reserve(&mut self, prefix: &str, count: usize) -> usize {
        let next = self.value_cnt.entry(prefix.to_string()).or_insert(0);
        let first = *next;
        *next += count;
        first
    }

    /// `WITH @@col0, @@col1, ...`
    pub fn with(&mut self, collections: &[String]) -> &mut Self {
        if collections.is_empty() {
            return self;
        }
        let names: Vec<String> = collections.iter().map(|c| self.bind_collection(c)).collect();
        self.line(format!("WITH {}", names.join(", ")))
    }

    /// `FOR var IN UNION((FOR x IN @@colA RETURN x), ...)`
    ///
    /// With fewer than two collections this degrades to a plain iteration.
    pub fn union(&mut self, collections: &[String], loop_var: &str) -> &mut Self {
        match collections {
            [] => self.line(format!("FOR {} IN []", loop_var)),
            [only] => self.iterate_collection(loop_var, only),
            many => {
                let branches: Vec<String> = many
                    .iter()
                    .map(|c| format!("  (FOR x IN {} RETURN x)", self.bind_collection(c)))
                    .collect();
                self.line(format!("FOR {} IN UNION(\n{}\n)", loop_var, branches.join(",\n")))
            }
        }
    }

    /// `FOR var IN @@colN`
    pub fn iterate_collection(&mut self, loop_var: &str, collection: &str) -> &mut Self {
        let placeholder = self.bind_collection(collection);
        self.line(format!("FOR {} IN {}", loop_var, placeholder))
    }

    /// Look documents up by handle, dropping handles that resolve to nothing
    pub fn documents_by_id(&mut self, ids: &[DocumentHandle], loop_var: &str) -> &mut Self {
        let handles: Vec<Value> = ids.iter().map(|id| Value::String(id.to_string())).collect();
        let placeholder = self.bind_numbered("ids", handles);
        self.line(format!("FOR {} IN DOCUMENT({})", loop_var, placeholder));
        self.filter(&format!("{} != null", loop_var))
    }

    /// Depth-1 traversal over the named graph
    pub fn iterate_graph(
        &mut self,
        graph_name: &str,
        vertex_var: &str,
        edge_var: &str,
        start: &DocumentHandle,
        direction: Direction,
        options: TraversalOptions,
    ) -> &mut Self {
        let start_ph = self.bind_numbered("startId", start.to_string());
        let graph_ph = self.bind_numbered("graphName", graph_name);
        let mut clause = format!(
            "FOR {}, {} IN {} {} GRAPH {}",
            vertex_var,
            edge_var,
            direction.aql_keyword(),
            start_ph,
            graph_ph
        );
        if let Some(rendered) = options.render() {
            clause.push_str(" OPTIONS ");
            clause.push_str(&rendered);
        }
        self.line(clause)
    }

    /// Open a FILTER, or extend the open one with AND
    pub fn filter(&mut self, condition: &str) -> &mut Self {
        let keyword = if self.filter_open { "  AND" } else { "FILTER" };
        self.query.push_str(&format!("{} {}\n", keyword, condition));
        self.filter_open = true;
        self
    }

    /// `var._key IN @keysN`
    pub fn filter_keys(&mut self, var: &str, keys: &[String]) -> &mut Self {
        if keys.is_empty() {
            return self;
        }
        let placeholder = self.bind_numbered("keys", keys.to_vec());
        self.filter(&format!("{}._key IN {}", var, placeholder))
    }

    /// Disjunction of `IS_SAME_COLLECTION` terms, one per collection
    pub fn filter_same_collections(&mut self, var: &str, collections: &[String]) -> &mut Self {
        if collections.is_empty() {
            return self;
        }
        let terms: Vec<String> = collections
            .iter()
            .map(|c| {
                let placeholder = self.bind_numbered("label", c.as_str());
                format!("IS_SAME_COLLECTION({}, {})", placeholder, var)
            })
            .collect();
        self.filter(&format!("({})", terms.join(" OR ")))
    }

    /// Property predicates on `prefix`, joined by AND
    pub fn filter_properties(&mut self, filter: &PropertyFilter, prefix: &str) -> &mut Self {
        let mut clauses = Vec::new();
        let first = self.reserve(PROPERTY_PREFIX, filter.len());
        filter.render(prefix, first, &mut clauses, &mut self.bind_vars);
        if clauses.is_empty() {
            return self;
        }
        self.filter(&clauses.join(" AND "))
    }

    pub fn limit(&mut self, limit: u32) -> &mut Self {
        self.line(format!("LIMIT {}", limit))
    }

    pub fn ret(&mut self, expr: &str) -> &mut Self {
        self.line(format!("RETURN {}", expr))
    }

    /// Raw text; bindings it needs must be added with [`QueryBuilder::bind`]
    pub fn append(&mut self, raw: &str) -> &mut Self {
        self.line(raw.to_string())
    }

    pub fn bind_vars(&self) -> &BindVars {
        &self.bind_vars
    }

    pub fn build(self) -> RenderedQuery {
        RenderedQuery {
            query: self.query.trim_end().to_string(),
            bind_vars: self.bind_vars,
        }
    }

    fn line(&mut self, text: String) -> &mut Self {
        self.query.push_str(&text);
        self.query.push('\n');
        self.filter_open = false;
        self
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::PropertyValue;
    use crate::query::filter::Comparator;
    use serde_json::json;

    #[test]
    fn test_iterate_counter_is_per_instance() {
        let mut qb = QueryBuilder::new();
        qb.iterate_collection("a", "g_person").iterate_collection("b", "g_software");
        let q = qb.build();
        assert_eq!(q.query, "FOR a IN @@col0\nFOR b IN @@col1");
        assert_eq!(q.bind_vars["@col0"], json!("g_person"));
        assert_eq!(q.bind_vars["@col1"], json!("g_software"));

        // A fresh builder starts over.
        let mut other = QueryBuilder::new();
        other.iterate_collection("a", "g_person");
        assert!(other.to_string().contains("@@col0"));
    }

    #[test]
    fn test_with_and_union() {
        let mut qb = QueryBuilder::new();
        let cols = vec!["g_a".to_string(), "g_b".to_string()];
        qb.with(&cols).union(&cols, "v").ret("v");
        let q = qb.build();
        assert_eq!(
            q.query,
            "WITH @@col0, @@col1\nFOR v IN UNION(\n  (FOR x IN @@col2 RETURN x),\n  (FOR x IN @@col3 RETURN x)\n)\nRETURN v"
        );
        assert_eq!(q.bind_vars.len(), 4);
    }

    #[test]
    fn test_union_of_one_is_plain_iteration() {
        let mut qb = QueryBuilder::new();
        qb.union(&["g_a".to_string()], "v");
        assert_eq!(qb.to_string(), "FOR v IN @@col0");
    }

    #[test]
    fn test_filter_keyword_tracking() {
        let mut qb = QueryBuilder::new();
        qb.iterate_collection("v", "g_a")
            .filter("v.x == 1")
            .filter("v.y == 2")
            .limit(3)
            .ret("v");
        assert_eq!(
            qb.build().query,
            "FOR v IN @@col0\nFILTER v.x == 1\n  AND v.y == 2\nLIMIT 3\nRETURN v"
        );
    }

    #[test]
    fn test_documents_by_id() {
        let mut qb = QueryBuilder::new();
        qb.documents_by_id(&[DocumentHandle::new("g_a/1"), DocumentHandle::new("g_a/2")], "d")
            .ret("d");
        let q = qb.build();
        assert_eq!(q.query, "FOR d IN DOCUMENT(@ids0)\nFILTER d != null\nRETURN d");
        assert_eq!(q.bind_vars["ids0"], json!(["g_a/1", "g_a/2"]));
    }

    #[test]
    fn test_iterate_graph_options() {
        let mut qb = QueryBuilder::new();
        qb.iterate_graph(
            "modern",
            "v",
            "e",
            &DocumentHandle::new("modern_person/marko"),
            Direction::In,
            TraversalOptions { bfs: true, unique_vertices_global: true },
        );
        let q = qb.build();
        assert_eq!(
            q.query,
            "FOR v, e IN INBOUND @startId0 GRAPH @graphName0 OPTIONS {bfs: true, uniqueVertices: 'global'}"
        );
        assert_eq!(q.bind_vars["startId0"], json!("modern_person/marko"));
        assert_eq!(q.bind_vars["graphName0"], json!("modern"));
    }

    #[test]
    fn test_same_collection_disjunction() {
        let mut qb = QueryBuilder::new();
        qb.filter_keys("e", &["1".to_string()])
            .filter_same_collections("e", &["g_knows".to_string(), "g_created".to_string()]);
        let q = qb.build();
        assert_eq!(
            q.query,
            "FILTER e._key IN @keys0\n  AND (IS_SAME_COLLECTION(@label0, e) OR IS_SAME_COLLECTION(@label1, e))"
        );
        assert_eq!(q.bind_vars["label1"], json!("g_created"));
    }

    #[test]
    fn test_nested_key_filters_do_not_collide() {
        let mut qb = QueryBuilder::new();
        qb.iterate_collection("a", "g_person")
            .filter_keys("a", &["1".to_string()])
            .iterate_collection("b", "g_person")
            .filter_keys("b", &["2".to_string()])
            .ret("[a, b]");
        let q = qb.build();
        assert_eq!(
            q.query,
            "FOR a IN @@col0\nFILTER a._key IN @keys0\nFOR b IN @@col1\nFILTER b._key IN @keys1\nRETURN [a, b]"
        );
        assert_eq!(q.bind_vars["keys0"], json!(["1"]));
        assert_eq!(q.bind_vars["keys1"], json!(["2"]));
    }

    #[test]
    fn test_property_filters_share_one_counter() {
        let mut first = PropertyFilter::new();
        first.has("age", 29, Comparator::Equal);
        let mut second = PropertyFilter::new();
        second
            .has("age", 30, Comparator::Equal)
            .has("k", PropertyValue::Array(vec![1.into(), 2.into()]), Comparator::In);

        let mut qb = QueryBuilder::new();
        qb.iterate_collection("a", "g_person")
            .filter_properties(&first, "a")
            .iterate_collection("b", "g_person")
            .filter_properties(&second, "b");
        let q = qb.build();
        assert!(q.query.contains("FILTER a.`age` == @property0\n"));
        assert!(q.query.contains("FILTER b.`age` == @property1 AND b.`k` IN [@property2_0, @property2_1]"));
        assert_eq!(q.bind_vars["property0"], json!(29));
        assert_eq!(q.bind_vars["property1"], json!(30));
        assert_eq!(q.bind_vars["property2_1"], json!(2));
    }

    #[test]
    fn test_fixed_name_is_never_overwritten() {
        let mut qb = QueryBuilder::new();
        assert_eq!(qb.bind("key", "a"), "@key");
        assert_eq!(qb.bind("key", "b"), "@key0");
        assert_eq!(qb.bind_vars()["key"], json!("a"));
        assert_eq!(qb.bind_vars()["key0"], json!("b"));

        let mut traversal = QueryBuilder::new();
        let start = DocumentHandle::new("g_a/1");
        traversal
            .iterate_graph("g", "v", "e", &start, Direction::Out, TraversalOptions::default())
            .iterate_graph("g", "w", "f", &start, Direction::In, TraversalOptions::default());
        let q = traversal.build();
        assert!(q.query.ends_with("FOR w, f IN INBOUND @startId1 GRAPH @graphName1"));
        assert_eq!(q.bind_vars.len(), 4);
    }
}
