//! Edge definitions and the relation grammar
//!
//! A relation is written `label:from1,from2->to1,to2`. Graphs configured
//! without relations get the full mesh: every edge collection may connect
//! any vertex collection to any other.

use crate::client::naming::CollectionNaming;
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which vertex collections an edge collection may connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: BTreeSet<String>,
    pub to: BTreeSet<String>,
}

impl EdgeDefinition {
    pub fn new<I, J>(collection: impl Into<String>, from: I, to: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        Self {
            collection: collection.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `label:from1,from2->to1,to2`
    pub fn parse_relation(text: &str) -> GraphResult<Self> {
        let malformed = || GraphError::MalformedRelation(text.to_string());

        let parts: Vec<&str> = text.split(':').collect();
        let [label, flow] = parts.as_slice() else {
            return Err(malformed());
        };
        let sides: Vec<&str> = flow.split("->").collect();
        let [from, to] = sides.as_slice() else {
            return Err(malformed());
        };

        let label = label.trim();
        let from = split_list(from).ok_or_else(malformed)?;
        let to = split_list(to).ok_or_else(malformed)?;
        if label.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(label, from, to))
    }

    /// Full mesh: one definition per edge collection over all vertex collections
    pub fn build_default(vertex_collections: &[String], edge_collections: &[String]) -> Vec<Self> {
        edge_collections
            .iter()
            .map(|edge| Self::new(edge.as_str(), vertex_collections, vertex_collections))
            .collect()
    }

    /// Edge definitions for a configuration: parsed relations, or the full mesh
    ///
    /// Every collection a relation names must be configured.
    pub fn resolve(
        relations: &[String],
        vertex_collections: &[String],
        edge_collections: &[String],
    ) -> GraphResult<Vec<Self>> {
        if relations.is_empty() {
            return Ok(Self::build_default(vertex_collections, edge_collections));
        }
        let mut definitions: Vec<Self> = Vec::with_capacity(relations.len());
        for relation in relations {
            let definition = Self::parse_relation(relation)?;
            let unknown = |collection: &str| GraphError::UnknownCollection {
                relation: relation.clone(),
                collection: collection.to_string(),
            };
            if !edge_collections.contains(&definition.collection) {
                return Err(unknown(&definition.collection));
            }
            if let Some(missing) = definition
                .from
                .iter()
                .chain(definition.to.iter())
                .find(|c| !vertex_collections.contains(c))
            {
                return Err(unknown(missing));
            }
            // Two relations on one edge collection widen a single definition.
            match definitions.iter_mut().find(|d| d.collection == definition.collection) {
                Some(existing) => {
                    existing.from.extend(definition.from);
                    existing.to.extend(definition.to);
                }
                None => definitions.push(definition),
            }
        }
        Ok(definitions)
    }

    /// The same definition with on-database collection names
    pub fn to_database(&self, naming: &CollectionNaming) -> Self {
        Self {
            collection: naming.resolve(&self.collection),
            from: self.from.iter().map(|c| naming.resolve(c)).collect(),
            to: self.to.iter().map(|c| naming.resolve(c)).collect(),
        }
    }

    /// Vertex collections on either side
    pub fn vertex_collections(&self) -> impl Iterator<Item = &String> {
        self.from.iter().chain(self.to.iter())
    }
}

impl fmt::Display for EdgeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
        write!(f, "{}:{}->{}", self.collection, join(&self.from), join(&self.to))
    }
}

fn split_list(text: &str) -> Option<Vec<String>> {
    let items: Vec<String> = text.split(',').map(|s| s.trim().to_string()).collect();
    if items.iter().any(String::is_empty) {
        return None;
    }
    Some(items)
}

/// A named graph as registered in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDefinition {
    #[serde(alias = "_key")]
    pub name: String,
    #[serde(rename = "edgeDefinitions", default)]
    pub edge_definitions: Vec<EdgeDefinition>,
    #[serde(rename = "orphanCollections", default)]
    pub orphan_collections: Vec<String>,
}

impl GraphDefinition {
    /// Graph over the given collections; vertex collections no edge
    /// definition mentions are registered as orphans
    pub fn new(
        name: impl Into<String>,
        edge_definitions: Vec<EdgeDefinition>,
        vertex_collections: &[String],
        orphan_collections: &[String],
    ) -> Self {
        let connected: BTreeSet<&String> = edge_definitions
            .iter()
            .flat_map(EdgeDefinition::vertex_collections)
            .collect();
        let mut orphans: Vec<String> = Vec::new();
        for collection in vertex_collections.iter().chain(orphan_collections) {
            if !connected.contains(collection) && !orphans.contains(collection) {
                orphans.push(collection.clone());
            }
        }
        Self {
            name: name.into(),
            edge_definitions,
            orphan_collections: orphans,
        }
    }

    /// Every vertex collection the graph knows about
    pub fn vertex_collections(&self) -> BTreeSet<String> {
        self.edge_definitions
            .iter()
            .flat_map(EdgeDefinition::vertex_collections)
            .chain(self.orphan_collections.iter())
            .cloned()
            .collect()
    }

    pub fn edge_definition(&self, collection: &str) -> Option<&EdgeDefinition> {
        self.edge_definitions.iter().find(|d| d.collection == collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_relation() {
        let def = EdgeDefinition::parse_relation("knows:person->person").unwrap();
        assert_eq!(def, EdgeDefinition::new("knows", ["person"], ["person"]));

        let def = EdgeDefinition::parse_relation(" created : person , robot -> software ").unwrap();
        assert_eq!(def.collection, "created");
        assert_eq!(def.from, BTreeSet::from(["person".to_string(), "robot".to_string()]));
        assert_eq!(def.to, BTreeSet::from(["software".to_string()]));
    }

    #[test]
    fn test_parse_relation_malformed() {
        for text in ["bad", "a:b", "a:b->c->d", "a:b:c->d", ":b->c", "a:b,->c", "a:->c"] {
            match EdgeDefinition::parse_relation(text) {
                Err(GraphError::MalformedRelation(t)) => assert_eq!(t, text),
                other => panic!("{} parsed as {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_default_mesh() {
        let defs = EdgeDefinition::build_default(&names(&["A", "B"]), &names(&["E"]));
        assert_eq!(defs, vec![EdgeDefinition::new("E", ["A", "B"], ["A", "B"])]);
    }

    #[test]
    fn test_resolve_checks_collections() {
        let vertices = names(&["person", "software"]);
        let edges = names(&["knows", "created"]);

        let defs = EdgeDefinition::resolve(
            &names(&["knows:person->person", "created:person->software"]),
            &vertices,
            &edges,
        )
        .unwrap();
        assert_eq!(defs.len(), 2);

        let err = EdgeDefinition::resolve(&names(&["likes:person->person"]), &vertices, &edges).unwrap_err();
        assert!(matches!(err, GraphError::UnknownCollection { ref collection, .. } if collection == "likes"));

        let err = EdgeDefinition::resolve(&names(&["knows:person->robot"]), &vertices, &edges).unwrap_err();
        assert!(matches!(err, GraphError::UnknownCollection { ref collection, .. } if collection == "robot"));
    }

    #[test]
    fn test_resolve_merges_relations_on_one_collection() {
        let defs = EdgeDefinition::resolve(
            &names(&["knows:a->b", "knows:b->a"]),
            &names(&["a", "b"]),
            &names(&["knows"]),
        )
        .unwrap();
        assert_eq!(defs, vec![EdgeDefinition::new("knows", ["a", "b"], ["a", "b"])]);
    }

    #[test]
    fn test_to_database_and_display() {
        let naming = CollectionNaming::new("modern", true);
        let def = EdgeDefinition::new("knows", ["person"], ["person", "robot"]).to_database(&naming);
        assert_eq!(def.to_string(), "modern_knows:modern_person->modern_person,modern_robot");
    }

    #[test]
    fn test_graph_definition_document() {
        let doc = json!({
            "_key": "modern",
            "_id": "_graphs/modern",
            "edgeDefinitions": [{"collection": "knows", "from": ["person"], "to": ["person"]}],
            "orphanCollections": ["software"]
        });
        let graph: GraphDefinition = serde_json::from_value(doc).unwrap();
        assert_eq!(graph.name, "modern");
        assert_eq!(
            graph.vertex_collections(),
            BTreeSet::from(["person".to_string(), "software".to_string()])
        );
        assert!(graph.edge_definition("knows").is_some());
    }

    #[test]
    fn test_graph_definition_orphans() {
        let defs = vec![EdgeDefinition::new("knows", ["person"], ["person"])];
        let graph = GraphDefinition::new("g", defs, &names(&["person", "software"]), &names(&["tag"]));
        assert_eq!(graph.orphan_collections, names(&["software", "tag"]));
    }
}
