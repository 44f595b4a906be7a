//! Schema check between configuration and a registered graph
//!
//! Run once when a session pairs with an existing graph. All names compared
//! here are on-database names.

use super::edge_definition::{EdgeDefinition, GraphDefinition};
use crate::error::{GraphError, GraphResult};
use std::collections::BTreeSet;
use tracing::debug;

pub struct SchemaValidator<'a> {
    vertex_collections: &'a [String],
    orphan_collections: &'a [String],
    edge_definitions: &'a [EdgeDefinition],
}

impl<'a> SchemaValidator<'a> {
    pub fn new(
        vertex_collections: &'a [String],
        orphan_collections: &'a [String],
        edge_definitions: &'a [EdgeDefinition],
    ) -> Self {
        Self {
            vertex_collections,
            orphan_collections,
            edge_definitions,
        }
    }

    /// Fail on the first difference between configuration and `live`
    pub fn validate(&self, live: &GraphDefinition) -> GraphResult<()> {
        self.validate_vertex_collections(live)?;
        self.validate_edge_definitions(live)?;
        debug!("Graph {} matches configured schema", live.name);
        Ok(())
    }

    fn validate_vertex_collections(&self, live: &GraphDefinition) -> GraphResult<()> {
        let configured: BTreeSet<String> = self
            .vertex_collections
            .iter()
            .chain(self.orphan_collections)
            .cloned()
            .collect();
        let existing = live.vertex_collections();

        if let Some(missing) = configured.difference(&existing).next() {
            return Err(GraphError::MissingVertexCollection(missing.clone()));
        }
        if let Some(surplus) = existing.difference(&configured).next() {
            return Err(GraphError::SurplusVertexCollection(surplus.clone()));
        }
        Ok(())
    }

    fn validate_edge_definitions(&self, live: &GraphDefinition) -> GraphResult<()> {
        for existing in &live.edge_definitions {
            let configured = self
                .edge_definitions
                .iter()
                .find(|d| d.collection == existing.collection)
                .ok_or_else(|| GraphError::MissingEdgeDefinition(existing.collection.clone()))?;
            if configured.from != existing.from || configured.to != existing.to {
                return Err(GraphError::IncompatibleEdgeDefinition {
                    collection: existing.collection.clone(),
                    expected: configured.to_string(),
                    found: existing.to_string(),
                });
            }
        }
        if let Some(surplus) = self
            .edge_definitions
            .iter()
            .find(|d| live.edge_definition(&d.collection).is_none())
        {
            return Err(GraphError::SurplusEdgeDefinition(surplus.collection.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn live(defs: Vec<EdgeDefinition>, orphans: &[&str]) -> GraphDefinition {
        GraphDefinition {
            name: "g".to_string(),
            edge_definitions: defs,
            orphan_collections: names(orphans),
        }
    }

    #[test]
    fn test_matching_schema() {
        let vertices = names(&["person", "software"]);
        let defs = vec![EdgeDefinition::new("knows", ["person"], ["person"])];
        let validator = SchemaValidator::new(&vertices, &[], &defs);
        let existing = live(vec![EdgeDefinition::new("knows", ["person"], ["person"])], &["software"]);
        assert!(validator.validate(&existing).is_ok());
    }

    #[test]
    fn test_from_to_order_independent() {
        let vertices = names(&["a", "b"]);
        let defs = vec![EdgeDefinition::new("e", ["a", "b"], ["b", "a"])];
        let validator = SchemaValidator::new(&vertices, &[], &defs);
        let existing = live(vec![EdgeDefinition::new("e", ["b", "a"], ["a", "b"])], &[]);
        assert!(validator.validate(&existing).is_ok());
    }

    #[test]
    fn test_incompatible_definition() {
        let vertices = names(&["a", "b"]);
        let defs = vec![EdgeDefinition::new("e", ["a"], ["b"])];
        let validator = SchemaValidator::new(&vertices, &[], &defs);
        let existing = live(vec![EdgeDefinition::new("e", ["a", "b"], ["b"])], &[]);
        match validator.validate(&existing) {
            Err(GraphError::IncompatibleEdgeDefinition { collection, expected, found }) => {
                assert_eq!(collection, "e");
                assert_eq!(expected, "e:a->b");
                assert_eq!(found, "e:a,b->b");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_orphans_count_as_configured() {
        let vertices = names(&["a"]);
        let orphans = names(&["tag"]);
        let defs = vec![EdgeDefinition::new("e", ["a"], ["a"])];
        let validator = SchemaValidator::new(&vertices, &orphans, &defs);
        let existing = live(vec![EdgeDefinition::new("e", ["a"], ["a"])], &["tag"]);
        assert!(validator.validate(&existing).is_ok());
    }
}
