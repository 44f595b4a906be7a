//! Mapping between configured collection labels and on-database names
//!
//! With prefixing enabled, label `person` of graph `modern` lives in the
//! database collection `modern_person`. Queries always use the on-database
//! name; elements read back carry the label.

use crate::graph::types::DocumentHandle;

/// Separator between the graph name and the label
pub const PREFIX_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNaming {
    graph_name: String,
    prefix: bool,
}

impl CollectionNaming {
    pub fn new(graph_name: impl Into<String>, prefix: bool) -> Self {
        Self {
            graph_name: graph_name.into(),
            prefix,
        }
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    pub fn is_prefixed(&self) -> bool {
        self.prefix
    }

    /// On-database name for a label
    pub fn resolve(&self, label: &str) -> String {
        if self.prefix {
            format!("{}{}{}", self.graph_name, PREFIX_SEPARATOR, label)
        } else {
            label.to_string()
        }
    }

    pub fn resolve_all<'a>(&self, labels: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        labels.into_iter().map(|label| self.resolve(label)).collect()
    }

    /// Label for an on-database name. Names outside this graph's prefix
    /// come back unchanged, so they never resolve to the same collection.
    pub fn unresolve(&self, name: &str) -> String {
        if !self.prefix {
            return name.to_string();
        }
        let own_prefix = format!("{}{}", self.graph_name, PREFIX_SEPARATOR);
        match name.strip_prefix(&own_prefix) {
            Some(label) => label.to_string(),
            None => name.to_string(),
        }
    }

    /// Label of the collection a document handle points into
    pub fn label_from_handle(&self, handle: &DocumentHandle) -> String {
        self.unresolve(handle.collection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_names() {
        let naming = CollectionNaming::new("modern", true);
        assert_eq!(naming.resolve("person"), "modern_person");
        assert_eq!(naming.unresolve("modern_person"), "person");
        assert_eq!(
            naming.label_from_handle(&DocumentHandle::new("modern_person/marko")),
            "person"
        );
    }

    #[test]
    fn test_graph_name_with_separator() {
        let naming = CollectionNaming::new("my_graph", true);
        assert_eq!(naming.resolve("person"), "my_graph_person");
        assert_eq!(naming.unresolve("my_graph_person"), "person");
        assert_eq!(naming.unresolve(&naming.unresolve("my_graph_person")), "person");
    }

    #[test]
    fn test_foreign_prefix_is_kept() {
        let naming = CollectionNaming::new("modern", true);
        assert_eq!(naming.unresolve("othergraph_person"), "othergraph_person");
        assert_ne!(naming.resolve(&naming.unresolve("othergraph_person")), "othergraph_person");
    }

    #[test]
    fn test_unprefixed_names() {
        let naming = CollectionNaming::new("modern", false);
        assert_eq!(naming.resolve("software_house"), "software_house");
        assert_eq!(naming.unresolve("software_house"), "software_house");
        assert_eq!(
            naming.label_from_handle(&DocumentHandle::new("software_house/1")),
            "software_house"
        );
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(naming.resolve_all(&labels), vec!["a", "b"]);
    }
}
