//! Vertex implementation for the property graph
//!
//! A vertex is an [`ElementData`] (its document identity) plus a
//! [`PropertyManager`] holding cardinality-typed properties.

use super::element::{DocumentMeta, ElementData, ElementRef};
use super::manager::{ElementProperty, PropertyManager};
use super::property::PropertyValue;
use super::types::{Cardinality, DocumentHandle, ElementKind};
use crate::error::GraphResult;

/// A vertex in the property graph
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    data: ElementData,
    properties: PropertyManager,
}

impl Vertex {
    /// Create an unpaired vertex whose key the server will assign
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            data: ElementData::new(label),
            properties: PropertyManager::new(),
        }
    }

    /// Create an unpaired vertex with a client-chosen key
    pub fn with_key(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            data: ElementData::with_key(label, key),
            properties: PropertyManager::new(),
        }
    }

    /// Assemble a vertex from decoded parts
    pub fn from_parts(data: ElementData, properties: PropertyManager) -> Self {
        let mut vertex = Self { data, properties };
        let owner = vertex.element_ref();
        vertex.properties.rebind_owner(&owner);
        vertex
    }

    /// Label (collection name without any database prefix)
    pub fn label(&self) -> String {
        self.data.collection().unwrap_or_default()
    }

    pub fn key(&self) -> Option<&str> {
        self.data.key()
    }

    pub fn handle(&self) -> GraphResult<&DocumentHandle> {
        self.data.handle()
    }

    pub fn revision(&self) -> GraphResult<&str> {
        self.data.revision()
    }

    pub fn is_paired(&self) -> bool {
        self.data.is_paired()
    }

    pub fn data(&self) -> &ElementData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    /// Record the identity the server assigned on insert into `collection`
    pub fn pair(&mut self, meta: DocumentMeta, collection: &str) -> GraphResult<()> {
        self.data.pair(meta, collection)?;
        let owner = self.element_ref();
        self.properties.rebind_owner(&owner);
        Ok(())
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef::of(ElementKind::Vertex, &self.data)
    }

    /// Set a single-cardinality property
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> &ElementProperty {
        self.add_property(key, value, Cardinality::Single)
    }

    /// Add a property value with an explicit cardinality
    pub fn add_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> &ElementProperty {
        let owner = self.element_ref();
        self.properties.add(&owner, key, value, cardinality)
    }

    /// The single value of `key`
    pub fn value(&self, key: &str) -> GraphResult<Option<&PropertyValue>> {
        self.properties.value(key)
    }

    /// Every value of `key`
    pub fn values(&self, key: &str) -> Vec<&PropertyValue> {
        self.properties.values(key)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn remove_property(&mut self, key: &str) -> Vec<ElementProperty> {
        self.properties.remove(key)
    }

    pub fn properties(&self) -> &PropertyManager {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyManager {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    #[test]
    fn test_create_vertex() {
        let vertex = Vertex::with_key("person", "marko");
        assert_eq!(vertex.label(), "person");
        assert_eq!(vertex.key(), Some("marko"));
        assert!(!vertex.is_paired());
        assert!(matches!(vertex.handle(), Err(GraphError::ElementNotPaired(_))));
    }

    #[test]
    fn test_vertex_properties() {
        let mut vertex = Vertex::new("person");
        vertex.set_property("name", "marko");
        vertex.set_property("age", 29);
        vertex.add_property("location", "santa fe", Cardinality::List);
        vertex.add_property("location", "brussels", Cardinality::List);

        assert_eq!(vertex.value("name").unwrap().and_then(|v| v.as_string()), Some("marko"));
        assert_eq!(vertex.value("age").unwrap().and_then(|v| v.as_integer()), Some(29));
        assert_eq!(vertex.values("location").len(), 2);
        assert!(vertex.value("location").is_err());

        let removed = vertex.remove_property("age");
        assert_eq!(removed.len(), 1);
        assert!(!vertex.has_property("age"));
    }

    #[test]
    fn test_pair_rebinds_property_owner() {
        let mut vertex = Vertex::new("person");
        vertex.set_property("name", "vadas");
        vertex
            .pair(DocumentMeta::new("modern_person/1234", "1234", "r1"), "modern_person")
            .unwrap();

        let prop = &vertex.properties().properties("name")[0];
        assert_eq!(prop.owner().and_then(|o| o.key.as_deref()), Some("1234"));
        assert_eq!(vertex.handle().unwrap().as_str(), "modern_person/1234");
    }
}
