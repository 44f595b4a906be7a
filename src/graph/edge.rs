//! Edge implementation for the property graph
//!
//! Edges address their endpoints by document handle (`_from` / `_to`). The
//! endpoint keys are kept as well because callers look vertices up by key.

use super::element::{DocumentMeta, ElementData, ElementRef};
use super::manager::ElementProperty;
use super::property::PropertyValue;
use super::types::{DocumentHandle, ElementKind};
use super::vertex::Vertex;
use crate::error::{GraphError, GraphResult};
use indexmap::IndexMap;

/// A directed edge in the property graph
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    data: ElementData,

    /// Source vertex handle (edge goes FROM this vertex)
    from: DocumentHandle,

    /// Target vertex handle (edge goes TO this vertex)
    to: DocumentHandle,

    from_key: String,
    to_key: String,

    properties: IndexMap<String, ElementProperty>,
}

impl Edge {
    /// Create an unpaired edge between two paired vertices
    pub fn new(label: impl Into<String>, from: &Vertex, to: &Vertex) -> GraphResult<Self> {
        Self::between(label, from.handle()?.clone(), to.handle()?.clone())
    }

    /// Create an unpaired edge between two vertex handles
    pub fn between(label: impl Into<String>, from: DocumentHandle, to: DocumentHandle) -> GraphResult<Self> {
        Self::assemble(ElementData::new(label), from, to)
    }

    /// Create an unpaired edge with a client-chosen key
    pub fn with_key(
        label: impl Into<String>,
        key: impl Into<String>,
        from: DocumentHandle,
        to: DocumentHandle,
    ) -> GraphResult<Self> {
        Self::assemble(ElementData::with_key(label, key), from, to)
    }

    /// Assemble an edge from decoded parts
    pub fn assemble(data: ElementData, from: DocumentHandle, to: DocumentHandle) -> GraphResult<Self> {
        let endpoint_key = |handle: &DocumentHandle| {
            handle
                .key()
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .ok_or_else(|| GraphError::Codec(format!("invalid vertex handle: {}", handle)))
        };
        Ok(Self {
            from_key: endpoint_key(&from)?,
            to_key: endpoint_key(&to)?,
            data,
            from,
            to,
            properties: IndexMap::new(),
        })
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

    pub fn from(&self) -> &DocumentHandle {
        &self.from
    }

    pub fn to(&self) -> &DocumentHandle {
        &self.to
    }

    pub fn from_key(&self) -> &str {
        &self.from_key
    }

    pub fn to_key(&self) -> &str {
        &self.to_key
    }

    /// Record the identity the server assigned on insert into `collection`
    pub fn pair(&mut self, meta: DocumentMeta, collection: &str) -> GraphResult<()> {
        self.data.pair(meta, collection)?;
        let owner = self.element_ref();
        for property in self.properties.values_mut() {
            property.set_owner(&owner);
        }
        Ok(())
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef::of(ElementKind::Edge, &self.data)
    }

    /// Set a property value, replacing any previous one
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        let property = ElementProperty::owned(&self.element_ref(), key.clone(), value);
        self.properties.insert(key, property);
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key).map(ElementProperty::value)
    }

    pub fn remove_property(&mut self, key: &str) -> Option<ElementProperty> {
        self.properties.shift_remove(key)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn properties(&self) -> impl Iterator<Item = &ElementProperty> {
        self.properties.values()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Whether this edge touches `vertex` at either end
    pub fn is_incident(&self, vertex: &DocumentHandle) -> bool {
        &self.from == vertex || &self.to == vertex
    }
}
