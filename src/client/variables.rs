//! Graph variables
//!
//! Each graph has one metadata document, keyed by the graph name, in a
//! collection shared by all graphs. The session caches it in a single slot.
//! A cached copy is served until it is replaced or evicted; it is never
//! refreshed behind the caller's back.

use crate::error::{GraphError, GraphResult};
use crate::graph::codec::{KEY_FIELD, REV_FIELD};
use crate::graph::element::{DocumentMeta, ElementData};
use crate::graph::property::{PropertyMap, PropertyValue};
use serde_json::{Map, Value};
use std::sync::{Mutex, PoisonError};

/// Collection holding the variables documents, never prefixed
pub const VARIABLES_COLLECTION: &str = "graph_variables";

/// The metadata document of one graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphVariables {
    data: ElementData,
    values: PropertyMap,
}

impl GraphVariables {
    /// A fresh, unpaired document for `graph_name`
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            data: ElementData::with_key(VARIABLES_COLLECTION, graph_name),
            values: PropertyMap::new(),
        }
    }

    pub fn from_document(doc: &Value) -> GraphResult<Self> {
        let meta = DocumentMeta::from_document(doc)?;
        let Value::Object(fields) = doc else {
            return Err(GraphError::Codec("variables document is not an object".to_string()));
        };
        let values = fields
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .map(|(key, value)| (key.clone(), PropertyValue::from_json(value)))
            .collect();
        Ok(Self {
            data: ElementData::loaded(meta, VARIABLES_COLLECTION, VARIABLES_COLLECTION)?,
            values,
        })
    }

    /// Document body; carries `_rev` once paired so replaces are checked
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        if let Some(key) = self.data.key() {
            doc.insert(KEY_FIELD.to_string(), Value::String(key.to_string()));
        }
        if let Ok(revision) = self.data.revision() {
            doc.insert(REV_FIELD.to_string(), Value::String(revision.to_string()));
        }
        for (key, value) in &self.values {
            doc.insert(key.clone(), value.to_json());
        }
        Value::Object(doc)
    }

    /// Name of the graph the document belongs to
    pub fn graph_name(&self) -> &str {
        self.data.key().unwrap_or_default()
    }

    pub fn data(&self) -> &ElementData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    pub fn is_paired(&self) -> bool {
        self.data.is_paired()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.values.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Single-slot cache for the variables document
#[derive(Debug, Default)]
pub struct VariablesCache {
    slot: Mutex<Option<GraphVariables>>,
}

impl VariablesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached copy, loading it with `load` when the slot is empty
    ///
    /// The slot stays locked while `load` runs, so concurrent first callers
    /// trigger a single lookup. A failed load leaves the slot empty.
    pub fn get_or_try_insert_with<F>(&self, load: F) -> GraphResult<GraphVariables>
    where
        F: FnOnce() -> GraphResult<GraphVariables>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref() {
            return Ok(cached.clone());
        }
        let loaded = load()?;
        *slot = Some(loaded.clone());
        Ok(loaded)
    }

    pub fn get(&self) -> Option<GraphVariables> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn put(&self, variables: GraphVariables) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(variables);
    }

    /// Evict the cached copy, returning it
    pub fn invalidate(&self) -> Option<GraphVariables> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
