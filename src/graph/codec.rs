//! Document encoding for graph elements
//!
//! Each element kind has its own encode/decode function. The encoded document
//! carries a `_kind` discriminant that [`ElementCodec::decode`] dispatches on.
//! Property values go through an injected [`ValueCodec`].

use super::edge::Edge;
use super::element::{DocumentMeta, ElementData, ElementRef};
use super::manager::{ElementProperty, PropertyManager};
use super::property::PropertyValue;
use super::types::{DocumentHandle, ElementKind};
use super::vertex::Vertex;
use crate::client::naming::CollectionNaming;
use crate::error::{GraphError, GraphResult};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const KIND_FIELD: &str = "_kind";
pub const KEY_FIELD: &str = "_key";
pub const ID_FIELD: &str = "_id";
pub const REV_FIELD: &str = "_rev";
pub const FROM_FIELD: &str = "_from";
pub const TO_FIELD: &str = "_to";

/// Encode/decode capability for individual property values
pub trait ValueCodec: Send + Sync {
    fn encode(&self, value: &PropertyValue) -> GraphResult<Value>;
    fn decode(&self, value: &Value) -> GraphResult<PropertyValue>;
}

/// Plain JSON values with numeric narrowing on read
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValueCodec;

impl ValueCodec for JsonValueCodec {
    fn encode(&self, value: &PropertyValue) -> GraphResult<Value> {
        Ok(value.to_json())
    }

    fn decode(&self, value: &Value) -> GraphResult<PropertyValue> {
        Ok(PropertyValue::from_json(value))
    }
}

/// Any graph element, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
    Property(ElementProperty),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Vertex(_) => ElementKind::Vertex,
            Element::Edge(_) => ElementKind::Edge,
            Element::Property(_) => ElementKind::Property,
        }
    }

    pub fn data(&self) -> &ElementData {
        match self {
            Element::Vertex(v) => v.data(),
            Element::Edge(e) => e.data(),
            Element::Property(p) => p.data(),
        }
    }

    pub fn into_vertex(self) -> GraphResult<Vertex> {
        match self {
            Element::Vertex(v) => Ok(v),
            other => Err(GraphError::Codec(format!("expected vertex, got {}", other.kind()))),
        }
    }

    pub fn into_edge(self) -> GraphResult<Edge> {
        match self {
            Element::Edge(e) => Ok(e),
            other => Err(GraphError::Codec(format!("expected edge, got {}", other.kind()))),
        }
    }
}

/// Translates elements to and from database documents
#[derive(Clone)]
pub struct ElementCodec {
    values: Arc<dyn ValueCodec>,
}

impl Default for ElementCodec {
    fn default() -> Self {
        Self::new(Arc::new(JsonValueCodec))
    }
}

impl std::fmt::Debug for ElementCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementCodec").finish_non_exhaustive()
    }
}

impl ElementCodec {
    pub fn new(values: Arc<dyn ValueCodec>) -> Self {
        Self { values }
    }

    pub fn encode(&self, element: &Element) -> GraphResult<Value> {
        match element {
            Element::Vertex(v) => self.encode_vertex(v),
            Element::Edge(e) => self.encode_edge(e),
            Element::Property(p) => self.encode_property(p),
        }
    }

    pub fn decode(&self, doc: Value, naming: &CollectionNaming) -> GraphResult<Element> {
        let kind = match doc.get(KIND_FIELD) {
            Some(Value::String(kind)) => match kind.as_str() {
                "vertex" => ElementKind::Vertex,
                "edge" => ElementKind::Edge,
                "property" => ElementKind::Property,
                other => return Err(GraphError::Codec(format!("unknown element kind: {}", other))),
            },
            Some(other) => return Err(GraphError::Codec(format!("invalid element kind: {}", other))),
            None if doc.get(FROM_FIELD).is_some() && doc.get(TO_FIELD).is_some() => ElementKind::Edge,
            None => ElementKind::Vertex,
        };
        match kind {
            ElementKind::Vertex => self.decode_vertex(doc, naming).map(Element::Vertex),
            ElementKind::Edge => self.decode_edge(doc, naming).map(Element::Edge),
            ElementKind::Property => self.decode_property(doc, naming).map(Element::Property),
        }
    }

    /// Vertex document: one top-level field per property key
    ///
    /// A lone scalar is stored as-is. Several values, or an array value, are
    /// stored as a JSON array so that reading can tell them apart.
    pub fn encode_vertex(&self, vertex: &Vertex) -> GraphResult<Value> {
        let mut doc = header(ElementKind::Vertex, vertex.data());
        for (key, properties) in vertex.properties().iter() {
            check_property_key(key)?;
            let encoded = match properties {
                [only] if !matches!(only.value(), PropertyValue::Array(_)) => {
                    self.values.encode(only.value())?
                }
                many => Value::Array(
                    many.iter()
                        .map(|p| self.values.encode(p.value()))
                        .collect::<GraphResult<_>>()?,
                ),
            };
            doc.insert(key.to_string(), encoded);
        }
        Ok(Value::Object(doc))
    }

    pub fn decode_vertex(&self, doc: Value, naming: &CollectionNaming) -> GraphResult<Vertex> {
        let (data, fields) = self.split(doc, naming)?;
        let mut incoming = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            let values = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| self.values.decode(item))
                    .collect::<GraphResult<Vec<_>>>()?,
                scalar => vec![self.values.decode(&scalar)?],
            };
            incoming.push((key, values));
        }
        let mut properties = PropertyManager::new();
        properties.attach_properties(&ElementRef::of(ElementKind::Vertex, &data), incoming);
        Ok(Vertex::from_parts(data, properties))
    }

    pub fn encode_edge(&self, edge: &Edge) -> GraphResult<Value> {
        let mut doc = header(ElementKind::Edge, edge.data());
        doc.insert(FROM_FIELD.to_string(), Value::String(edge.from().to_string()));
        doc.insert(TO_FIELD.to_string(), Value::String(edge.to().to_string()));
        for property in edge.properties() {
            check_property_key(property.key())?;
            doc.insert(property.key().to_string(), self.values.encode(property.value())?);
        }
        Ok(Value::Object(doc))
    }

    pub fn decode_edge(&self, doc: Value, naming: &CollectionNaming) -> GraphResult<Edge> {
        let from = handle_field(&doc, FROM_FIELD)?;
        let to = handle_field(&doc, TO_FIELD)?;
        let (data, fields) = self.split(doc, naming)?;
        let mut edge = Edge::assemble(data, from, to)?;
        for (key, value) in fields {
            edge.set_property(key, self.values.decode(&value)?);
        }
        Ok(edge)
    }

    pub fn encode_property(&self, property: &ElementProperty) -> GraphResult<Value> {
        let mut doc = header(ElementKind::Property, property.data());
        doc.insert("key".to_string(), Value::String(property.key().to_string()));
        doc.insert("value".to_string(), self.values.encode(property.value())?);
        if let Some(owner) = property.owner() {
            doc.insert("owner".to_string(), serde_json::to_value(owner)?);
        }
        Ok(Value::Object(doc))
    }

    pub fn decode_property(&self, doc: Value, naming: &CollectionNaming) -> GraphResult<ElementProperty> {
        let (data, mut fields) = self.split(doc, naming)?;
        let key = match fields.remove("key") {
            Some(Value::String(key)) => key,
            _ => return Err(GraphError::Codec("property document is missing key".to_string())),
        };
        let value = match fields.remove("value") {
            Some(value) => self.values.decode(&value)?,
            None => PropertyValue::Null,
        };
        let mut property = ElementProperty::with_data(data, key, value);
        if let Some(owner) = fields.remove("owner") {
            let owner: ElementRef = serde_json::from_value(owner)?;
            property.set_owner(&owner);
        }
        Ok(property)
    }

    /// Separate system attributes from user fields and pair the identity
    fn split(&self, doc: Value, naming: &CollectionNaming) -> GraphResult<(ElementData, Map<String, Value>)> {
        let meta = DocumentMeta::from_document(&doc)?;
        let label = naming.label_from_handle(&meta.id);
        let Value::Object(mut fields) = doc else {
            return Err(GraphError::Codec("document is not an object".to_string()));
        };
        fields.retain(|key, _| !key.starts_with('_'));
        let collection = naming.resolve(&label);
        Ok((ElementData::loaded(meta, label, &collection)?, fields))
    }
}

fn header(kind: ElementKind, data: &ElementData) -> Map<String, Value> {
    let mut doc = Map::new();
    if let Some(key) = data.key() {
        doc.insert(KEY_FIELD.to_string(), Value::String(key.to_string()));
    }
    doc.insert(KIND_FIELD.to_string(), Value::String(kind.as_str().to_string()));
    doc
}

fn handle_field(doc: &Value, field: &str) -> GraphResult<DocumentHandle> {
    doc.get(field)
        .and_then(Value::as_str)
        .map(DocumentHandle::new)
        .ok_or_else(|| GraphError::Codec(format!("edge document is missing {}", field)))
}

// Keys starting with an underscore collide with system attributes.
fn check_property_key(key: &str) -> GraphResult<()> {
    if key.is_empty() || key.starts_with('_') {
        return Err(GraphError::Codec(format!("invalid property key: {:?}", key)));
    }
    Ok(())
}
