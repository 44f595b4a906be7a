//! Cardinality-aware property store
//!
//! A vertex keeps its properties in a [`PropertyManager`]. The first write of a
//! key fixes its [`Cardinality`]; later writes follow that cardinality until the
//! key is rewritten with a different one, which rebuilds the container.

use super::element::{ElementData, ElementRef};
use super::property::PropertyValue;
use super::types::Cardinality;
use crate::error::{GraphError, GraphResult};
use indexmap::IndexMap;

/// A single key/value pair owned by a vertex, an edge, or stored standalone
#[derive(Debug, Clone, PartialEq)]
pub struct ElementProperty {
    data: ElementData,
    key: String,
    value: PropertyValue,
    owner: Option<ElementRef>,
}

impl ElementProperty {
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            data: ElementData::default(),
            key: key.into(),
            value: value.into(),
            owner: None,
        }
    }

    /// Property attached to an owning element
    pub fn owned(owner: &ElementRef, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let data = match &owner.collection {
            Some(collection) => ElementData::new(collection.clone()),
            None => ElementData::default(),
        };
        Self {
            data,
            key: key.into(),
            value: value.into(),
            owner: Some(owner.clone()),
        }
    }

    /// Standalone property with its own document identity
    pub fn with_data(data: ElementData, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            data,
            key: key.into(),
            value: value.into(),
            owner: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<PropertyValue>) {
        self.value = value.into();
    }

    pub fn owner(&self) -> Option<&ElementRef> {
        self.owner.as_ref()
    }

    pub fn data(&self) -> &ElementData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    pub(crate) fn set_owner(&mut self, owner: &ElementRef) {
        self.owner = Some(owner.clone());
    }
}

/// Per-element store of properties keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyManager {
    cardinalities: IndexMap<String, Cardinality>,
    properties: IndexMap<String, Vec<ElementProperty>>,
}

impl PropertyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `key` following `cardinality`
    ///
    /// - `Single` replaces whatever the key held
    /// - `List` appends
    /// - `Set` appends unless an equal value is already present
    pub fn add(
        &mut self,
        owner: &ElementRef,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> &ElementProperty {
        let key = key.into();
        let value = value.into();

        match self.cardinalities.get(&key).copied() {
            Some(current) if current != cardinality => self.rebuild(&key, cardinality),
            Some(_) => {}
            None => {
                self.cardinalities.insert(key.clone(), cardinality);
            }
        }

        let container = self.properties.entry(key.clone()).or_default();
        let position = match cardinality {
            Cardinality::Single => {
                container.clear();
                container.push(ElementProperty::owned(owner, key, value));
                0
            }
            Cardinality::List => {
                container.push(ElementProperty::owned(owner, key, value));
                container.len() - 1
            }
            Cardinality::Set => match container.iter().position(|p| p.value == value) {
                Some(existing) => existing,
                None => {
                    container.push(ElementProperty::owned(owner, key, value));
                    container.len() - 1
                }
            },
        };
        &container[position]
    }

    fn rebuild(&mut self, key: &str, cardinality: Cardinality) {
        if let Some(container) = self.properties.get_mut(key) {
            if cardinality == Cardinality::Set {
                let mut deduped: Vec<ElementProperty> = Vec::with_capacity(container.len());
                for property in container.drain(..) {
                    if !deduped.iter().any(|p| p.value == property.value) {
                        deduped.push(property);
                    }
                }
                *container = deduped;
            }
        }
        self.cardinalities.insert(key.to_string(), cardinality);
    }

    /// Cardinality recorded for `key`
    pub fn cardinality(&self, key: &str) -> Option<Cardinality> {
        self.cardinalities.get(key).copied()
    }

    /// The value of `key`; an error if the key holds more than one value
    pub fn value(&self, key: &str) -> GraphResult<Option<&PropertyValue>> {
        match self.properties.get(key).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([only]) => Ok(Some(&only.value)),
            Some(_) => Err(GraphError::AmbiguousCardinality(key.to_string())),
        }
    }

    /// All values of `key` in stored order
    pub fn values(&self, key: &str) -> Vec<&PropertyValue> {
        self.properties(key).iter().map(|p| &p.value).collect()
    }

    pub fn properties(&self, key: &str) -> &[ElementProperty] {
        self.properties.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every stored property, grouped by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ElementProperty])> {
        self.properties
            .iter()
            .map(|(key, props)| (key.as_str(), props.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.get(key).is_some_and(|props| !props.is_empty())
    }

    /// Drop a key together with its cardinality
    pub fn remove(&mut self, key: &str) -> Vec<ElementProperty> {
        self.cardinalities.shift_remove(key);
        self.properties.shift_remove(key).unwrap_or_default()
    }

    /// Drop one value of a key; the key goes away with its last value
    pub fn remove_value(&mut self, key: &str, value: &PropertyValue) -> bool {
        let Some(container) = self.properties.get_mut(key) else {
            return false;
        };
        let Some(position) = container.iter().position(|p| &p.value == value) else {
            return false;
        };
        container.remove(position);
        if container.is_empty() {
            self.remove(key);
        }
        true
    }

    /// Bulk attach values read from a document
    ///
    /// Cardinality is inferred from how many values arrived: exactly one
    /// means `Single`, more means `List`. Keys without values are skipped.
    pub fn attach_properties(
        &mut self,
        owner: &ElementRef,
        incoming: impl IntoIterator<Item = (String, Vec<PropertyValue>)>,
    ) {
        for (key, values) in incoming {
            let cardinality = match values.len() {
                0 => continue,
                1 => Cardinality::Single,
                _ => Cardinality::List,
            };
            let container = values
                .into_iter()
                .map(|value| ElementProperty::owned(owner, key.clone(), value))
                .collect();
            self.cardinalities.insert(key.clone(), cardinality);
            self.properties.insert(key, container);
        }
    }

    /// Point every property at a (re-identified) owner
    pub fn rebind_owner(&mut self, owner: &ElementRef) {
        for property in self.properties.values_mut().flatten() {
            property.set_owner(owner);
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::ElementKind;

    fn owner() -> ElementRef {
        ElementRef::of(ElementKind::Vertex, &ElementData::with_key("person", "marko"))
    }

    #[test]
    fn test_single_replaces() {
        let mut props = PropertyManager::new();
        props.add(&owner(), "name", "marko", Cardinality::Single);
        props.add(&owner(), "name", "marco", Cardinality::Single);

        assert_eq!(props.values("name").len(), 1);
        assert_eq!(props.value("name").unwrap(), Some(&PropertyValue::from("marco")));
    }

    #[test]
    fn test_list_appends_in_order() {
        let mut props = PropertyManager::new();
        props.add(&owner(), "location", "santa cruz", Cardinality::List);
        props.add(&owner(), "location", "brussels", Cardinality::List);

        let values = props.values("location");
        assert_eq!(values, vec![&PropertyValue::from("santa cruz"), &PropertyValue::from("brussels")]);
        assert_eq!(props.cardinality("location"), Some(Cardinality::List));
    }

    #[test]
    fn test_set_ignores_duplicates() {
        let mut props = PropertyManager::new();
        props.add(&owner(), "skill", "rust", Cardinality::Set);
        props.add(&owner(), "skill", "go", Cardinality::Set);
        let existing = props.add(&owner(), "skill", "rust", Cardinality::Set).clone();

        assert_eq!(props.values("skill").len(), 2);
        assert_eq!(existing.value(), &PropertyValue::from("rust"));
    }

    #[test]
    fn test_ambiguous_read() {
        let mut props = PropertyManager::new();
        props.add(&owner(), "alias", "a", Cardinality::List);
        assert!(props.value("alias").is_ok());
        props.add(&owner(), "alias", "b", Cardinality::List);

        assert!(matches!(props.value("alias"), Err(GraphError::AmbiguousCardinality(ref k)) if k == "alias"));
        assert_eq!(props.values("alias").len(), 2);
        assert_eq!(props.value("missing").unwrap(), None);
    }

    #[test]
    fn test_cardinality_change_rebuilds() {
        let mut props = PropertyManager::new();
        props.add(&owner(), "tag", "x", Cardinality::List);
        props.add(&owner(), "tag", "x", Cardinality::List);
        props.add(&owner(), "tag", "y", Cardinality::List);
        assert_eq!(props.values("tag").len(), 3);

        // Switching to set keeps existing values but drops duplicates.
        props.add(&owner(), "tag", "z", Cardinality::Set);
        assert_eq!(props.cardinality("tag"), Some(Cardinality::Set));
        assert_eq!(
            props.values("tag"),
            vec![&PropertyValue::from("x"), &PropertyValue::from("y"), &PropertyValue::from("z")]
        );

        props.add(&owner(), "tag", "only", Cardinality::Single);
        assert_eq!(props.cardinality("tag"), Some(Cardinality::Single));
        assert_eq!(props.values("tag"), vec![&PropertyValue::from("only")]);
    }

    #[test]
    fn test_attach_infers_cardinality() {
        let mut props = PropertyManager::new();
        props.attach_properties(
            &owner(),
            vec![
                ("name".to_string(), vec![PropertyValue::from("marko")]),
                ("location".to_string(), vec![PropertyValue::from("a"), PropertyValue::from("b")]),
                ("empty".to_string(), vec![]),
            ],
        );

        assert_eq!(props.cardinality("name"), Some(Cardinality::Single));
        assert_eq!(props.cardinality("location"), Some(Cardinality::List));
        assert!(!props.contains_key("empty"));
        assert_eq!(props.len(), 2);
        let prop = &props.properties("name")[0];
        assert_eq!(prop.owner().and_then(|o| o.key.as_deref()), Some("marko"));
    }

    #[test]
    fn test_remove_value_and_key() {
        let mut props = PropertyManager::new();
        props.add(&owner(), "alias", "a", Cardinality::List);
        props.add(&owner(), "alias", "b", Cardinality::List);

        assert!(props.remove_value("alias", &PropertyValue::from("a")));
        assert!(!props.remove_value("alias", &PropertyValue::from("zzz")));
        assert!(props.remove_value("alias", &PropertyValue::from("b")));
        assert!(!props.contains_key("alias"));
        assert_eq!(props.cardinality("alias"), None);

        props.add(&owner(), "name", "x", Cardinality::Single);
        assert_eq!(props.remove("name").len(), 1);
        assert!(props.is_empty());
    }
}
