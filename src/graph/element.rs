//! Document pairing for graph elements
//!
//! Every vertex, edge and standalone property embeds an [`ElementData`]. It
//! records whether the element has been persisted (paired with a database
//! document) and, if so, the server-assigned handle and revision.
//!
//! ```text
//! Unpaired --insert/load--> Paired --remove--> Removed
//!                             |  ^
//!                             +--+ update (new revision)
//! ```

use super::types::{DocumentHandle, ElementKind};
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pairing lifecycle of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingState {
    /// Constructed locally, never persisted
    #[default]
    Unpaired,
    /// Backed by a database document
    Paired,
    /// Document was deleted; terminal
    Removed,
}

/// Identity fields the server assigns on write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_id")]
    pub id: DocumentHandle,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_rev")]
    pub revision: String,
}

impl DocumentMeta {
    pub fn new(id: impl Into<DocumentHandle>, key: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            revision: revision.into(),
        }
    }

    /// Read `_id`, `_key` and `_rev` off a returned document
    pub fn from_document(doc: &Value) -> GraphResult<Self> {
        let field = |name: &str| {
            doc.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| GraphError::Codec(format!("document is missing {}", name)))
        };
        Ok(Self {
            id: DocumentHandle::new(field("_id")?),
            key: field("_key")?,
            revision: field("_rev")?,
        })
    }
}

/// Identity and pairing state shared by all graph elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementData {
    id: Option<DocumentHandle>,
    key: Option<String>,
    revision: Option<String>,
    collection: Option<String>,
    state: PairingState,
}

impl ElementData {
    /// Unpaired element in the given collection (label)
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            ..Default::default()
        }
    }

    /// Unpaired element with a client-chosen key
    pub fn with_key(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            collection: Some(collection.into()),
            ..Default::default()
        }
    }

    /// Element loaded from the database, already paired. `collection` is
    /// the on-database name the handle must point into.
    pub fn loaded(meta: DocumentMeta, label: impl Into<String>, collection: &str) -> GraphResult<Self> {
        let mut data = Self::new(label);
        data.pair(meta, collection)?;
        Ok(data)
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    pub fn is_paired(&self) -> bool {
        self.state == PairingState::Paired && self.id.is_some() && self.revision.is_some()
    }

    /// Primary key, client- or server-assigned
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Document handle; only available once paired
    pub fn handle(&self) -> GraphResult<&DocumentHandle> {
        match (&self.id, self.state) {
            (Some(id), PairingState::Paired) => Ok(id),
            _ => Err(GraphError::ElementNotPaired(self.describe())),
        }
    }

    /// Revision token; only available once paired
    pub fn revision(&self) -> GraphResult<&str> {
        match (&self.revision, self.state) {
            (Some(rev), PairingState::Paired) => Ok(rev),
            _ => Err(GraphError::ElementNotPaired(self.describe())),
        }
    }

    /// Collection label the element was created or loaded with
    pub fn collection(&self) -> Option<String> {
        self.collection.clone()
    }

    /// Fails unless the element may be inserted
    pub fn ensure_insertable(&self) -> GraphResult<()> {
        match self.state {
            PairingState::Unpaired => Ok(()),
            PairingState::Paired => Err(GraphError::ElementAlreadyPaired(self.describe())),
            PairingState::Removed => Err(GraphError::ElementNotFound(format!(
                "{} was removed",
                self.describe()
            ))),
        }
    }

    /// Record the identity returned by an insert or a load. The handle must
    /// point into `collection`, the on-database name of the element's label.
    pub fn pair(&mut self, meta: DocumentMeta, collection: &str) -> GraphResult<()> {
        self.ensure_insertable()?;
        if let Some(key) = &self.key {
            if key != &meta.key {
                return Err(GraphError::Codec(format!(
                    "server returned key {} for element with key {}",
                    meta.key, key
                )));
            }
        }
        if meta.id.collection() != collection {
            return Err(GraphError::Codec(format!(
                "handle {} does not belong to collection {}",
                meta.id, collection
            )));
        }
        self.id = Some(meta.id);
        self.key = Some(meta.key);
        self.revision = Some(meta.revision);
        self.state = PairingState::Paired;
        Ok(())
    }

    /// Overwrite the revision after a successful update
    pub fn update_revision(&mut self, revision: impl Into<String>) -> GraphResult<()> {
        self.handle()?;
        self.revision = Some(revision.into());
        Ok(())
    }

    /// Clear the pairing after the document was deleted
    pub fn unpair(&mut self) {
        self.state = PairingState::Removed;
    }

    /// Human-readable identity for error messages
    pub fn describe(&self) -> String {
        match (&self.id, &self.key) {
            (Some(id), _) => id.to_string(),
            (None, Some(key)) => format!("{}/{}", self.collection().unwrap_or_default(), key),
            (None, None) => format!("unpaired {} element", self.collection().unwrap_or_default()),
        }
    }
}

/// Non-owning reference from a property back to the element holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub collection: Option<String>,
    pub key: Option<String>,
}

impl ElementRef {
    pub fn of(kind: ElementKind, data: &ElementData) -> Self {
        Self {
            kind,
            collection: data.collection(),
            key: data.key().map(str::to_string),
        }
    }
}
