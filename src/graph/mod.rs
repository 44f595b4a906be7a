//! Graph element model
//!
//! This module implements the property graph elements as they move between
//! memory and the document database:
//! - Vertices with cardinality-typed, multi-valued properties
//! - Directed edges addressed by document handle
//! - Document pairing (identity, revision, lifecycle state)
//! - Tagged encode/decode of elements to documents

pub mod codec;
pub mod edge;
pub mod element;
pub mod manager;
pub mod property;
pub mod types;
pub mod vertex;

// Re-export main types
pub use codec::{Element, ElementCodec, JsonValueCodec, ValueCodec};
pub use edge::Edge;
pub use element::{DocumentMeta, ElementData, ElementRef, PairingState};
pub use manager::{ElementProperty, PropertyManager};
pub use property::{PropertyMap, PropertyValue};
pub use types::{Cardinality, Direction, DocumentHandle, ElementKind};
pub use vertex::Vertex;
