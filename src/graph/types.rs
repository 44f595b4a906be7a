//! Core type definitions for graph elements

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between collection and key in a document handle
pub const HANDLE_SEPARATOR: char = '/';

/// Global document handle of the form `<collection>/<key>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        DocumentHandle(handle.into())
    }

    /// Build a handle from its two segments
    pub fn from_parts(collection: &str, key: &str) -> Self {
        DocumentHandle(format!("{}{}{}", collection, HANDLE_SEPARATOR, key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Collection segment (everything before the first `/`)
    pub fn collection(&self) -> &str {
        match self.0.split_once(HANDLE_SEPARATOR) {
            Some((collection, _)) => collection,
            None => &self.0,
        }
    }

    /// Key segment (everything after the first `/`), if any
    pub fn key(&self) -> Option<&str> {
        self.0.split_once(HANDLE_SEPARATOR).map(|(_, key)| key)
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DocumentHandle {
    fn from(s: String) -> Self {
        DocumentHandle(s)
    }
}

impl From<&str> for DocumentHandle {
    fn from(s: &str) -> Self {
        DocumentHandle(s.to_string())
    }
}

/// Discriminant written into encoded documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Vertex,
    Edge,
    Property,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::Property => "property",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Traversal direction relative to a start vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    #[default]
    Both,
}

impl Direction {
    /// AQL traversal keyword
    pub fn aql_keyword(&self) -> &'static str {
        match self {
            Direction::In => "INBOUND",
            Direction::Out => "OUTBOUND",
            Direction::Both => "ANY",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "inbound" => Ok(Direction::In),
            "out" | "outbound" => Ok(Direction::Out),
            "both" | "any" => Ok(Direction::Both),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// How many values a vertex property key may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    List,
    Set,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cardinality::Single => "single",
            Cardinality::List => "list",
            Cardinality::Set => "set",
        };
        write!(f, "{}", name)
    }
}
