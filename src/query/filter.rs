//! Property predicates
//!
//! A [`PropertyFilter`] collects `(key, value, comparator)` triples and renders
//! them into FILTER conditions. Values are always bound; keys are interpolated
//! inside backticks with any backtick removed.

use super::builder::BindVars;
use crate::graph::property::PropertyValue;
use std::fmt;

/// Bind-variable prefix of property values, numbered `property0`, `property1`, ...
pub const PROPERTY_PREFIX: &str = "property";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Has,
    HasNot,
    In,
    NotIn,
}

impl Comparator {
    /// AQL operator text
    fn operator(&self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterThanEqual => ">=",
            Comparator::LessThan => "<",
            Comparator::LessThanEqual => "<=",
            Comparator::Has => "!= null",
            Comparator::HasNot => "== null",
            Comparator::In => "IN",
            Comparator::NotIn => "NOT IN",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operator())
    }
}

impl std::str::FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" | "=" => Ok(Comparator::Equal),
            "!=" => Ok(Comparator::NotEqual),
            ">" => Ok(Comparator::GreaterThan),
            ">=" => Ok(Comparator::GreaterThanEqual),
            "<" => Ok(Comparator::LessThan),
            "<=" => Ok(Comparator::LessThanEqual),
            other => Err(format!("unknown comparator: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    key: String,
    value: PropertyValue,
    comparator: Comparator,
}

/// Ordered list of property predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    predicates: Vec<Predicate>,
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate; the value is ignored by `Has` and `HasNot`
    pub fn has(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        comparator: Comparator,
    ) -> &mut Self {
        self.predicates.push(Predicate {
            key: key.into(),
            value: value.into(),
            comparator,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append one clause per predicate and bind its values
    ///
    /// Predicate `i` binds under `property{first + i}`; the caller owns the
    /// numbering so that several filters can share one query.
    pub fn render(&self, prefix: &str, first: usize, clauses: &mut Vec<String>, bind_vars: &mut BindVars) {
        for (idx, predicate) in self.predicates.iter().enumerate() {
            let attribute = format!("{}.`{}`", prefix, predicate.key.replace('`', ""));
            let name = format!("{}{}", PROPERTY_PREFIX, first + idx);
            let clause = match predicate.comparator {
                Comparator::Has | Comparator::HasNot => {
                    format!("{} {}", attribute, predicate.comparator.operator())
                }
                Comparator::In | Comparator::NotIn => {
                    let items = match &predicate.value {
                        PropertyValue::Array(items) => items.clone(),
                        single => vec![single.clone()],
                    };
                    let refs: Vec<String> = items
                        .iter()
                        .enumerate()
                        .map(|(pos, item)| {
                            let sub = format!("{}_{}", name, pos);
                            bind_vars.insert(sub.clone(), item.to_json());
                            format!("@{}", sub)
                        })
                        .collect();
                    format!("{} {} [{}]", attribute, predicate.comparator.operator(), refs.join(", "))
                }
                _ => {
                    bind_vars.insert(name.clone(), predicate.value.to_json());
                    format!("{} {} @{}", attribute, predicate.comparator.operator(), name)
                }
            };
            clauses.push(clause);
        }
    }
}
