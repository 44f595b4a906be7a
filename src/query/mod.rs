//! Query translation
//!
//! Traversal requests become parameterized AQL:
//! - [`PropertyFilter`] renders property predicates with bound values
//! - [`QueryBuilder`] accumulates clauses and owns the bind variables
//! - [`QueryDescriptor`] picks the query shape and drives the builder

pub mod builder;
pub mod descriptor;
pub mod filter;

// Re-export main types
pub use builder::{BindVars, QueryBuilder, RenderedQuery, TraversalOptions};
pub use descriptor::{QueryContext, QueryDescriptor, QueryKind};
pub use filter::{Comparator, PropertyFilter};
