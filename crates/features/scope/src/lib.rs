//! # Scope Tree
//!
//! Nested API definitions get dotted names (`Client.scope.operation`) and a settings
//! model each. A node's model inherits every option, memo and validator declared on
//! its ancestors, so an operation sees the whole chain of settings above it.
//!
//! * [`Client`] owns the tree and the message [`Catalog`](settle_kernel::Catalog).
//! * [`Schema`] nodes forward `option` / `memo` / `validate` to their own declarations
//!   and derive their effective model on demand.

mod error;
mod schema;

pub use crate::error::{ScopeError, ScopeErrorExt};
pub use crate::schema::{Client, NodeKind, Schema};
