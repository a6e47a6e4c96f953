//! The schema-driven object model.
//!
//! - [`Field`]: a named slot holding at most one value
//! - [`Namespace`]: an ordered group of fields with path-composition rules
//! - [`Model`]: the root container for one standard

pub mod field;
pub mod metadata;
pub mod namespace;

pub use field::{Attributes, Documented, Field, TagId};
pub use metadata::Model;
pub use namespace::Namespace;
