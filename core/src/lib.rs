//! Core type model and shared primitives for type-to-schema synthesis.
//!
//! This crate defines the foundational types a reflection layer exports for
//! the schema engine:
//!
//! - [`TypeDescriptor`]: one source type with its category signals
//!   (primitive, enum, collection, map, object, polymorphic root, optional
//!   wrapper), metadata, and type-level overrides.
//! - [`MemberDescriptor`]: a field of an object type with its declared type,
//!   nullability, and member-level overrides.
//! - [`OverrideDeclaration`]: user-declared schema injection: raw JSON,
//!   key/value pairs, and a named supplier.
//! - [`TypeGraph`]: the identity-keyed universe of descriptors.
//! - [`TypeModelPackage`]: a versioned bundle of descriptors for
//!   distribution.
//!
//! Validation ([`validate_graph`], [`validate_package`]) catches structural
//! errors such as dangling type references, duplicate members, and malformed
//! hierarchies.
//!
//! Merging ([`merge_json`], [`insert_at_path`]) provides the JSON primitives
//! overrides are applied with.
//!
//! # Example
//!
//! ```
//! use typeschema_core::*;
//!
//! // Model a small type hierarchy
//! let graph = TypeGraph::with_primitives()
//!     .with_type(
//!         TypeDescriptor::object("com.example.Person")
//!             .with_member(MemberDescriptor::nullable("name", "string"))
//!             .with_member(
//!                 MemberDescriptor::required("age", "integer")
//!                     .with_overrides(OverrideDeclaration::new().with_int("minimum", 0)),
//!             ),
//!     );
//!
//! assert_eq!(graph.get("com.example.Person").unwrap().simple_name(), "Person");
//! assert!(validate_graph(&graph).is_empty());
//! ```

mod graph;
mod merge;
mod package;
mod types;
mod validate;

pub use graph::{BUILTIN_PRIMITIVES, TypeGraph};
pub use merge::{insert_at_path, merge_json};
pub use package::TypeModelPackage;
pub use types::*;
pub use validate::{ValidationError, validate_graph, validate_package};
