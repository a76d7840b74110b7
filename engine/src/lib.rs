//! JSON Schema synthesis from static type models.
//!
//! The engine walks a [`TypeGraph`](typeschema_core::TypeGraph) from a root
//! identity and emits a self-contained JSON Schema document:
//!
//! - primitives, collections and maps are inlined;
//! - enums, objects and polymorphic roots become named definitions referenced
//!   through `$ref`, each emitted exactly once per document;
//! - recursive types terminate by referencing definitions still in progress;
//! - polymorphic roots become `oneOf` unions whose variants pin a
//!   discriminator property with `const`;
//! - user overrides (raw JSON, key/value pairs, named suppliers) are merged
//!   on top of the generated nodes.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use typeschema_core::*;
//! use typeschema_engine::SchemaGenerator;
//!
//! let graph = TypeGraph::with_primitives()
//!     .with_type(
//!         TypeDescriptor::polymorphic("zoo.Animal", "kind")
//!             .with_subtype("zoo.Cat", "cat")
//!             .with_subtype("zoo.Dog", "dog"),
//!     )
//!     .with_type(TypeDescriptor::object("zoo.Cat").with_member(MemberDescriptor::required("lives", "integer")))
//!     .with_type(TypeDescriptor::object("zoo.Dog").with_member(MemberDescriptor::nullable("owner", "string")));
//!
//! let doc = SchemaGenerator::new(graph).generate("zoo.Animal").unwrap();
//! assert_eq!(
//!     doc.definition("Animal").unwrap()["oneOf"],
//!     json!([{"$ref": "#/definitions/Cat"}, {"$ref": "#/definitions/Dog"}])
//! );
//! assert_eq!(doc.definition("Cat").unwrap()["properties"]["kind"], json!({"const": "cat"}));
//! ```

mod assembler;
mod builder;
mod cache;
mod classify;
mod config;
mod error;
mod inject;
mod polymorphism;
mod registry;

pub use assembler::{SchemaDocument, SchemaGenerator, generate_document, generate_schema};
pub use builder::{Context, NodeBuilder};
pub use cache::DocumentCache;
pub use classify::{Category, Classified, ClassifyError, category_of, classify};
pub use config::{ConfigError, GeneratorConfig, NullableStyle, SchemaDraft};
pub use error::{Result, SchemaError, SchemaPath};
pub use inject::{SupplierError, SupplierRegistry, SupplierResult, merge_overrides};
pub use polymorphism::{DiscriminatorClaim, DiscriminatorIndex};
pub use registry::{
    DefinitionRegistry, GenerationState, RegistryEntry, definition_name, escape_pointer,
};
