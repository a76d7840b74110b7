//! Schema document assembly.
//!
//! Produces the complete document for a root type: the `$schema` header,
//! optional document title and description, the root node and the
//! definitions map collected during the walk.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};
use typeschema_core::TypeGraph;

use crate::builder::{Context, NodeBuilder};
use crate::cache::DocumentCache;
use crate::config::{GeneratorConfig, SchemaDraft};
use crate::error::{Result, SchemaError};
use crate::inject::{SupplierRegistry, SupplierResult};
use crate::registry::DefinitionRegistry;

/// A finished JSON Schema document.
///
/// Cloning is cheap; clones share the underlying JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    value: Arc<Value>,
    draft: SchemaDraft,
}

impl SchemaDocument {
    /// Wraps a document value produced for `draft`.
    pub fn new(value: Value, draft: SchemaDraft) -> Self {
        Self {
            value: Arc::new(value),
            draft,
        }
    }

    /// The document as JSON.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Unwraps the document, cloning only if it is shared.
    pub fn into_value(self) -> Value {
        Arc::try_unwrap(self.value).unwrap_or_else(|shared| (*shared).clone())
    }

    /// The draft the document targets.
    pub fn draft(&self) -> SchemaDraft {
        self.draft
    }

    /// The definitions map, if the document has one.
    pub fn definitions(&self) -> Option<&Map<String, Value>> {
        self.value
            .get(self.draft.definitions_key())
            .and_then(Value::as_object)
    }

    /// Looks up a single definition by name.
    pub fn definition(&self, name: &str) -> Option<&Value> {
        self.definitions().and_then(|defs| defs.get(name))
    }

    /// Compact JSON text.
    pub fn to_json_string(&self) -> String {
        self.value.to_string()
    }

    /// Indented JSON text.
    pub fn to_pretty_string(&self) -> String {
        format!("{:#}", self.value)
    }
}

impl Serialize for SchemaDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Generates schema documents from a shared type graph.
///
/// A generator is `Send + Sync`; concurrent [`generate`](Self::generate)
/// calls each use their own definition registry.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typeschema_core::{MemberDescriptor, TypeDescriptor, TypeGraph};
/// use typeschema_engine::SchemaGenerator;
///
/// let graph = TypeGraph::with_primitives().with_type(
///     TypeDescriptor::object("com.example.Person")
///         .with_member(MemberDescriptor::nullable("name", "string"))
///         .with_member(MemberDescriptor::required("age", "integer")),
/// );
///
/// let doc = SchemaGenerator::new(graph).generate("com.example.Person").unwrap();
/// assert_eq!(doc.as_value()["$ref"], json!("#/definitions/Person"));
/// assert_eq!(doc.definition("Person").unwrap()["required"], json!(["age"]));
/// ```
#[derive(Debug)]
pub struct SchemaGenerator {
    graph: Arc<TypeGraph>,
    config: GeneratorConfig,
    suppliers: SupplierRegistry,
    cache: Option<DocumentCache>,
}

impl SchemaGenerator {
    /// Creates a generator with the default configuration.
    pub fn new(graph: impl Into<Arc<TypeGraph>>) -> Self {
        Self {
            graph: graph.into(),
            config: GeneratorConfig::default(),
            suppliers: SupplierRegistry::new(),
            cache: None,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the supplier registry.
    pub fn with_suppliers(mut self, suppliers: SupplierRegistry) -> Self {
        self.suppliers = suppliers;
        self
    }

    /// Registers one supplier.
    pub fn with_supplier<F>(mut self, name: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> SupplierResult + Send + Sync + 'static,
    {
        self.suppliers.register(name, supplier);
        self
    }

    /// Caches finished documents by root identity.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(DocumentCache::new());
        self
    }

    /// The type graph.
    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// The active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The document cache, when enabled.
    pub fn cache(&self) -> Option<&DocumentCache> {
        self.cache.as_ref()
    }

    /// Generates the document for a root identity.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] hit while walking the graph; no
    /// partial document is produced.
    pub fn generate(&self, root: &str) -> Result<SchemaDocument> {
        let Some(cache) = &self.cache else {
            return generate_document(&self.graph, &self.config, &self.suppliers, root);
        };

        if let Some(document) = cache.get(root) {
            debug!(root, "schema cache hit");
            return Ok(document);
        }
        let document = generate_document(&self.graph, &self.config, &self.suppliers, root)?;
        Ok(cache.insert(root, document))
    }
}

/// Assembles the document for `root` with a fresh definition registry.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownType`] if `root` is not in the graph, or
/// any error raised while building its nodes.
pub fn generate_document(
    graph: &TypeGraph,
    config: &GeneratorConfig,
    suppliers: &SupplierRegistry,
    root: &str,
) -> Result<SchemaDocument> {
    let descriptor = graph.get(root).ok_or_else(|| SchemaError::UnknownType {
        identity: root.to_string(),
        path: "<root>".to_string(),
    })?;
    info!(root, draft = ?config.draft, "generating schema");

    let builder = NodeBuilder::new(graph, config, suppliers);
    let mut ctx = Context::new(DefinitionRegistry::for_config(config), descriptor);
    let root_node = builder.build(descriptor, &mut ctx)?;
    let definitions = ctx.registry.into_definitions();

    let mut document = Map::new();
    document.insert(
        "$schema".to_string(),
        Value::String(config.draft.schema_uri().to_string()),
    );
    if let Some(title) = &config.title {
        document.insert("title".to_string(), Value::String(title.clone()));
    }
    if let Some(description) = &config.description {
        document.insert("description".to_string(), Value::String(description.clone()));
    }
    if let Value::Object(root_keys) = root_node {
        document.extend(root_keys);
    }

    info!(root, definitions = definitions.len(), "schema generated");
    if !definitions.is_empty() {
        document.insert(
            config.draft.definitions_key().to_string(),
            Value::Object(definitions),
        );
    }

    Ok(SchemaDocument::new(Value::Object(document), config.draft))
}

/// Generates the document for `root` with the default configuration.
///
/// # Examples
///
/// ```
/// use typeschema_core::{TypeDescriptor, TypeGraph};
///
/// let graph = TypeGraph::new().with_type(TypeDescriptor::enumeration("a.Level", ["LOW", "HIGH"]));
/// let schema = typeschema_engine::generate_schema(&graph, "a.Level").unwrap();
/// assert_eq!(schema["definitions"]["Level"]["enum"][1], "HIGH");
/// ```
pub fn generate_schema(graph: &TypeGraph, root: &str) -> Result<Value> {
    generate_document(graph, &GeneratorConfig::default(), &SupplierRegistry::new(), root)
        .map(SchemaDocument::into_value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use typeschema_core::{MemberDescriptor, PrimitiveType, TypeDescriptor};

    use super::*;

    #[test]
    fn test_primitive_root_has_no_definitions() {
        let graph = TypeGraph::with_primitives();
        let value = generate_schema(&graph, "integer").unwrap();
        assert_eq!(
            value,
            json!({"$schema": "http://json-schema.org/draft-07/schema#", "type": "integer"})
        );
    }

    #[test]
    fn test_document_header_order() {
        let graph = TypeGraph::with_primitives().with_type(
            TypeDescriptor::object("a.Pet").with_member(MemberDescriptor::required("id", "integer")),
        );
        let config = GeneratorConfig::default()
            .with_draft(SchemaDraft::Draft202012)
            .with_title("Pets")
            .with_description("All pets");
        let doc = generate_document(&graph, &config, &SupplierRegistry::new(), "a.Pet").unwrap();

        let keys: Vec<&str> = doc
            .as_value()
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["$schema", "title", "description", "$ref", "$defs"]);
        assert_eq!(doc.as_value()["$ref"], json!("#/$defs/Pet"));
        assert!(doc.definition("Pet").is_some());
    }

    #[test]
    fn test_unknown_root() {
        let err = generate_schema(&TypeGraph::new(), "a.Nope").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { ref identity, .. } if identity == "a.Nope"));
    }

    #[test]
    fn test_cache_returns_same_document() {
        let graph = TypeGraph::new()
            .with_type(TypeDescriptor::primitive("uuid", PrimitiveType::String));
        let generator = SchemaGenerator::new(graph).with_cache();

        let first = generator.generate("uuid").unwrap();
        let second = generator.generate("uuid").unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.cache().map(DocumentCache::len), Some(1));
    }

    #[test]
    fn test_document_text_forms() {
        let doc = SchemaDocument::new(json!({"type": "string"}), SchemaDraft::Draft07);
        assert_eq!(doc.to_json_string(), r#"{"type":"string"}"#);
        assert!(doc.to_pretty_string().contains("\n"));
        assert!(doc.definitions().is_none());
        assert_eq!(doc.clone().into_value(), json!({"type": "string"}));
    }
}
