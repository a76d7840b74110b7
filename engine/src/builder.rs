//! Schema node construction.
//!
//! Walks the type graph depth-first from a descriptor and produces the JSON
//! Schema node for it. Primitives, collections and maps are built inline;
//! enums, objects and polymorphic roots become named definitions in the
//! [`DefinitionRegistry`] and are referenced with `$ref`.

use serde_json::{Map, Value, json};
use tracing::debug;
use typeschema_core::{MemberDescriptor, TypeDescriptor, TypeGraph};

use crate::classify::{Category, classify};
use crate::config::{GeneratorConfig, NullableStyle};
use crate::error::{Result, SchemaError, SchemaPath};
use crate::inject::{SupplierRegistry, merge_overrides};
use crate::polymorphism::DiscriminatorIndex;
use crate::registry::DefinitionRegistry;

/// Mutable state of one generation.
#[derive(Debug)]
pub struct Context {
    /// Definitions reached so far.
    pub registry: DefinitionRegistry,
    /// Member path of the node being built.
    pub path: SchemaPath,
}

impl Context {
    /// Starts a generation at `root`.
    pub fn new(registry: DefinitionRegistry, root: &TypeDescriptor) -> Self {
        Self {
            registry,
            path: SchemaPath::root(&root.simple_name()),
        }
    }
}

struct BuiltNode {
    node: Value,
    nullable: bool,
}

/// Builds schema nodes for descriptors of one type graph.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typeschema_core::{MemberDescriptor, TypeDescriptor, TypeGraph};
/// use typeschema_engine::{Context, DefinitionRegistry, GeneratorConfig, NodeBuilder, SupplierRegistry};
///
/// let graph = TypeGraph::with_primitives().with_type(
///     TypeDescriptor::object("a.Person").with_member(MemberDescriptor::required("age", "integer")),
/// );
/// let config = GeneratorConfig::default();
/// let suppliers = SupplierRegistry::new();
/// let builder = NodeBuilder::new(&graph, &config, &suppliers);
///
/// let person = graph.get("a.Person").unwrap();
/// let mut ctx = Context::new(DefinitionRegistry::for_config(&config), person);
/// let node = builder.build(person, &mut ctx).unwrap();
///
/// assert_eq!(node, json!({"$ref": "#/definitions/Person"}));
/// assert_eq!(ctx.registry.len(), 1);
/// ```
#[derive(Debug)]
pub struct NodeBuilder<'a> {
    graph: &'a TypeGraph,
    config: &'a GeneratorConfig,
    suppliers: &'a SupplierRegistry,
    discriminators: DiscriminatorIndex,
}

impl<'a> NodeBuilder<'a> {
    /// Creates a builder, indexing the discriminators of every polymorphic
    /// root in the graph.
    pub fn new(
        graph: &'a TypeGraph,
        config: &'a GeneratorConfig,
        suppliers: &'a SupplierRegistry,
    ) -> Self {
        Self {
            graph,
            config,
            suppliers,
            discriminators: DiscriminatorIndex::build(graph),
        }
    }

    /// The graph descriptors are resolved against.
    pub fn graph(&self) -> &'a TypeGraph {
        self.graph
    }

    /// The active configuration.
    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    pub(crate) fn discriminators(&self) -> &DiscriminatorIndex {
        &self.discriminators
    }

    /// Builds the node for a descriptor.
    ///
    /// Named categories return a `$ref` and leave their definition in
    /// `ctx.registry`.
    pub fn build(&self, descriptor: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        Ok(self.build_descriptor(descriptor, ctx)?.node)
    }

    /// Builds the node for an identity of the graph.
    pub fn build_identity(&self, identity: &str, ctx: &mut Context) -> Result<Value> {
        let descriptor = self.resolve(identity, ctx)?;
        self.build(descriptor, ctx)
    }

    pub(crate) fn resolve(&self, identity: &str, ctx: &Context) -> Result<&'a TypeDescriptor> {
        self.graph
            .get(identity)
            .ok_or_else(|| SchemaError::UnknownType {
                identity: identity.to_string(),
                path: ctx.path.to_string(),
            })
    }

    fn build_descriptor(&self, descriptor: &TypeDescriptor, ctx: &mut Context) -> Result<BuiltNode> {
        let classified = classify(self.graph, descriptor).map_err(|e| e.at(&ctx.path))?;
        let inner = classified.descriptor;

        let mut node = match classified.category {
            Category::Primitive(primitive) => {
                let node = self.base_node(Some(primitive.schema_type()), inner, false);
                self.apply_type_overrides(inner, Value::Object(node), ctx)?
            }
            Category::Collection => self.build_collection(inner, ctx)?,
            Category::Map => self.build_map(inner, ctx)?,
            Category::Enum => self.build_enum(inner, ctx)?,
            Category::Object => self.build_object(inner, ctx)?,
            Category::Polymorphic => self.resolve_union(inner, ctx)?,
        };

        for wrapper in classified.wrappers.iter().rev() {
            node = self.apply_wrapper(wrapper, node, ctx)?;
        }

        Ok(BuiltNode {
            node,
            nullable: classified.nullable,
        })
    }

    /// Starts a node with `type` and the descriptor's title and description.
    pub(crate) fn base_node(
        &self,
        schema_type: Option<&str>,
        descriptor: &TypeDescriptor,
        named: bool,
    ) -> Map<String, Value> {
        let mut node = Map::new();
        if let Some(schema_type) = schema_type {
            node.insert("type".to_string(), json!(schema_type));
        }

        let title = match &descriptor.title {
            Some(title) => Some(title.clone()),
            None if named && self.config.auto_title => Some(descriptor.simple_name()),
            None => None,
        };
        if let Some(title) = title {
            node.insert("title".to_string(), json!(title));
        }
        if let Some(description) = &descriptor.description {
            node.insert("description".to_string(), json!(description));
        }
        node
    }

    /// Layers an optional wrapper's title, description and overrides on top
    /// of the node built for what it wraps.
    fn apply_wrapper(
        &self,
        wrapper: &TypeDescriptor,
        mut node: Value,
        ctx: &Context,
    ) -> Result<Value> {
        if let Value::Object(map) = &mut node {
            if let Some(title) = &wrapper.title {
                map.insert("title".to_string(), json!(title));
            }
            if let Some(description) = &wrapper.description {
                map.insert("description".to_string(), json!(description));
            }
        }
        self.apply_type_overrides(wrapper, node, ctx)
    }

    /// Builds a nested identity, adding a null branch under
    /// [`NullableStyle::OneOfNull`] when it is an optional wrapper.
    fn build_nested(&self, identity: &str, ctx: &mut Context) -> Result<Value> {
        let descriptor = self.resolve(identity, ctx)?;
        let built = self.build_descriptor(descriptor, ctx)?;
        Ok(self.with_null_branch(built.node, built.nullable))
    }

    fn with_null_branch(&self, node: Value, nullable: bool) -> Value {
        if nullable && self.config.nullable_style == NullableStyle::OneOfNull {
            json!({ "oneOf": [{ "type": "null" }, node] })
        } else {
            node
        }
    }

    fn apply_type_overrides(
        &self,
        descriptor: &TypeDescriptor,
        node: Value,
        ctx: &Context,
    ) -> Result<Value> {
        match &descriptor.overrides {
            Some(overrides) => merge_overrides(
                node,
                overrides,
                self.suppliers,
                &descriptor.identity,
                &ctx.path,
            ),
            None => Ok(node),
        }
    }

    /// Emits a named definition once and returns a reference to it.
    ///
    /// An identity that is in progress or done is only referenced, which is
    /// what terminates recursive types.
    pub(crate) fn define<F>(
        &self,
        descriptor: &TypeDescriptor,
        ctx: &mut Context,
        body: F,
    ) -> Result<Value>
    where
        F: FnOnce(&Self, &mut Context) -> Result<Value>,
    {
        let identity = descriptor.identity.as_str();
        if let Some(reference) = ctx.registry.reference(identity) {
            debug!(identity, "referencing existing definition");
            return Ok(reference);
        }

        let name = ctx.registry.begin(descriptor)?;
        debug!(identity, name = %name, "expanding definition");

        let node = body(self, ctx)?;
        let node = self.apply_type_overrides(descriptor, node, ctx)?;
        ctx.registry.complete(identity, node);
        Ok(ctx.registry.reference_to(&name))
    }

    fn build_enum(&self, descriptor: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        self.define(descriptor, ctx, |builder, _| {
            let mut node = builder.base_node(Some("string"), descriptor, true);
            let constants = descriptor.enum_constants.clone().unwrap_or_default();
            node.insert("enum".to_string(), json!(constants));
            Ok(Value::Object(node))
        })
    }

    fn build_collection(&self, descriptor: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        let element = descriptor.element.as_deref().unwrap_or_default();
        let mut node = self.base_node(Some("array"), descriptor, false);

        ctx.path.push_items();
        let items = self.build_nested(element, ctx);
        ctx.path.pop();
        node.insert("items".to_string(), items?);

        if descriptor.unique_items {
            node.insert("uniqueItems".to_string(), Value::Bool(true));
        }
        self.apply_type_overrides(descriptor, Value::Object(node), ctx)
    }

    fn build_map(&self, descriptor: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        let value_type = descriptor.map_value.as_deref().unwrap_or_default();
        let mut node = self.base_node(Some("object"), descriptor, false);

        ctx.path.push_values();
        let values = self.build_nested(value_type, ctx);
        ctx.path.pop();
        node.insert("additionalProperties".to_string(), values?);

        self.apply_type_overrides(descriptor, Value::Object(node), ctx)
    }

    pub(crate) fn build_object(&self, descriptor: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        self.define(descriptor, ctx, |builder, ctx| builder.object_body(descriptor, ctx))
    }

    fn object_body(&self, descriptor: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        let mut node = self.base_node(Some("object"), descriptor, true);
        if self.config.disallow_additional_properties {
            node.insert("additionalProperties".to_string(), Value::Bool(false));
        }

        let mut properties = Map::new();
        let mut required: Vec<String> = Vec::new();

        let discriminator = self.discriminator_for(descriptor, ctx)?;
        if let Some((property, value)) = &discriminator {
            properties.insert(property.clone(), value.clone());
            required.push(property.clone());
        }

        for member in descriptor.members.iter().flatten() {
            if discriminator
                .as_ref()
                .is_some_and(|(property, _)| *property == member.name)
            {
                continue;
            }

            ctx.path.push_member(&member.name);
            let built = self.build_member(descriptor, member, ctx);
            ctx.path.pop();
            let (property, is_required) = built?;

            properties.insert(member.name.clone(), property);
            if is_required {
                required.push(member.name.clone());
            }
        }

        node.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            node.insert("required".to_string(), json!(required));
        }
        Ok(Value::Object(node))
    }

    fn build_member(
        &self,
        owner: &TypeDescriptor,
        member: &MemberDescriptor,
        ctx: &mut Context,
    ) -> Result<(Value, bool)> {
        let declared = self.resolve(&member.type_ref, ctx)?;
        let built = self.build_descriptor(declared, ctx)?;
        let nullable = member.nullable || built.nullable;

        let mut node = built.node;
        if let (Some(format), Value::Object(map)) = (&member.format, &mut node) {
            map.insert("format".to_string(), json!(format));
        }
        if let Some(overrides) = &member.overrides {
            node = merge_overrides(node, overrides, self.suppliers, &owner.identity, &ctx.path)?;
        }

        // Annotations stay on the outermost node; format and overrides
        // constrain the non-null branch.
        let mut node = self.with_null_branch(node, nullable);
        if let Value::Object(map) = &mut node {
            if let Some(title) = &member.title {
                map.insert("title".to_string(), json!(title));
            }
            if let Some(description) = &member.description {
                map.insert("description".to_string(), json!(description));
            }
            if let Some(default) = &member.default {
                map.insert("default".to_string(), default.clone());
            }
        }

        Ok((node, !nullable))
    }
}
