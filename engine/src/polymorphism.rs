//! Discriminated unions.
//!
//! A polymorphic root becomes a named definition holding `oneOf` over
//! references to its subtypes, in declaration order. Each subtype is an
//! object definition whose first property is the discriminator, pinned to
//! that subtype's value and listed first in `required`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde_json::{Value, json};
use tracing::debug;
use typeschema_core::{TypeDescriptor, TypeGraph};

use crate::builder::{Context, NodeBuilder};
use crate::error::{Result, SchemaError};

/// Discriminator a subtype must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscriminatorClaim {
    /// Every root listing the subtype agrees on property and value.
    Single {
        /// First root that listed the subtype.
        root: String,
        /// Discriminator property name.
        property: String,
        /// Discriminator value of the subtype.
        value: String,
    },
    /// Roots disagree on property or value.
    Conflicting {
        /// Identities of the disagreeing roots, in graph order.
        roots: Vec<String>,
    },
}

/// Subtype to discriminator lookup over every polymorphic root of a graph.
///
/// # Examples
///
/// ```
/// use typeschema_core::{TypeDescriptor, TypeGraph};
/// use typeschema_engine::{DiscriminatorClaim, DiscriminatorIndex};
///
/// let graph = TypeGraph::new()
///     .with_type(TypeDescriptor::polymorphic("zoo.Animal", "kind").with_subtype("zoo.Cat", "cat"))
///     .with_type(TypeDescriptor::object("zoo.Cat"));
/// let index = DiscriminatorIndex::build(&graph);
///
/// assert!(matches!(
///     index.claim("zoo.Cat"),
///     Some(DiscriminatorClaim::Single { value, .. }) if value == "cat"
/// ));
/// assert!(index.claim("zoo.Animal").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiscriminatorIndex {
    claims: HashMap<String, DiscriminatorClaim>,
}

impl DiscriminatorIndex {
    /// Indexes every subtype listed by a polymorphic root of `graph`.
    pub fn build(graph: &TypeGraph) -> Self {
        let mut claims: HashMap<String, DiscriminatorClaim> = HashMap::new();

        for root in graph.iter() {
            let Some(poly) = &root.polymorphism else {
                continue;
            };
            for entry in &poly.subtypes {
                let value = poly.value_for(entry);
                match claims.entry(entry.subtype.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(DiscriminatorClaim::Single {
                            root: root.identity.clone(),
                            property: poly.property.clone(),
                            value,
                        });
                    }
                    Entry::Occupied(mut slot) => {
                        let replacement = match slot.get() {
                            DiscriminatorClaim::Single {
                                property,
                                value: existing,
                                ..
                            } if *property == poly.property && *existing == value => None,
                            DiscriminatorClaim::Single { root: first, .. } => {
                                Some(DiscriminatorClaim::Conflicting {
                                    roots: vec![first.clone(), root.identity.clone()],
                                })
                            }
                            DiscriminatorClaim::Conflicting { roots } => {
                                let mut roots = roots.clone();
                                roots.push(root.identity.clone());
                                Some(DiscriminatorClaim::Conflicting { roots })
                            }
                        };
                        if let Some(claim) = replacement {
                            slot.insert(claim);
                        }
                    }
                }
            }
        }

        Self { claims }
    }

    /// Returns the claim on a subtype, if any root lists it.
    pub fn claim(&self, subtype: &str) -> Option<&DiscriminatorClaim> {
        self.claims.get(subtype)
    }

    /// Number of indexed subtypes.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Returns `true` if the graph has no subtypes.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl NodeBuilder<'_> {
    /// Builds the union definition of a polymorphic root and returns a
    /// reference to it.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnresolvedHierarchy`] if the root lists no subtypes.
    /// - [`SchemaError::UnsupportedType`] if a subtype is not a plain object.
    pub fn resolve_union(&self, root: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        let Some(poly) = &root.polymorphism else {
            return Err(SchemaError::UnsupportedType {
                identity: root.identity.clone(),
                path: ctx.path.to_string(),
                reason: "not a polymorphic root".to_string(),
            });
        };
        if poly.subtypes.is_empty() {
            return Err(SchemaError::UnresolvedHierarchy {
                identity: root.identity.clone(),
                path: ctx.path.to_string(),
            });
        }

        self.define(root, ctx, |builder, ctx| {
            debug!(
                identity = %root.identity,
                subtypes = poly.subtypes.len(),
                "resolving union"
            );
            let mut node = builder.base_node(None, root, true);
            let mut variants = Vec::with_capacity(poly.subtypes.len());

            for entry in &poly.subtypes {
                let subtype = builder.resolve(&entry.subtype, ctx)?;
                ctx.path.push_variant(&subtype.simple_name());
                let variant = builder.build_variant(subtype, ctx);
                ctx.path.pop();
                variants.push(variant?);
            }

            node.insert("oneOf".to_string(), Value::Array(variants));
            Ok(Value::Object(node))
        })
    }

    fn build_variant(&self, subtype: &TypeDescriptor, ctx: &mut Context) -> Result<Value> {
        if subtype.members.is_none() || subtype.polymorphism.is_some() {
            return Err(SchemaError::UnsupportedType {
                identity: subtype.identity.clone(),
                path: ctx.path.to_string(),
                reason: "subtypes must be object types".to_string(),
            });
        }
        self.build_object(subtype, ctx)
    }

    /// Returns the discriminator a subtype's definition must carry.
    pub(crate) fn discriminator_for(
        &self,
        subtype: &TypeDescriptor,
        ctx: &Context,
    ) -> Result<Option<(String, Value)>> {
        match self.discriminators().claim(&subtype.identity) {
            None => Ok(None),
            Some(DiscriminatorClaim::Single {
                property, value, ..
            }) => Ok(Some((property.clone(), self.discriminator_node(value)))),
            Some(DiscriminatorClaim::Conflicting { roots }) => {
                Err(SchemaError::ConflictingDiscriminator {
                    identity: subtype.identity.clone(),
                    path: ctx.path.to_string(),
                    roots: roots.join(", "),
                })
            }
        }
    }

    fn discriminator_node(&self, value: &str) -> Value {
        if self.config().draft.supports_const() {
            json!({ "const": value })
        } else {
            json!({ "enum": [value] })
        }
    }
}
