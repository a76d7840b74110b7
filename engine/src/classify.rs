//! Descriptor classification.
//!
//! Maps a [`TypeDescriptor`] onto exactly one schema category. Descriptors
//! may carry several signals; the first match in this order wins:
//! polymorphic root, enum, map, collection, object, primitive. Optional
//! wrappers are unwrapped before classification and mark the result
//! nullable.

use typeschema_core::{PrimitiveType, TypeDescriptor, TypeGraph};

use crate::error::{SchemaError, SchemaPath};

/// Schema category of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Root of a discriminated hierarchy, rendered as `oneOf`.
    Polymorphic,
    /// String enumeration, rendered as a named definition.
    Enum,
    /// String-keyed map, rendered with `additionalProperties`.
    Map,
    /// List or set, rendered with `items`.
    Collection,
    /// Record with members, rendered as a named definition.
    Object,
    /// Scalar, rendered inline.
    Primitive(PrimitiveType),
}

/// Result of classifying a descriptor.
#[derive(Debug, Clone)]
pub struct Classified<'g> {
    /// The descriptor the category applies to, after unwrapping optionals.
    pub descriptor: &'g TypeDescriptor,
    /// Resolved category.
    pub category: Category,
    /// `true` when at least one optional wrapper was unwrapped.
    pub nullable: bool,
    /// Unwrapped optional wrappers, outermost first.
    pub wrappers: Vec<&'g TypeDescriptor>,
}

/// Classification failure, before it is attached to a member path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// The identity is not in the graph.
    Unknown(String),
    /// The descriptor carries no usable signal.
    Unsupported {
        /// Offending identity.
        identity: String,
        /// Why it cannot be classified.
        reason: String,
    },
}

impl ClassifyError {
    /// Converts into a [`SchemaError`] located at `path`.
    pub fn at(self, path: &SchemaPath) -> SchemaError {
        match self {
            Self::Unknown(identity) => SchemaError::UnknownType {
                identity,
                path: path.to_string(),
            },
            Self::Unsupported { identity, reason } => SchemaError::UnsupportedType {
                identity,
                path: path.to_string(),
                reason,
            },
        }
    }
}

/// Returns the category of a descriptor's own signals, ignoring optional
/// wrapping.
///
/// # Examples
///
/// ```
/// use typeschema_core::{MemberDescriptor, TypeDescriptor};
/// use typeschema_engine::{Category, category_of};
///
/// let tagged = TypeDescriptor::object("a.Shape")
///     .with_member(MemberDescriptor::required("id", "string"));
/// assert_eq!(category_of(&tagged), Some(Category::Object));
///
/// // A root that also declares members is still a union
/// let mut root = tagged.clone();
/// root.polymorphism = TypeDescriptor::polymorphic("a.Shape", "kind").polymorphism;
/// assert_eq!(category_of(&root), Some(Category::Polymorphic));
/// ```
pub fn category_of(descriptor: &TypeDescriptor) -> Option<Category> {
    if descriptor.polymorphism.is_some() {
        Some(Category::Polymorphic)
    } else if descriptor.enum_constants.is_some() {
        Some(Category::Enum)
    } else if descriptor.map_value.is_some() {
        Some(Category::Map)
    } else if descriptor.element.is_some() {
        Some(Category::Collection)
    } else if descriptor.members.is_some() {
        Some(Category::Object)
    } else {
        descriptor.primitive.map(Category::Primitive)
    }
}

/// Classifies a descriptor, following optional wrappers through the graph.
///
/// A chain of wrappers longer than the graph can only be a wrapper cycle and
/// is reported as unsupported.
pub fn classify<'g>(
    graph: &'g TypeGraph,
    descriptor: &'g TypeDescriptor,
) -> Result<Classified<'g>, ClassifyError> {
    let mut current = descriptor;
    let mut wrappers = Vec::new();

    while let Some(inner) = &current.optional_of {
        wrappers.push(current);
        if wrappers.len() > graph.len() {
            return Err(ClassifyError::Unsupported {
                identity: descriptor.identity.clone(),
                reason: "optional wrappers form a cycle".to_string(),
            });
        }
        current = graph
            .get(inner)
            .ok_or_else(|| ClassifyError::Unknown(inner.clone()))?;
    }

    let category = category_of(current).ok_or_else(|| ClassifyError::Unsupported {
        identity: current.identity.clone(),
        reason: "no primitive, enum, collection, map, object or polymorphic signal".to_string(),
    })?;

    Ok(Classified {
        descriptor: current,
        category,
        nullable: !wrappers.is_empty(),
        wrappers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeschema_core::MemberDescriptor;

    #[test]
    fn test_precedence() {
        let mut desc = TypeDescriptor::object("a.Both")
            .with_member(MemberDescriptor::required("id", "string"));
        desc.enum_constants = Some(vec!["A".into()]);
        desc.primitive = Some(PrimitiveType::String);
        assert_eq!(category_of(&desc), Some(Category::Enum));

        desc.enum_constants = None;
        desc.element = Some("string".into());
        desc.map_value = Some("string".into());
        assert_eq!(category_of(&desc), Some(Category::Map));

        desc.map_value = None;
        assert_eq!(category_of(&desc), Some(Category::Collection));
    }

    #[test]
    fn test_optional_unwraps_and_marks_nullable() {
        let graph = TypeGraph::with_primitives()
            .with_type(TypeDescriptor::optional("Optional<Integer>", "integer"))
            .with_type(TypeDescriptor::optional("Optional<Optional<Integer>>", "Optional<Integer>"));

        let outer = graph.get("Optional<Optional<Integer>>").unwrap();
        let classified = classify(&graph, outer).unwrap();
        assert!(classified.nullable);
        assert_eq!(classified.descriptor.identity, "integer");
        let wrappers: Vec<&str> = classified
            .wrappers
            .iter()
            .map(|w| w.identity.as_str())
            .collect();
        assert_eq!(wrappers, ["Optional<Optional<Integer>>", "Optional<Integer>"]);
        assert_eq!(
            classified.category,
            Category::Primitive(PrimitiveType::Integer)
        );
    }

    #[test]
    fn test_plain_descriptor_not_nullable() {
        let graph = TypeGraph::with_primitives();
        let classified = classify(&graph, graph.get("boolean").unwrap()).unwrap();
        assert!(!classified.nullable);
        assert!(classified.wrappers.is_empty());
    }

    #[test]
    fn test_wrapper_cycle_is_unsupported() {
        let graph = TypeGraph::new()
            .with_type(TypeDescriptor::optional("A", "B"))
            .with_type(TypeDescriptor::optional("B", "A"));
        let err = classify(&graph, graph.get("A").unwrap()).unwrap_err();
        assert!(matches!(err, ClassifyError::Unsupported { identity, .. } if identity == "A"));
    }

    #[test]
    fn test_dangling_wrapper_is_unknown() {
        let graph = TypeGraph::new().with_type(TypeDescriptor::optional("A", "missing.B"));
        let err = classify(&graph, graph.get("A").unwrap()).unwrap_err();
        assert_eq!(err, ClassifyError::Unknown("missing.B".into()));

        let located = err.at(&SchemaPath::root("Owner"));
        assert_eq!(located.path(), Some("Owner"));
    }

    #[test]
    fn test_no_signal_is_unsupported() {
        let graph = TypeGraph::new();
        let opaque = TypeDescriptor {
            identity: "a.Opaque".into(),
            ..Default::default()
        };
        assert!(matches!(
            classify(&graph, &opaque),
            Err(ClassifyError::Unsupported { .. })
        ));
    }
}
