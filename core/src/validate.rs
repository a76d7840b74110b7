//! Type graph and package validation.
//!
//! Validates structural invariants of a type model before it reaches the
//! engine, catching dangling type references, duplicate members, malformed
//! hierarchies, and descriptors the classifier cannot categorize.
//!
//! # Examples
//!
//! ```
//! use typeschema_core::*;
//!
//! let graph = TypeGraph::with_primitives()
//!     .with_type(TypeDescriptor::object("a.User").with_member(MemberDescriptor::required("id", "integer")));
//! assert!(validate_graph(&graph).is_empty());
//!
//! // Invalid: member type is not in the graph
//! let bad = TypeGraph::new()
//!     .with_type(TypeDescriptor::object("a.User").with_member(MemberDescriptor::required("id", "integer")));
//! assert!(!validate_graph(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{TypeDescriptor, TypeGraph, TypeModelPackage};

/// Type model validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package version string is empty.
    #[error("package version cannot be empty")]
    EmptyPackageVersion,
    /// Two descriptors in the same package share an identity.
    #[error("duplicate type in package: {0}")]
    DuplicateType(String),
    /// A descriptor identity is empty or whitespace-only.
    #[error("type identity cannot be empty")]
    EmptyIdentity,
    /// A descriptor carries no category signal at all.
    #[error("type `{0}` declares no primitive, enum, collection, map, object, polymorphic or optional shape")]
    MissingSignal(String),
    /// A descriptor refers to an identity absent from the graph.
    #[error("type `{from}` references unknown type `{target}`")]
    UnresolvedReference {
        /// Identity of the referring descriptor.
        from: String,
        /// The missing identity.
        target: String,
    },
    /// A member name is empty.
    #[error("type `{0}` has a member with an empty name")]
    EmptyMemberName(String),
    /// Two members of the same object share a name.
    #[error("type `{identity}` declares member `{member}` more than once")]
    DuplicateMember {
        /// Identity of the object type.
        identity: String,
        /// The duplicated member name.
        member: String,
    },
    /// A polymorphic root has an empty discriminator property.
    #[error("polymorphic type `{0}` has an empty discriminator property")]
    EmptyDiscriminatorProperty(String),
    /// Two subtypes of one root resolve to the same discriminator value.
    #[error("polymorphic type `{root}` uses discriminator value `{value}` more than once")]
    DuplicateDiscriminatorValue {
        /// Identity of the polymorphic root.
        root: String,
        /// The duplicated value.
        value: String,
    },
    /// A subtype does not declare members, so no variant can be built.
    #[error("subtype `{subtype}` of `{root}` is not an object type")]
    SubtypeNotObject {
        /// Identity of the polymorphic root.
        root: String,
        /// Identity of the offending subtype.
        subtype: String,
    },
}

/// Validates a full type model package.
///
/// Checks for an empty version string and duplicate identities, then
/// validates the resulting graph.
///
/// # Examples
///
/// ```
/// use typeschema_core::*;
///
/// let mut package = TypeModelPackage::new("1.0.0");
/// package.types.push(TypeDescriptor::object("a.User"));
/// assert!(validate_package(&package).is_empty());
///
/// // Duplicate identity → error
/// package.types.push(TypeDescriptor::object("a.User"));
/// let errors = validate_package(&package);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateType(_))));
/// ```
pub fn validate_package(package: &TypeModelPackage) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if package.version.trim().is_empty() {
        errors.push(ValidationError::EmptyPackageVersion);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for descriptor in &package.types {
        if !seen.insert(descriptor.identity.as_str()) {
            errors.push(ValidationError::DuplicateType(descriptor.identity.clone()));
            return errors;
        }
    }

    let graph: TypeGraph = package.types.iter().cloned().collect();
    validate_graph(&graph)
}

/// Validates every descriptor of a type graph.
///
/// Stops at the first problem and returns it; an empty vector means the
/// graph is structurally sound.
pub fn validate_graph(graph: &TypeGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for descriptor in graph.iter() {
        errors.extend(validate_descriptor(graph, descriptor));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_descriptor(graph: &TypeGraph, descriptor: &TypeDescriptor) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let identity = descriptor.identity.as_str();

    if identity.trim().is_empty() {
        errors.push(ValidationError::EmptyIdentity);
        return errors;
    }

    if !descriptor.has_signal() {
        errors.push(ValidationError::MissingSignal(identity.to_string()));
        return errors;
    }

    if let Some(target) = descriptor
        .referenced_types()
        .into_iter()
        .find(|target| !graph.contains(target))
    {
        errors.push(ValidationError::UnresolvedReference {
            from: identity.to_string(),
            target: target.to_string(),
        });
        return errors;
    }

    if let Some(members) = &descriptor.members {
        let mut seen: HashSet<&str> = HashSet::new();
        for member in members {
            if member.name.trim().is_empty() {
                errors.push(ValidationError::EmptyMemberName(identity.to_string()));
                return errors;
            }
            if !seen.insert(member.name.as_str()) {
                errors.push(ValidationError::DuplicateMember {
                    identity: identity.to_string(),
                    member: member.name.clone(),
                });
                return errors;
            }
        }
    }

    if let Some(poly) = &descriptor.polymorphism {
        if poly.property.trim().is_empty() {
            errors.push(ValidationError::EmptyDiscriminatorProperty(
                identity.to_string(),
            ));
            return errors;
        }

        let mut values: HashSet<String> = HashSet::new();
        for entry in &poly.subtypes {
            let value = poly.value_for(entry);
            if !values.insert(value.clone()) {
                errors.push(ValidationError::DuplicateDiscriminatorValue {
                    root: identity.to_string(),
                    value,
                });
                return errors;
            }

            let is_object = graph
                .get(&entry.subtype)
                .is_some_and(|sub| sub.members.is_some() && sub.polymorphism.is_none());
            if !is_object {
                errors.push(ValidationError::SubtypeNotObject {
                    root: identity.to_string(),
                    subtype: entry.subtype.clone(),
                });
                return errors;
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use crate::MemberDescriptor;

    use super::*;

    fn zoo() -> TypeGraph {
        TypeGraph::with_primitives()
            .with_type(
                TypeDescriptor::polymorphic("zoo.Animal", "kind")
                    .with_subtype("zoo.Cat", "cat")
                    .with_subtype("zoo.Dog", "dog"),
            )
            .with_type(
                TypeDescriptor::object("zoo.Cat")
                    .with_member(MemberDescriptor::required("lives", "integer")),
            )
            .with_type(
                TypeDescriptor::object("zoo.Dog")
                    .with_member(MemberDescriptor::nullable("owner", "string")),
            )
    }

    #[test]
    fn test_validate_graph_accepts_hierarchy() {
        assert!(validate_graph(&zoo()).is_empty());
    }

    #[test]
    fn test_validate_graph_rejects_duplicate_member() {
        let graph = TypeGraph::with_primitives().with_type(
            TypeDescriptor::object("a.User")
                .with_member(MemberDescriptor::required("id", "integer"))
                .with_member(MemberDescriptor::nullable("id", "string")),
        );
        assert_eq!(
            validate_graph(&graph),
            vec![ValidationError::DuplicateMember {
                identity: "a.User".to_string(),
                member: "id".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_graph_rejects_duplicate_discriminator_value() {
        let graph = zoo().with_type(
            TypeDescriptor::polymorphic("zoo.Animal", "kind")
                .with_subtype("zoo.Cat", "pet")
                .with_subtype("zoo.Dog", "pet"),
        );
        assert_eq!(
            validate_graph(&graph),
            vec![ValidationError::DuplicateDiscriminatorValue {
                root: "zoo.Animal".to_string(),
                value: "pet".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_graph_rejects_non_object_subtype() {
        let graph = zoo()
            .with_type(TypeDescriptor::enumeration("zoo.Cat", ["TABBY"]));
        assert_eq!(
            validate_graph(&graph),
            vec![ValidationError::SubtypeNotObject {
                root: "zoo.Animal".to_string(),
                subtype: "zoo.Cat".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_graph_rejects_missing_signal() {
        let graph = TypeGraph::new().with_type(TypeDescriptor {
            identity: "a.Opaque".to_string(),
            ..Default::default()
        });
        assert_eq!(
            validate_graph(&graph),
            vec![ValidationError::MissingSignal("a.Opaque".to_string())]
        );
    }

    #[test]
    fn test_validate_package_rejects_empty_version() {
        let package = TypeModelPackage::new(" ");
        assert_eq!(
            validate_package(&package),
            vec![ValidationError::EmptyPackageVersion]
        );
    }
}
