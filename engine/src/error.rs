//! Error types for schema generation.
//!
//! Every failure aborts the generation it occurred in and names the
//! offending type identity (or supplier) together with the member path that
//! led to it.

use std::fmt;

use thiserror::Error;

/// Location inside the type walk, rendered like `Zoo.animals[]<Cat>.name`.
///
/// Segments are `.member` for object members, `[]` for collection items,
/// `{}` for map values and `<Subtype>` for polymorphic variants, appended to
/// the simple name of the root type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPath {
    segments: Vec<String>,
}

impl SchemaPath {
    /// Starts a path at a root type.
    pub fn root(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    /// Descends into an object member.
    pub fn push_member(&mut self, name: &str) {
        self.segments.push(format!(".{name}"));
    }

    /// Descends into collection items.
    pub fn push_items(&mut self) {
        self.segments.push("[]".to_string());
    }

    /// Descends into map values.
    pub fn push_values(&mut self) {
        self.segments.push("{}".to_string());
    }

    /// Descends into a polymorphic variant.
    pub fn push_variant(&mut self, name: &str) {
        self.segments.push(format!("<{name}>"));
    }

    /// Leaves the innermost segment.
    pub fn pop(&mut self) {
        if self.segments.len() > 1 {
            self.segments.pop();
        }
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for segment in &self.segments {
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Errors that abort schema generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A polymorphic root declares no subtypes.
    #[error("polymorphic type `{identity}` declares no subtypes (at {path})")]
    UnresolvedHierarchy {
        /// Identity of the polymorphic root.
        identity: String,
        /// Member path to the root.
        path: String,
    },

    /// An override supplier is unknown, failed, or returned invalid JSON.
    #[error("injection supplier `{supplier}` failed for `{identity}` at {path}: {reason}")]
    InjectionSupplier {
        /// Supplier name.
        supplier: String,
        /// Identity of the type owning the override.
        identity: String,
        /// Member path the override was attached to.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// A descriptor cannot be classified into any schema category.
    #[error("type `{identity}` cannot be mapped to a schema (at {path}): {reason}")]
    UnsupportedType {
        /// Identity of the offending descriptor.
        identity: String,
        /// Member path to the descriptor.
        path: String,
        /// Why classification failed.
        reason: String,
    },

    /// Two distinct types produce the same definition name even after
    /// qualification.
    #[error("definition name `{name}` is claimed by both `{first}` and `{second}`")]
    DefinitionNameCollision {
        /// The contested definition name.
        name: String,
        /// Identity that owns the name.
        first: String,
        /// Identity that asked for it second.
        second: String,
    },

    /// A referenced identity is not part of the type graph.
    #[error("type `{identity}` referenced at {path} is not in the type graph")]
    UnknownType {
        /// The missing identity.
        identity: String,
        /// Member path of the reference.
        path: String,
    },

    /// A raw JSON override does not parse or is not an object.
    #[error("invalid injected JSON for `{identity}` at {path}: {reason}")]
    InvalidInjection {
        /// Identity of the type owning the override.
        identity: String,
        /// Member path the override was attached to.
        path: String,
        /// Parse failure or shape problem.
        reason: String,
    },

    /// A subtype is claimed by several hierarchies with different
    /// discriminators.
    #[error("subtype `{identity}` has conflicting discriminators from {roots} (at {path})")]
    ConflictingDiscriminator {
        /// Identity of the subtype.
        identity: String,
        /// Member path to the subtype.
        path: String,
        /// Comma-separated identities of the claiming roots.
        roots: String,
    },
}

impl SchemaError {
    /// Returns the identity of the offending type, when the error has one.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::UnresolvedHierarchy { identity, .. }
            | Self::InjectionSupplier { identity, .. }
            | Self::UnsupportedType { identity, .. }
            | Self::UnknownType { identity, .. }
            | Self::InvalidInjection { identity, .. }
            | Self::ConflictingDiscriminator { identity, .. } => Some(identity),
            Self::DefinitionNameCollision { .. } => None,
        }
    }

    /// Returns the member path the error occurred at, when the error has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnresolvedHierarchy { path, .. }
            | Self::InjectionSupplier { path, .. }
            | Self::UnsupportedType { path, .. }
            | Self::UnknownType { path, .. }
            | Self::InvalidInjection { path, .. }
            | Self::ConflictingDiscriminator { path, .. } => Some(path),
            Self::DefinitionNameCollision { .. } => None,
        }
    }
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let mut path = SchemaPath::root("Zoo");
        path.push_member("animals");
        path.push_items();
        path.push_variant("Cat");
        path.push_member("name");
        assert_eq!(path.to_string(), "Zoo.animals[]<Cat>.name");
        assert_eq!(path.depth(), 4);

        path.pop();
        path.pop();
        path.push_values();
        assert_eq!(path.to_string(), "Zoo.animals[]{}");
    }

    #[test]
    fn test_pop_keeps_root() {
        let mut path = SchemaPath::root("Zoo");
        path.pop();
        assert_eq!(path.to_string(), "Zoo");
        assert_eq!(SchemaPath::default().to_string(), "<root>");
    }

    #[test]
    fn test_error_accessors() {
        let err = SchemaError::UnresolvedHierarchy {
            identity: "zoo.Animal".into(),
            path: "Zoo.animal".into(),
        };
        assert_eq!(err.identity(), Some("zoo.Animal"));
        assert_eq!(err.path(), Some("Zoo.animal"));
        assert!(err.to_string().contains("declares no subtypes"));
    }
}
