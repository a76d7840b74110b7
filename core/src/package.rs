use serde::{Deserialize, Serialize};

use crate::{TypeDescriptor, TypeGraph};

/// Serializable type model bundle used for distribution.
///
/// A package groups the [`TypeDescriptor`] values exported by a reflection
/// tool with version metadata, making it suitable for writing to a single
/// JSON or YAML file and loading later into a [`TypeGraph`].
///
/// # Examples
///
/// ```
/// use typeschema_core::*;
///
/// let mut package = TypeModelPackage::new("1.0.0");
/// package.name = Some("petstore".into());
/// package.types.push(TypeDescriptor::object("com.example.Pet"));
/// package.types.push(TypeDescriptor::enumeration("com.example.Status", ["AVAILABLE", "SOLD"]));
///
/// assert_eq!(package.type_count(), 2);
/// let graph = package.into_graph();
/// assert!(graph.contains("com.example.Status"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeModelPackage {
    /// Model file format version (populated from
    /// [`MODEL_FORMAT_VERSION`](crate::MODEL_FORMAT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    /// Package version (semver string).
    pub version: String,
    /// Optional package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional package description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional ISO-8601 timestamp for package creation.
    #[serde(default)]
    pub generated_at: Option<String>,
    /// Type descriptors included in this package.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

impl TypeModelPackage {
    /// Creates a package with required fields.
    ///
    /// The `format_version` is automatically set from
    /// [`MODEL_FORMAT_VERSION`](crate::MODEL_FORMAT_VERSION).
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            format_version: Some(crate::MODEL_FORMAT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            generated_at: None,
            types: Vec::new(),
        }
    }

    /// Returns the number of types in this package.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Converts the package into a [`TypeGraph`].
    ///
    /// Later descriptors replace earlier ones with the same identity; run
    /// [`validate_package`](crate::validate_package) first to reject
    /// duplicates instead.
    pub fn into_graph(self) -> TypeGraph {
        self.types.into_iter().collect()
    }
}
