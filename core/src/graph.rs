//! Identity-keyed collection of type descriptors.

use indexmap::IndexMap;

use crate::{PrimitiveType, TypeDescriptor};

/// Identities registered by [`TypeGraph::with_primitives`].
pub const BUILTIN_PRIMITIVES: &[(&str, PrimitiveType)] = &[
    ("string", PrimitiveType::String),
    ("integer", PrimitiveType::Integer),
    ("number", PrimitiveType::Number),
    ("boolean", PrimitiveType::Boolean),
];

/// The type universe handed to the engine.
///
/// Descriptors are kept in insertion order, which makes every walk over the
/// graph deterministic. Lookups by identity are O(1).
///
/// # Examples
///
/// ```
/// use typeschema_core::{MemberDescriptor, TypeDescriptor, TypeGraph};
///
/// let graph = TypeGraph::with_primitives()
///     .with_type(
///         TypeDescriptor::object("com.example.Node")
///             .with_member(MemberDescriptor::nullable("next", "com.example.Node")),
///     );
///
/// assert!(graph.contains("string"));
/// assert!(graph.get("com.example.Node").is_some());
/// assert_eq!(graph.len(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph pre-populated with the `string`, `integer`, `number`
    /// and `boolean` primitives.
    pub fn with_primitives() -> Self {
        BUILTIN_PRIMITIVES
            .iter()
            .map(|(identity, primitive)| TypeDescriptor::primitive(identity, *primitive))
            .collect()
    }

    /// Inserts a descriptor, returning the one it replaced.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.types.insert(descriptor.identity.clone(), descriptor)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Looks up a descriptor by identity.
    pub fn get(&self, identity: &str) -> Option<&TypeDescriptor> {
        self.types.get(identity)
    }

    /// Returns `true` if `identity` is registered.
    pub fn contains(&self, identity: &str) -> bool {
        self.types.contains_key(identity)
    }

    /// Returns the number of descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the graph holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Iterates over identities in insertion order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl FromIterator<TypeDescriptor> for TypeGraph {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<TypeDescriptor> for TypeGraph {
    fn extend<I: IntoIterator<Item = TypeDescriptor>>(&mut self, iter: I) {
        for descriptor in iter {
            self.insert(descriptor);
        }
    }
}
