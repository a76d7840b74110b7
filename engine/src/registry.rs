//! Per-generation definition registry.
//!
//! Tracks every named type (objects, enums, polymorphic roots) reached during
//! one generation. An identity moves from not started to in progress when
//! its expansion begins and to done once its node is stored. A reference to
//! an identity that is in progress is how recursive types terminate.

use std::collections::HashMap;

use serde_json::{Map, Value, json};
use tracing::warn;
use typeschema_core::TypeDescriptor;

use crate::config::GeneratorConfig;
use crate::error::{Result, SchemaError};

/// Generation state of one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Never reached.
    NotStarted,
    /// Expansion has begun but not finished.
    InProgress,
    /// The definition node is stored.
    Done,
}

/// Registry record of one identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    /// Definition name used in the definitions map and in `$ref`.
    pub name: String,
    /// Current state.
    pub state: GenerationState,
    /// Definition node, present once done.
    pub node: Option<Value>,
}

/// Definitions of one generation, keyed by identity.
///
/// # Examples
///
/// ```
/// use typeschema_core::TypeDescriptor;
/// use typeschema_engine::{DefinitionRegistry, GenerationState};
///
/// let mut registry = DefinitionRegistry::new("#/definitions/", false);
/// let user = TypeDescriptor::object("com.example.User");
///
/// let name = registry.begin(&user).unwrap();
/// assert_eq!(name, "User");
/// assert_eq!(registry.state("com.example.User"), GenerationState::InProgress);
///
/// registry.complete("com.example.User", serde_json::json!({"type": "object"}));
/// assert_eq!(
///     registry.reference("com.example.User").unwrap(),
///     serde_json::json!({"$ref": "#/definitions/User"})
/// );
/// ```
#[derive(Debug)]
pub struct DefinitionRegistry {
    entries: HashMap<String, RegistryEntry>,
    owners: HashMap<String, String>,
    ref_prefix: &'static str,
    qualified_names: bool,
}

impl DefinitionRegistry {
    /// Creates an empty registry.
    pub fn new(ref_prefix: &'static str, qualified_names: bool) -> Self {
        Self {
            entries: HashMap::new(),
            owners: HashMap::new(),
            ref_prefix,
            qualified_names,
        }
    }

    /// Creates an empty registry for a configuration's draft and naming.
    pub fn for_config(config: &GeneratorConfig) -> Self {
        Self::new(config.draft.ref_prefix(), config.qualified_definition_names)
    }

    /// Returns the entry of an identity.
    pub fn get(&self, identity: &str) -> Option<&RegistryEntry> {
        self.entries.get(identity)
    }

    /// Returns the state of an identity.
    pub fn state(&self, identity: &str) -> GenerationState {
        self.entries
            .get(identity)
            .map_or(GenerationState::NotStarted, |entry| entry.state)
    }

    /// Marks an identity in progress and assigns its definition name.
    ///
    /// The name is the sanitized simple name, or the sanitized identity when
    /// qualified names are configured. If another identity already owns the
    /// simple name the full identity is used instead. An identity that was
    /// already begun keeps its name and state.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DefinitionNameCollision`] when even the
    /// qualified name is taken.
    pub fn begin(&mut self, descriptor: &TypeDescriptor) -> Result<String> {
        let identity = descriptor.identity.as_str();
        if let Some(entry) = self.entries.get(identity) {
            return Ok(entry.name.clone());
        }

        let preferred = definition_name(descriptor, self.qualified_names);
        let name = match self.owners.get(&preferred) {
            None => preferred,
            Some(owner) => {
                let qualified = sanitize(identity);
                if let Some(other) = self.owners.get(&qualified) {
                    return Err(SchemaError::DefinitionNameCollision {
                        name: qualified,
                        first: other.clone(),
                        second: identity.to_string(),
                    });
                }
                warn!(
                    identity,
                    owner = %owner,
                    name = %qualified,
                    "definition name taken, using qualified name"
                );
                qualified
            }
        };

        self.owners.insert(name.clone(), identity.to_string());
        self.entries.insert(
            identity.to_string(),
            RegistryEntry {
                name: name.clone(),
                state: GenerationState::InProgress,
                node: None,
            },
        );
        Ok(name)
    }

    /// Stores the finished node of an in-progress identity.
    ///
    /// Completing an identity that was never begun is a caller bug: it
    /// panics in debug builds and is logged and dropped otherwise.
    pub fn complete(&mut self, identity: &str, node: Value) {
        debug_assert!(
            self.entries.contains_key(identity),
            "completed identity {identity} was never begun"
        );
        match self.entries.get_mut(identity) {
            Some(entry) => {
                entry.state = GenerationState::Done;
                entry.node = Some(node);
            }
            None => warn!(identity, "dropping node of an identity that was never begun"),
        }
    }

    /// Returns a `$ref` node for an in-progress or done identity.
    pub fn reference(&self, identity: &str) -> Option<Value> {
        self.entries
            .get(identity)
            .map(|entry| self.reference_to(&entry.name))
    }

    /// Returns a `$ref` node for a definition name.
    pub fn reference_to(&self, name: &str) -> Value {
        json!({ "$ref": format!("{}{}", self.ref_prefix, escape_pointer(name)) })
    }

    /// Number of identities begun so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no identity was begun.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the registry into the definitions map, sorted by name.
    ///
    /// Only done entries are included.
    pub fn into_definitions(self) -> Map<String, Value> {
        let mut done: Vec<(String, Value)> = self
            .entries
            .into_values()
            .filter(|entry| entry.state == GenerationState::Done)
            .filter_map(|entry| entry.node.map(|node| (entry.name, node)))
            .collect();
        done.sort_by(|a, b| a.0.cmp(&b.0));
        done.into_iter().collect()
    }
}

/// Returns the preferred definition name of a descriptor.
///
/// # Examples
///
/// ```
/// use typeschema_core::TypeDescriptor;
/// use typeschema_engine::definition_name;
///
/// let page = TypeDescriptor::object("com.x.Page<com.x.User>");
/// assert_eq!(definition_name(&page, false), "Page(User)");
/// assert_eq!(definition_name(&page, true), "com.x.Page(com.x.User)");
/// ```
pub fn definition_name(descriptor: &TypeDescriptor, qualified: bool) -> String {
    if qualified {
        sanitize(&descriptor.identity)
    } else {
        sanitize(&descriptor.simple_name())
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| match ch {
            '<' => '(',
            '>' => ')',
            other => other,
        })
        .collect()
}

/// Escapes a definition name for use as a JSON Pointer token.
pub fn escape_pointer(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}
