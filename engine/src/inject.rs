//! Schema override injection.
//!
//! Applies an [`OverrideDeclaration`] on top of a generated node. The raw
//! JSON fragment is merged first, then each key/value pair in order, then
//! the output of the named supplier, so later forms win on conflicting keys.
//! Objects merge recursively; scalars and arrays are replaced.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use typeschema_core::{OverrideDeclaration, insert_at_path, merge_json};

use crate::error::{Result, SchemaError, SchemaPath};

/// Error type suppliers may fail with.
pub type SupplierError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of a supplier.
pub type SupplierResult = std::result::Result<Value, SupplierError>;

type SupplierFn = dyn Fn() -> SupplierResult + Send + Sync;

/// Named producers of schema fragments.
///
/// A supplier returns a JSON object merged into the node its declaration is
/// attached to, or `null` for no change. Registries are cheap to clone and
/// safe to share across threads.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typeschema_engine::SupplierRegistry;
///
/// let suppliers = SupplierRegistry::new()
///     .with("username-pattern", || Ok(json!({"pattern": "^[a-z]+$"})));
/// assert!(suppliers.contains("username-pattern"));
/// assert_eq!(suppliers.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct SupplierRegistry {
    suppliers: HashMap<String, Arc<SupplierFn>>,
}

impl SupplierRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a supplier, replacing any previous one with that name.
    pub fn register<F>(&mut self, name: impl Into<String>, supplier: F)
    where
        F: Fn() -> SupplierResult + Send + Sync + 'static,
    {
        self.suppliers.insert(name.into(), Arc::new(supplier));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> SupplierResult + Send + Sync + 'static,
    {
        self.register(name, supplier);
        self
    }

    /// Returns `true` if a supplier with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.suppliers.contains_key(name)
    }

    /// Number of registered suppliers.
    pub fn len(&self) -> usize {
        self.suppliers.len()
    }

    /// Returns `true` if no supplier is registered.
    pub fn is_empty(&self) -> bool {
        self.suppliers.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.suppliers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn invoke(&self, name: &str) -> Option<SupplierResult> {
        self.suppliers.get(name).map(|supplier| supplier())
    }
}

impl fmt::Debug for SupplierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplierRegistry")
            .field("suppliers", &self.names())
            .finish()
    }
}

/// Merges an override declaration into a generated node.
///
/// `identity` names the type owning the declaration and `path` the member
/// it is attached to; both end up in errors.
///
/// # Errors
///
/// - [`SchemaError::InvalidInjection`] if the raw JSON does not parse or is
///   not an object.
/// - [`SchemaError::InjectionSupplier`] if the supplier is not registered,
///   fails, or returns something other than an object or `null`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typeschema_core::OverrideDeclaration;
/// use typeschema_engine::{SchemaPath, SupplierRegistry, merge_overrides};
///
/// let decl = OverrideDeclaration::new()
///     .with_json(r#"{"minLength": 3}"#)
///     .with_int("maxLength", 10);
/// let node = merge_overrides(
///     json!({"type": "string"}),
///     &decl,
///     &SupplierRegistry::new(),
///     "a.User",
///     &SchemaPath::root("User"),
/// )
/// .unwrap();
/// assert_eq!(node, json!({"type": "string", "minLength": 3, "maxLength": 10}));
/// ```
pub fn merge_overrides(
    mut target: Value,
    declaration: &OverrideDeclaration,
    suppliers: &SupplierRegistry,
    identity: &str,
    path: &SchemaPath,
) -> Result<Value> {
    if declaration.is_empty() {
        return Ok(target);
    }
    debug!(identity, path = %path, "applying schema overrides");

    if let Some(raw) = &declaration.json {
        let fragment: Value =
            serde_json::from_str(raw).map_err(|e| SchemaError::InvalidInjection {
                identity: identity.to_string(),
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        if !fragment.is_object() {
            return Err(SchemaError::InvalidInjection {
                identity: identity.to_string(),
                path: path.to_string(),
                reason: "injected JSON must be an object".to_string(),
            });
        }
        merge_json(&mut target, &fragment);
    }

    for pair in &declaration.pairs {
        insert_at_path(&mut target, &pair.path, pair.value.to_json());
    }

    if let Some(name) = &declaration.supplier {
        let supplier_error = |reason: String| SchemaError::InjectionSupplier {
            supplier: name.clone(),
            identity: identity.to_string(),
            path: path.to_string(),
            reason,
        };

        let fragment = suppliers
            .invoke(name)
            .ok_or_else(|| supplier_error("no supplier registered under this name".to_string()))?
            .map_err(|e| supplier_error(e.to_string()))?;

        match fragment {
            Value::Null => {}
            Value::Object(_) => merge_json(&mut target, &fragment),
            other => {
                return Err(supplier_error(format!(
                    "supplier must return an object or null, got {other}"
                )));
            }
        }
    }

    Ok(target)
}
