//! JSON merge primitives used to apply schema overrides.
//!
//! [`merge_json`] lays a patch document over a target: object-valued keys
//! are merged recursively, scalars and arrays are replaced.
//! [`insert_at_path`] writes a single value at a slash-separated key path.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use typeschema_core::{insert_at_path, merge_json};
//!
//! let mut node = json!({"type": "string", "items": {"type": "integer"}});
//! merge_json(&mut node, &json!({"items": {"minimum": 0}, "minLength": 3}));
//! insert_at_path(&mut node, "items/maximum", json!(9));
//!
//! assert_eq!(
//!     node,
//!     json!({
//!         "type": "string",
//!         "items": {"type": "integer", "minimum": 0, "maximum": 9},
//!         "minLength": 3
//!     })
//! );
//! ```

use serde_json::{Map, Value};

/// Deep-merges `patch` into `target`.
///
/// When both sides are objects, each patch key is merged recursively into
/// the matching target key. Any other combination replaces `target` with a
/// copy of `patch`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typeschema_core::merge_json;
///
/// let mut node = json!({"enum": ["a", "b"], "type": "string"});
/// merge_json(&mut node, &json!({"enum": ["c"]}));
/// assert_eq!(node, json!({"enum": ["c"], "type": "string"}));
/// ```
pub fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                let nested = patch_value.is_object()
                    && target_map.get(key).is_some_and(Value::is_object);
                if !nested {
                    target_map.insert(key.clone(), patch_value.clone());
                } else if let Some(existing) = target_map.get_mut(key) {
                    merge_json(existing, patch_value);
                }
            }
        }
        (target, patch) => {
            *target = patch.clone();
        }
    }
}

/// Writes `value` at a slash-separated key path below `target`.
///
/// Missing intermediate objects are created; intermediate values that are
/// not objects are replaced by empty objects. Empty path segments are
/// skipped, so `"/a//b"` addresses the same key as `"a/b"`. A path with no
/// segments replaces `target` itself.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typeschema_core::insert_at_path;
///
/// let mut node = json!({"type": "object"});
/// insert_at_path(&mut node, "patternProperties/^s[a-z]+$/type", json!("string"));
/// assert_eq!(node["patternProperties"]["^s[a-z]+$"]["type"], "string");
/// ```
pub fn insert_at_path(target: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        *target = value;
        return;
    };

    let mut cursor = target;
    for segment in parents {
        let map = ensure_object(cursor);
        cursor = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(cursor).insert((*last).to_string(), value);
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_merge_replaces_scalars_and_arrays() {
        let mut node = json!({"minLength": 1, "examples": ["a"]});
        merge_json(&mut node, &json!({"minLength": 3, "examples": ["b", "c"]}));
        assert_eq!(node, json!({"minLength": 3, "examples": ["b", "c"]}));
    }

    #[test]
    fn test_merge_recurses_into_objects() {
        let mut node = json!({"properties": {"a": {"type": "string"}}});
        merge_json(
            &mut node,
            &json!({"properties": {"a": {"format": "email"}, "b": {"type": "integer"}}}),
        );
        assert_eq!(
            node,
            json!({"properties": {
                "a": {"type": "string", "format": "email"},
                "b": {"type": "integer"}
            }})
        );
    }

    #[test]
    fn test_merge_object_over_scalar_replaces() {
        let mut node = json!({"items": true});
        merge_json(&mut node, &json!({"items": {"type": "string"}}));
        assert_eq!(node, json!({"items": {"type": "string"}}));
    }

    #[test]
    fn test_merge_keeps_target_key_order() {
        let mut node = json!({"type": "string", "title": "T"});
        merge_json(&mut node, &json!({"pattern": "^a", "type": "integer"}));
        let keys: Vec<&String> = node.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["type", "title", "pattern"]);
    }

    #[test]
    fn test_insert_at_path_replaces_scalar_intermediate() {
        let mut node = json!({"items": "oops"});
        insert_at_path(&mut node, "items/minLength", json!(2));
        assert_eq!(node, json!({"items": {"minLength": 2}}));
    }

    #[test]
    fn test_insert_at_path_skips_empty_segments() {
        let mut node = json!({});
        insert_at_path(&mut node, "/a//b", json!(false));
        assert_eq!(node, json!({"a": {"b": false}}));
    }

    #[test]
    fn test_insert_at_empty_path_replaces_target() {
        let mut node = json!({"type": "string"});
        insert_at_path(&mut node, "", json!({"type": "null"}));
        assert_eq!(node, json!({"type": "null"}));
    }
}
