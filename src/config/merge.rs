//! Deep merge of JSON configuration values.
//!
//! Objects merge key by key, recursively. Everything else in the patch,
//! arrays included, replaces the target value wholesale.

use serde_json::Value;

/// Merge `patch` into `target` in place.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// `base` with `patch` merged over it.
pub fn merged(base: &Value, patch: &Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, patch);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_merge() {
        let mut base = json!({ "a": 1, "nested": { "x": 1, "y": 2 } });
        deep_merge(&mut base, &json!({ "nested": { "y": 3, "z": 4 } }));
        assert_eq!(base, json!({ "a": 1, "nested": { "x": 1, "y": 3, "z": 4 } }));
    }

    #[test]
    fn test_arrays_are_replaced() {
        let base = json!({ "list": [1, 2, 3] });
        assert_eq!(merged(&base, &json!({ "list": [9] })), json!({ "list": [9] }));
    }

    #[test]
    fn test_scalar_replaces_object() {
        let base = json!({ "easing": { "name": "bezier" } });
        assert_eq!(merged(&base, &json!({ "easing": "linear" })), json!({ "easing": "linear" }));
    }

    #[test]
    fn test_null_patch_value_replaces() {
        let base = json!({ "limit": 5 });
        assert_eq!(merged(&base, &json!({ "limit": null })), json!({ "limit": null }));
    }

    #[test]
    fn test_base_is_untouched() {
        let base = json!({ "a": { "b": 1 } });
        let _ = merged(&base, &json!({ "a": { "b": 2 } }));
        assert_eq!(base, json!({ "a": { "b": 1 } }));
    }
}
