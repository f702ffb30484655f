use serde_json::Value;

/// Merges `patch` into `base`. Objects merge key by key, arrays
/// concatenate, everything else is overwritten by the patch side.
pub(crate) fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, patch_value),
                    None => {
                        base_map.insert(key, patch_value);
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(patch_items)) => {
            base_items.extend(patch_items);
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::deep_merge;

    #[test]
    fn merges_nested_objects() {
        let mut base = json!({"a": {"x": 1, "y": 2}, "keep": true});
        deep_merge(&mut base, json!({"a": {"y": 3, "z": 4}}));
        assert_eq!(base, json!({"a": {"x": 1, "y": 3, "z": 4}, "keep": true}));
    }

    #[test]
    fn concatenates_arrays() {
        let mut base = json!({"items": [1, 2]});
        deep_merge(&mut base, json!({"items": [3]}));
        assert_eq!(base, json!({"items": [1, 2, 3]}));
    }

    #[test]
    fn scalars_are_overwritten() {
        let mut base = json!({"name": "old", "count": 1});
        deep_merge(&mut base, json!({"name": "new"}));
        assert_eq!(base, json!({"name": "new", "count": 1}));
    }

    #[test]
    fn mismatched_shapes_take_the_patch_side() {
        let mut base = json!({"value": [1, 2]});
        deep_merge(&mut base, json!({"value": {"a": 1}}));
        assert_eq!(base, json!({"value": {"a": 1}}));
    }
}
