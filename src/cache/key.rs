//! Deterministic cache keys.

use std::collections::BTreeMap;

use serde_json::Value;

/// Build a cache key from a prefix and a flat set of parameters.
///
/// Format: `"{prefix}:{name}:{json}:{name}:{json}..."` with parameter names
/// sorted, so any permutation of the same pairs produces the same key.
/// Values are rendered as compact JSON with object keys sorted at every
/// depth, whatever map ordering `serde_json` was built with. If a name
/// repeats, the last value wins.
///
/// ```rust
/// # use larder::cache::generate_key;
/// # use serde_json::json;
/// let a = generate_key("find", [("number", json!(5)), ("ingredients", json!(["egg"]))]);
/// let b = generate_key("find", [("ingredients", json!(["egg"])), ("number", json!(5))]);
/// assert_eq!(a, b);
/// assert_eq!(a, r#"find:ingredients:["egg"]:number:5"#);
/// ```
pub fn generate_key<I, K>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let sorted: BTreeMap<String, Value> = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v))
        .collect();

    let mut key = prefix.to_string();
    for (name, value) in &sorted {
        key.push(':');
        key.push_str(name);
        key.push(':');
        key.push_str(&canonical(value).to_string());
    }
    key
}

/// `value` with every object's keys in sorted order.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deeply_nested_objects_are_sorted() {
        let key = generate_key(
            "plan",
            [("profile", json!({"z": [{"y": 1, "x": 2}], "a": {"d": 0, "c": null}}))],
        );
        assert_eq!(key, r#"plan:profile:{"a":{"c":null,"d":0},"z":[{"x":2,"y":1}]}"#);
    }

    #[test]
    fn empty_params_is_prefix() {
        assert_eq!(generate_key("details", Vec::<(&str, Value)>::new()), "details");
    }

    #[test]
    fn strings_are_json_quoted() {
        assert_eq!(
            generate_key("search", [("query", json!("pasta"))]),
            r#"search:query:"pasta""#
        );
    }

    #[test]
    fn prefix_distinguishes_keys() {
        let params = || [("id", json!(42))];
        assert_ne!(generate_key("details", params()), generate_key("search", params()));
    }

    #[test]
    fn nested_objects_are_stable() {
        let a = generate_key("k", [("filter", json!({"b": 1, "a": 2}))]);
        let b = generate_key("k", [("filter", json!({"a": 2, "b": 1}))]);
        assert_eq!(a, b);
        assert_eq!(a, r#"k:filter:{"a":2,"b":1}"#);
    }

    #[test]
    fn object_map_permutations_match() {
        let p1 = json!({"a": 1, "b": 2});
        let p2 = json!({"b": 2, "a": 1});
        let m1 = p1.as_object().cloned().unwrap_or_default();
        let m2 = p2.as_object().cloned().unwrap_or_default();
        assert_eq!(generate_key("x", m1), generate_key("x", m2));
    }
}
