//! Coercion of backend join results into lists.
//!
//! The relational-join layer hands back `null` for an empty one-to-many join
//! and sometimes a bare object where a singleton array is expected. Anything
//! that should be a list goes through here before reaching response code.
//! Malformed input is silently coerced to empty, never an error.

use serde_json::Value;

/// Nested fields that must always be arrays, wherever they appear.
const NESTED_LIST_FIELDS: [&str; 7] = [
    "recruitments",
    "achievements",
    "certifications",
    "tags",
    "images",
    "participants",
    "areas",
];

/// null → `[]`, object → `[obj]`, array → itself, scalar → `[]`.
pub fn ensure_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

/// Recursively coerces every known nested-list field to an array.
pub fn normalize_nested(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if NESTED_LIST_FIELDS.contains(&key.as_str()) {
                    *nested = Value::Array(ensure_list(nested.take()));
                }
                normalize_nested(nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_nested(item);
            }
        }
        _ => {}
    }
}

/// Parses a JSON text column that should hold a list. Bad or missing text is
/// an empty list.
pub fn parse_list(raw: Option<&str>) -> Vec<Value> {
    raw.and_then(|text| serde_json::from_str::<Value>(text).ok())
        .map(ensure_list)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ensure_list_is_total() {
        assert_eq!(ensure_list(Value::Null), Vec::<Value>::new());
        assert_eq!(ensure_list(json!({"id": 1})), vec![json!({"id": 1})]);
        assert_eq!(ensure_list(json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(ensure_list(json!("stray")), Vec::<Value>::new());
        assert_eq!(ensure_list(json!(42)), Vec::<Value>::new());
    }

    #[test]
    fn nested_fields_become_arrays() {
        let mut profile = json!({
            "nickname": "taro",
            "achievements": null,
            "certifications": {"name": "NSCA-CPT"},
            "recruitments": [
                {"title": "ベンチ会", "tags": {"label": "胸"}, "participants": null}
            ],
        });
        normalize_nested(&mut profile);
        assert_eq!(profile["achievements"], json!([]));
        assert_eq!(profile["certifications"], json!([{"name": "NSCA-CPT"}]));
        assert_eq!(profile["recruitments"][0]["tags"], json!([{"label": "胸"}]));
        assert_eq!(profile["recruitments"][0]["participants"], json!([]));
        // untouched scalar fields survive
        assert_eq!(profile["nickname"], json!("taro"));
    }

    #[test]
    fn parse_list_tolerates_garbage() {
        assert_eq!(parse_list(None), Vec::<Value>::new());
        assert_eq!(parse_list(Some("not json")), Vec::<Value>::new());
        assert_eq!(parse_list(Some("null")), Vec::<Value>::new());
        assert_eq!(parse_list(Some(r#"{"a":1}"#)), vec![json!({"a": 1})]);
        assert_eq!(parse_list(Some("[1,2]")), vec![json!(1), json!(2)]);
    }
}
