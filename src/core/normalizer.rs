// src/core/normalizer.rs
//! Response-shape normalizer. The backend answers list endpoints as
//! `{success, data: [...]}`, as a bare array, or as `{data: {data: [...]}}`;
//! every list consumer goes through here.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::types::response::Pagination;

/// Return the records carried by `payload`, order preserved.
/// Unknown or failed shapes yield an empty list.
pub fn extract_list(payload: &Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            if map.get("success").and_then(Value::as_bool) == Some(false) {
                return Vec::new();
            }
            match map.get("data") {
                Some(Value::Array(items)) => items.clone(),
                Some(Value::Object(inner)) => match inner.get("data") {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Typed variant of [`extract_list`]. Records that do not match `T` are skipped.
pub fn extract_records<T: DeserializeOwned>(payload: &Value) -> Vec<T> {
    extract_list(payload)
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed record at index {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Unwrap a single-record response: `{data: {data: {...}}}`, `{data: {...}}`
/// or a bare object.
pub fn extract_object(payload: &Value) -> Option<Value> {
    let map = payload.as_object()?;
    if map.get("success").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    match map.get("data") {
        Some(Value::Object(inner)) => match inner.get("data") {
            Some(nested @ Value::Object(_)) => Some(nested.clone()),
            _ => Some(Value::Object(inner.clone())),
        },
        Some(Value::Null) | None => {
            if map.contains_key("success") {
                None
            } else {
                Some(payload.clone())
            }
        }
        Some(other) => Some(other.clone()),
    }
}

/// Pagination block, either at the top level or next to a nested `data`.
pub fn extract_pagination(payload: &Value) -> Option<Pagination> {
    let block = payload
        .get("pagination")
        .or_else(|| payload.get("data").and_then(|d| d.get("pagination")))?;
    serde_json::from_value(block.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_known_shapes_yield_inner_sequence() {
        let expected = vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})];

        let enveloped = json!({"success": true, "data": [{"id": 1}, {"id": 2}, {"id": 3}]});
        let bare = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let nested = json!({"data": {"data": [{"id": 1}, {"id": 2}, {"id": 3}]}});

        assert_eq!(extract_list(&enveloped), expected);
        assert_eq!(extract_list(&bare), expected);
        assert_eq!(extract_list(&nested), expected);
    }

    #[test]
    fn test_unknown_shapes_yield_empty() {
        for payload in [
            Value::Null,
            json!({"success": false}),
            json!({"success": false, "data": [{"id": 1}]}),
            json!({"data": {"items": [1, 2]}}),
            json!({"data": "oops"}),
            json!("text"),
            json!(42),
            json!({}),
        ] {
            assert!(extract_list(&payload).is_empty(), "payload {}", payload);
        }
    }

    #[test]
    fn test_extract_records_skips_malformed() {
        let payload = json!({"success": true, "data": [{"id": 1}, {"name": "x"}, {"id": 3}]});
        let items: Vec<Item> = extract_records(&payload);
        assert_eq!(items, vec![Item { id: 1 }, Item { id: 3 }]);
    }

    #[test]
    fn test_extract_object_shapes() {
        assert_eq!(
            extract_object(&json!({"success": true, "data": {"id": 1}})),
            Some(json!({"id": 1}))
        );
        assert_eq!(
            extract_object(&json!({"data": {"data": {"id": 2}}})),
            Some(json!({"id": 2}))
        );
        assert_eq!(extract_object(&json!({"id": 3})), Some(json!({"id": 3})));
        assert_eq!(extract_object(&json!({"success": false, "data": {"id": 4}})), None);
        assert_eq!(extract_object(&json!({"success": true})), None);
        assert_eq!(extract_object(&json!([1])), None);
    }

    #[test]
    fn test_extract_pagination() {
        let top = json!({"success": true, "data": [], "pagination": {"totalPages": 3, "currentPage": 2}});
        let pagination = extract_pagination(&top).unwrap();
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.current_page, 2);

        let nested = json!({"data": {"data": [], "pagination": {"totalPages": 5}}});
        assert_eq!(extract_pagination(&nested).unwrap().total_pages, 5);

        assert!(extract_pagination(&json!([])).is_none());
    }
}
