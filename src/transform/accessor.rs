//! Safe multi-level lookup into semi-structured records

use serde_json::Value as JsonValue;

/// Walk `keys` into `node`, one object level per key
///
/// Returns `None` as soon as the current node is not an object or a key is
/// missing. Never panics, whatever shape the record has.
pub fn get_nested<'a>(node: &'a JsonValue, keys: &[&str]) -> Option<&'a JsonValue> {
    let mut current = node;
    for key in keys {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested_is_object() {
        let plant = json!({"plant_id": 12, "name": "test plant"});
        assert_eq!(get_nested(&plant, &["plant_id"]), Some(&json!(12)));
        assert_eq!(get_nested(&plant, &["name"]), Some(&json!("test plant")));
    }

    #[test]
    fn test_get_nested_two_levels() {
        let plant = json!({"origin_location": {"country": "France", "city": "Lyon"}});
        assert_eq!(
            get_nested(&plant, &["origin_location", "city"]),
            Some(&json!("Lyon"))
        );
    }

    #[test]
    fn test_get_nested_not_object() {
        for node in [
            json!("not a dict"),
            json!(["item_1", "item_2"]),
            json!(3.14),
            json!(17),
            json!(null),
            json!(true),
        ] {
            assert!(get_nested(&node, &["plant"]).is_none());
        }
    }

    #[test]
    fn test_get_nested_intermediate_not_object() {
        let plant = json!({"botanist": "Crabby"});
        assert!(get_nested(&plant, &["botanist", "email"]).is_none());

        let plant = json!({"images": null});
        assert!(get_nested(&plant, &["images", "original_url"]).is_none());
    }

    #[test]
    fn test_get_nested_no_key() {
        let plant = json!({"plant_id": 45, "name": "test plant"});
        assert!(get_nested(&plant, &["city"]).is_none());
    }

    #[test]
    fn test_get_nested_no_keys_returns_node() {
        let plant = json!({"plant_id": 45});
        assert_eq!(get_nested(&plant, &[]), Some(&plant));
    }
}
