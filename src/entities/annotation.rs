//! Annotation entity

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An annotation on an item
///
/// Geometry and label payloads vary by annotation type and are kept
/// untouched in `extra` so updates send back what was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": "ann-1",
            "itemId": "item-1",
            "type": "box",
            "label": "car",
            "coordinates": [{"x": 1, "y": 2}, {"x": 3, "y": 4}],
            "metadata": {"system": {"status": "approved"}}
        });
        let annotation: Annotation = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(annotation.label.as_deref(), Some("car"));
        assert!(annotation.extra.contains_key("coordinates"));
        assert_eq!(serde_json::to_value(&annotation).unwrap(), raw);
    }
}
