//! Item entity: a file or directory in a dataset

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Remote path inside the dataset, e.g. `/train/img_001.jpg`
    #[serde(default)]
    pub filename: String,

    #[serde(default)]
    pub dataset_id: Option<String>,

    /// `file` or `dir`
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Item {
    pub fn is_dir(&self) -> bool {
        self.item_type.as_deref() == Some("dir")
    }

    pub fn mimetype(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.pointer("/system/mimetype"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_parse() {
        let item: Item = serde_json::from_value(json!({
            "id": "item-1",
            "name": "img.jpg",
            "filename": "/train/img.jpg",
            "datasetId": "ds-1",
            "type": "file",
            "metadata": {"system": {"mimetype": "image/jpeg"}}
        }))
        .unwrap();

        assert!(!item.is_dir());
        assert_eq!(item.mimetype(), Some("image/jpeg"));
        assert_eq!(item.dataset_id.as_deref(), Some("ds-1"));
    }
}
