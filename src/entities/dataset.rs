//! Dataset entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub projects: Vec<String>,

    #[serde(default)]
    pub items_count: Option<u64>,

    #[serde(default)]
    pub annotated: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Dataset {
    /// The owning project, when the dataset belongs to exactly one
    pub fn project_id(&self) -> Option<&str> {
        match self.projects.as_slice() {
            [project] => Some(project),
            _ => None,
        }
    }
}
