//! Deployed services and bot users

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_module() -> String {
    "default_module".to_string()
}

/// A deployed package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub package_id: Option<String>,

    #[serde(default = "default_module")]
    pub module_name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Value>,
}

/// Bot user that services run as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    pub email: String,

    #[serde(default)]
    pub project_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_name_default() {
        let service: Service = serde_json::from_value(json!({"id": "s", "name": "svc"})).unwrap();
        assert_eq!(service.module_name, "default_module");
    }
}
