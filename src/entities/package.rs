//! Package definitions: modules, functions and their typed IO

use crate::pipeline::io::PackageInputType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared input or output of a package function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionIO {
    #[serde(rename = "type")]
    pub io_type: PackageInputType,

    pub name: String,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFunction {
    pub name: String,

    #[serde(default)]
    pub inputs: Vec<FunctionIO>,

    #[serde(default)]
    pub outputs: Vec<FunctionIO>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageModule {
    pub name: String,

    #[serde(default)]
    pub entry_point: Option<String>,

    #[serde(default)]
    pub functions: Vec<PackageFunction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub modules: Vec<PackageModule>,
}

impl Package {
    pub fn function(&self, module_name: &str, function_name: &str) -> Option<&PackageFunction> {
        self.modules
            .iter()
            .find(|m| m.name == module_name)?
            .functions
            .iter()
            .find(|f| f.name == function_name)
    }
}

/// Dataloop app package (DPK)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dpk {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default)]
    pub creator: Option<String>,
}
