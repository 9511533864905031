//! Node ports and service namespaces

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Semantic type tag carried by a port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackageInputType {
    Item,
    Dataset,
    Annotation,
    Json,
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Model,
    Recipe,
    Task,
    Assignment,
    Execution,
    Dimension,
    ItemList,
    AnnotationList,
    DatasetList,
    ModelList,
    /// Any tag this SDK does not know about, kept verbatim
    Other(String),
}

impl PackageInputType {
    pub fn as_str(&self) -> &str {
        match self {
            PackageInputType::Item => "Item",
            PackageInputType::Dataset => "Dataset",
            PackageInputType::Annotation => "Annotation",
            PackageInputType::Json => "Json",
            PackageInputType::String => "String",
            PackageInputType::Number => "Number",
            PackageInputType::Integer => "Integer",
            PackageInputType::Float => "Float",
            PackageInputType::Boolean => "Boolean",
            PackageInputType::Model => "Model",
            PackageInputType::Recipe => "Recipe",
            PackageInputType::Task => "Task",
            PackageInputType::Assignment => "Assignment",
            PackageInputType::Execution => "Execution",
            PackageInputType::Dimension => "Dimension",
            PackageInputType::ItemList => "Item[]",
            PackageInputType::AnnotationList => "Annotation[]",
            PackageInputType::DatasetList => "Dataset[]",
            PackageInputType::ModelList => "Model[]",
            PackageInputType::Other(tag) => tag,
        }
    }
}

impl From<String> for PackageInputType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Item" => PackageInputType::Item,
            "Dataset" => PackageInputType::Dataset,
            "Annotation" => PackageInputType::Annotation,
            "Json" => PackageInputType::Json,
            "String" => PackageInputType::String,
            "Number" => PackageInputType::Number,
            "Integer" => PackageInputType::Integer,
            "Float" => PackageInputType::Float,
            "Boolean" => PackageInputType::Boolean,
            "Model" => PackageInputType::Model,
            "Recipe" => PackageInputType::Recipe,
            "Task" => PackageInputType::Task,
            "Assignment" => PackageInputType::Assignment,
            "Execution" => PackageInputType::Execution,
            "Dimension" => PackageInputType::Dimension,
            "Item[]" => PackageInputType::ItemList,
            "Annotation[]" => PackageInputType::AnnotationList,
            "Dataset[]" => PackageInputType::DatasetList,
            "Model[]" => PackageInputType::ModelList,
            _ => PackageInputType::Other(tag),
        }
    }
}

impl From<PackageInputType> for String {
    fn from(input_type: PackageInputType) -> Self {
        match input_type {
            PackageInputType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PackageInputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed input or output slot on a node
///
/// Connections reference ports by `(node_id, port_id)`, so `port_id` must
/// survive (de)serialization unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineNodeIO {
    pub port_id: String,

    #[serde(rename = "type")]
    pub input_type: PackageInputType,

    pub name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<(u8, u8, u8)>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_percentage: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Trigger labels used for routing (e.g. `complete`, `discard`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PipelineNodeIO {
    /// Create a port with a fresh id; the display name defaults to `name`
    pub fn new(input_type: PackageInputType, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            port_id: Uuid::new_v4().to_string(),
            input_type,
            display_name: name.clone(),
            name,
            color: None,
            port_percentage: None,
            variable_name: None,
            default_value: None,
            actions: Vec::new(),
            description: None,
        }
    }

    /// The default `item` port used by the built-in node kinds
    pub fn item() -> Self {
        Self::new(PackageInputType::Item, "item")
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Where a node's code or service lives on the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineNameSpace {
    pub function_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl PipelineNameSpace {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            ..Default::default()
        }
    }

    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }
}
