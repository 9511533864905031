//! Dataset node - a storage vertex bound to a dataset folder

use crate::core::PlatformError;
use crate::pipeline::io::{PipelineNameSpace, PipelineNodeIO};
use crate::pipeline::node::{NodeType, PipelineNode};
use serde_json::{json, Value};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetNode {
    node: PipelineNode,
}

impl DatasetNode {
    pub fn new(name: impl Into<String>, project_id: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        let namespace = PipelineNameSpace::new("dataset_handler")
            .with_project_name("DataloopTasks")
            .with_service_name("pipeline-utils");

        let node = PipelineNode::new(name, NodeType::Storage, namespace)
            .with_inputs(vec![PipelineNodeIO::item()])
            .with_outputs(vec![PipelineNodeIO::item()])
            .with_project_id(project_id);

        let mut dataset = Self { node };
        dataset.set_dataset_id(dataset_id);
        dataset.write_trigger(None, false);
        dataset
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.set_dataset_folder(Some(folder.into()));
        self
    }

    /// Feed items already in the dataset (matching `filters`) into the pipeline
    pub fn with_existing_data(mut self, filters: Option<Value>) -> Self {
        self.write_trigger(filters, true);
        self
    }

    pub fn from_node(node: PipelineNode) -> Result<Self, PlatformError> {
        for (key, param) in [("datasetId", "dataset_id"), ("dir", "dataset_folder")] {
            if let Some(value) = node.metadata.get(key) {
                if !value.is_null() && !value.is_string() {
                    return Err(PlatformError::bad_request(format!(
                        "Param {} must be of type string",
                        param
                    )));
                }
            }
        }
        Ok(Self { node })
    }

    pub fn base(&self) -> &PipelineNode {
        &self.node
    }

    pub fn base_mut(&mut self) -> &mut PipelineNode {
        &mut self.node
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.node.metadata_str("datasetId")
    }

    pub fn set_dataset_id(&mut self, dataset_id: impl Into<String>) {
        self.node.set_metadata("datasetId", Some(Value::String(dataset_id.into())));
    }

    pub fn dataset_folder(&self) -> Option<&str> {
        self.node.metadata_str("dir")
    }

    pub fn set_dataset_folder(&mut self, folder: Option<String>) {
        self.node.set_metadata("dir", folder.map(Value::String));
    }

    pub fn load_existing_data(&self) -> bool {
        self.node
            .metadata
            .get("triggerToPipeline")
            .and_then(|t| t.get("active"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_load_existing_data(&mut self, active: bool) {
        let filters = self.data_filters();
        self.write_trigger(filters, active);
    }

    /// Filter applied to existing data, decoded from its JSON string form
    pub fn data_filters(&self) -> Option<Value> {
        let filter = self.node.metadata.get("triggerToPipeline")?.get("filter")?;
        match filter {
            Value::String(encoded) => match serde_json::from_str(encoded) {
                Ok(filters) => Some(filters),
                Err(err) => {
                    warn!("Node '{}' has an unreadable data filter '{}': {}", self.node.name, encoded, err);
                    None
                }
            },
            Value::Null => None,
            other => Some(other.clone()),
        }
    }

    pub fn set_data_filters(&mut self, filters: Option<Value>) {
        let active = self.load_existing_data();
        self.write_trigger(filters, active);
    }

    fn write_trigger(&mut self, filters: Option<Value>, active: bool) {
        let filter = filters.map(|f| Value::String(f.to_string())).unwrap_or(Value::Null);
        self.node.set_metadata(
            "triggerToPipeline",
            Some(json!({"filter": filter, "active": active})),
        );
    }
}
