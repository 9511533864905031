//! Code node - inline source executed by the platform's pipeline-utils service

use crate::core::PlatformError;
use crate::pipeline::io::{PipelineNameSpace, PipelineNodeIO};
use crate::pipeline::node::{NodeType, PipelineNode};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static FUNCTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid function name regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct CodeNode {
    node: PipelineNode,
}

impl CodeNode {
    /// Create a code node with a default `item` input and output
    pub fn new(
        name: impl Into<String>,
        project_id: impl Into<String>,
        project_name: impl Into<String>,
        function_name: &str,
        code: impl Into<String>,
    ) -> Result<Self, PlatformError> {
        Self::with_io(
            name,
            project_id,
            project_name,
            function_name,
            code,
            vec![PipelineNodeIO::item()],
            vec![PipelineNodeIO::item()],
        )
    }

    pub fn with_io(
        name: impl Into<String>,
        project_id: impl Into<String>,
        project_name: impl Into<String>,
        function_name: &str,
        code: impl Into<String>,
        inputs: Vec<PipelineNodeIO>,
        outputs: Vec<PipelineNodeIO>,
    ) -> Result<Self, PlatformError> {
        let code = code.into();
        if code.trim().is_empty() || !FUNCTION_NAME.is_match(function_name) {
            return Err(PlatformError::bad_request(
                "must provide a function as input: non-empty code and a valid function name",
            ));
        }

        let project_id = project_id.into();
        let namespace = PipelineNameSpace::new(function_name)
            .with_project_name(project_name)
            .with_project_id(project_id.clone())
            .with_service_name("pipeline-utils");

        let node = PipelineNode::new(name, NodeType::Code, namespace)
            .with_inputs(inputs)
            .with_outputs(outputs)
            .with_project_id(project_id)
            .with_config(json!({
                "package": {
                    "code": code,
                    "name": function_name,
                    "type": "code"
                }
            }));

        Ok(Self { node })
    }

    pub fn from_node(node: PipelineNode) -> Result<Self, PlatformError> {
        let has_package = node
            .config
            .as_ref()
            .and_then(|config| config.get("package"))
            .is_some_and(Value::is_object);
        if !has_package {
            return Err(PlatformError::bad_request(format!(
                "Code node '{}' is missing config.package",
                node.name
            )));
        }
        Ok(Self { node })
    }

    pub fn base(&self) -> &PipelineNode {
        &self.node
    }

    pub fn base_mut(&mut self) -> &mut PipelineNode {
        &mut self.node
    }

    pub fn function_name(&self) -> &str {
        &self.node.namespace.function_name
    }

    pub fn code(&self) -> Option<&str> {
        self.node
            .config
            .as_ref()
            .and_then(|config| config.pointer("/package/code"))
            .and_then(Value::as_str)
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        let config = self.node.config.get_or_insert_with(|| json!({"package": {}}));
        if let Some(package) = config.get_mut("package").and_then(Value::as_object_mut) {
            package.insert("code".to_string(), Value::String(code.into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "def run(item):\n    return item\n";

    #[test]
    fn test_code_node_layout() {
        let node = CodeNode::new("tag", "project-1", "my-project", "run", SOURCE).unwrap();
        let json = node.base().to_json().unwrap();

        assert_eq!(json["type"], json!("code"));
        assert_eq!(json["namespace"]["functionName"], json!("run"));
        assert_eq!(json["namespace"]["serviceName"], json!("pipeline-utils"));
        assert_eq!(json["config"]["package"]["type"], json!("code"));
        assert_eq!(node.code(), Some(SOURCE));
        assert_eq!(node.base().inputs.len(), 1);
        assert_eq!(node.base().outputs.len(), 1);
    }

    #[test]
    fn test_invalid_function_rejected() {
        assert!(CodeNode::new("tag", "p", "proj", "run", "  ").is_err());
        assert!(CodeNode::new("tag", "p", "proj", "2run", SOURCE).is_err());
        assert!(CodeNode::new("tag", "p", "proj", "my-func", SOURCE).is_err());
    }

    #[test]
    fn test_set_code() {
        let mut node = CodeNode::new("tag", "p", "proj", "run", SOURCE).unwrap();
        node.set_code("def run(item):\n    pass\n");
        assert_eq!(node.code(), Some("def run(item):\n    pass\n"));
        assert_eq!(node.base().config.as_ref().unwrap()["package"]["name"], json!("run"));
    }

    #[test]
    fn test_missing_package_rejected() {
        let mut node = CodeNode::new("tag", "p", "proj", "run", SOURCE).unwrap().node;
        node.config = None;
        assert!(CodeNode::from_node(node).is_err());
    }
}
