//! Function node - calls a function of a deployed service

use crate::entities::{FunctionIO, Package, Service};
use crate::pipeline::io::{PipelineNameSpace, PipelineNodeIO};
use crate::pipeline::node::{NodeType, PipelineNode};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    node: PipelineNode,
}

impl FunctionNode {
    /// Create a node for `function_name` of the service's module.
    ///
    /// Ports are taken from the package's declared function signature. When
    /// the module or function is not declared the node gets no ports and a
    /// warning is logged.
    pub fn new(name: impl Into<String>, service: &Service, package: &Package, function_name: &str) -> Self {
        let (inputs, outputs) = match Self::resolve_io(service, package, function_name) {
            Some(io) => io,
            None => {
                warn!(
                    "Function '{}' not found in module '{}' of package '{}', node has no ports",
                    function_name, service.module_name, package.name
                );
                (Vec::new(), Vec::new())
            }
        };

        let mut namespace = PipelineNameSpace::new(function_name)
            .with_service_name(service.name.clone())
            .with_module_name(service.module_name.clone())
            .with_package_name(package.name.clone());
        if let Some(project_id) = &service.project_id {
            namespace = namespace.with_project_id(project_id.clone());
        }

        let mut node = PipelineNode::new(name, NodeType::Function, namespace)
            .with_inputs(inputs)
            .with_outputs(outputs);
        node.project_id = service.project_id.clone();

        Self { node }
    }

    /// Look up the function signature and convert it to fresh ports
    pub fn resolve_io(
        service: &Service,
        package: &Package,
        function_name: &str,
    ) -> Option<(Vec<PipelineNodeIO>, Vec<PipelineNodeIO>)> {
        let function = package
            .modules
            .iter()
            .find(|module| module.name == service.module_name)?
            .functions
            .iter()
            .find(|function| function.name == function_name)?;

        Some((
            function.inputs.iter().map(to_port).collect(),
            function.outputs.iter().map(to_port).collect(),
        ))
    }

    pub fn from_node(node: PipelineNode) -> Self {
        Self { node }
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

    pub fn service_name(&self) -> Option<&str> {
        self.node.namespace.service_name.as_deref()
    }
}

fn to_port(io: &FunctionIO) -> PipelineNodeIO {
    let mut port = PipelineNodeIO::new(io.io_type.clone(), io.name.clone()).with_actions(io.actions.clone());
    port.default_value = io.value.clone();
    port.description = io.description.clone();
    port
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::io::PackageInputType;
    use serde_json::json;

    fn package() -> Package {
        serde_json::from_value(json!({
            "id": "pkg-1",
            "name": "detector",
            "modules": [{
                "name": "default_module",
                "functions": [{
                    "name": "predict",
                    "inputs": [{"type": "Item", "name": "item"}],
                    "outputs": [
                        {"type": "Item", "name": "item", "actions": ["found", "empty"]},
                        {"type": "Annotation[]", "name": "annotations"}
                    ]
                }]
            }]
        }))
        .unwrap()
    }

    fn service() -> Service {
        serde_json::from_value(json!({
            "id": "svc-1",
            "name": "detector-svc",
            "projectId": "project-1",
            "packageId": "pkg-1"
        }))
        .unwrap()
    }

    #[test]
    fn test_ports_from_function_signature() {
        let node = FunctionNode::new("detect", &service(), &package(), "predict");
        let base = node.base();

        assert_eq!(base.inputs.len(), 1);
        assert_eq!(base.outputs.len(), 2);
        assert_eq!(base.outputs[0].actions, vec!["found", "empty"]);
        assert_eq!(base.outputs[1].input_type, PackageInputType::AnnotationList);
        assert_eq!(node.service_name(), Some("detector-svc"));
        assert_eq!(base.namespace.package_name.as_deref(), Some("detector"));
        assert_eq!(base.project_id.as_deref(), Some("project-1"));
    }

    #[test]
    fn test_unknown_function_yields_no_ports() {
        let node = FunctionNode::new("detect", &service(), &package(), "train");
        assert!(node.base().inputs.is_empty());
        assert!(node.base().outputs.is_empty());
        assert_eq!(node.function_name(), "train");
    }

    #[test]
    fn test_unknown_module_yields_none() {
        let mut service = service();
        service.module_name = "other".to_string();
        assert!(FunctionNode::resolve_io(&service, &package(), "predict").is_none());
    }
}
