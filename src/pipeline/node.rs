//! Pipeline node domain model

use crate::core::{PlatformError, Result};
use crate::pipeline::io::{PipelineNameSpace, PipelineNodeIO};
use crate::pipeline::nodes::{CodeNode, DatasetNode, FunctionNode, TaskNode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Canvas size of a node, used by the position transform
pub const NODE_SIZE: (f64, f64) = (200.0, 87.0);

/// Default grid position for new nodes
pub const DEFAULT_POSITION: (f64, f64) = (1.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Task,
    Code,
    Function,
    Storage,
    Ml,
    Custom,
}

/// A vertex in a pipeline graph
///
/// Type-specific state (task assignment fields, inline code, dataset
/// bindings) lives in `metadata` and `config`; the specialized wrappers in
/// [`nodes`](crate::pipeline::nodes) give it typed access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineNode {
    #[serde(rename = "id")]
    pub node_id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default)]
    pub namespace: PipelineNameSpace,

    #[serde(default)]
    pub inputs: Vec<PipelineNodeIO>,

    #[serde(default)]
    pub outputs: Vec<PipelineNodeIO>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpk_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

impl PipelineNode {
    /// Create a node with a fresh id at the default position
    pub fn new(name: impl Into<String>, node_type: NodeType, namespace: PipelineNameSpace) -> Self {
        let mut node = Self {
            node_id: Uuid::new_v4().to_string(),
            name: name.into(),
            node_type,
            namespace,
            inputs: Vec::new(),
            outputs: Vec::new(),
            metadata: Map::new(),
            project_id: None,
            config: None,
            app_id: None,
            dpk_name: None,
            app_name: None,
        };
        node.set_position(DEFAULT_POSITION);
        node
    }

    pub fn with_inputs(mut self, inputs: Vec<PipelineNodeIO>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PipelineNodeIO>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_position(mut self, position: (f64, f64)) -> Self {
        self.set_position(position);
        self
    }

    /// Grid position decoded from `metadata.position`
    pub fn position(&self) -> Option<(f64, f64)> {
        let position = self.metadata.get("position")?;
        let x = position.get("x")?.as_f64()?;
        let y = position.get("y")?.as_f64()?;
        Some((
            (x - NODE_SIZE.0 / 2.0) / (1.7 * NODE_SIZE.0),
            (y - NODE_SIZE.1) / (1.5 * NODE_SIZE.1),
        ))
    }

    /// Encode a grid position into `metadata.position`
    pub fn set_position(&mut self, position: (f64, f64)) {
        self.metadata.insert(
            "position".to_string(),
            json!({
                "x": position.0 * 1.7 * NODE_SIZE.0 + NODE_SIZE.0 / 2.0,
                "y": position.1 * 1.5 * NODE_SIZE.1 + NODE_SIZE.1,
                "z": 0
            }),
        );
    }

    pub fn input(&self, port_id: &str) -> Option<&PipelineNodeIO> {
        self.inputs.iter().find(|p| p.port_id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&PipelineNodeIO> {
        self.outputs.iter().find(|p| p.port_id == port_id)
    }

    /// Read a metadata string, rejecting other JSON types
    pub(crate) fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Insert or, for `None`, remove a metadata key
    pub(crate) fn set_metadata(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.metadata.insert(key.to_string(), value);
            }
            None => {
                self.metadata.remove(key);
            }
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A pipeline node, dispatched on its `type` discriminant
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Code(CodeNode),
    Task(TaskNode),
    Function(FunctionNode),
    Dataset(DatasetNode),
    Generic(PipelineNode),
}

impl Node {
    /// Parse the wire JSON once, then build the specialization for its type
    pub fn from_json(value: &Value) -> Result<Self> {
        let base = PipelineNode::from_json(value)?;
        Ok(Self::from_base(base)?)
    }

    pub fn from_base(base: PipelineNode) -> std::result::Result<Self, PlatformError> {
        Ok(match base.node_type {
            NodeType::Code => Node::Code(CodeNode::from_node(base)?),
            NodeType::Task => Node::Task(TaskNode::from_node(base)?),
            NodeType::Function => Node::Function(FunctionNode::from_node(base)),
            NodeType::Storage => Node::Dataset(DatasetNode::from_node(base)?),
            NodeType::Ml | NodeType::Custom => Node::Generic(base),
        })
    }

    pub fn base(&self) -> &PipelineNode {
        match self {
            Node::Code(node) => node.base(),
            Node::Task(node) => node.base(),
            Node::Function(node) => node.base(),
            Node::Dataset(node) => node.base(),
            Node::Generic(node) => node,
        }
    }

    pub fn base_mut(&mut self) -> &mut PipelineNode {
        match self {
            Node::Code(node) => node.base_mut(),
            Node::Task(node) => node.base_mut(),
            Node::Function(node) => node.base_mut(),
            Node::Dataset(node) => node.base_mut(),
            Node::Generic(node) => node,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.base().node_id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn node_type(&self) -> NodeType {
        self.base().node_type
    }

    pub fn to_json(&self) -> Result<Value> {
        self.base().to_json()
    }
}

impl From<PipelineNode> for Node {
    fn from(node: PipelineNode) -> Self {
        Node::Generic(node)
    }
}

impl From<CodeNode> for Node {
    fn from(node: CodeNode) -> Self {
        Node::Code(node)
    }
}

impl From<TaskNode> for Node {
    fn from(node: TaskNode) -> Self {
        Node::Task(node)
    }
}

impl From<FunctionNode> for Node {
    fn from(node: FunctionNode) -> Self {
        Node::Function(node)
    }
}

impl From<DatasetNode> for Node {
    fn from(node: DatasetNode) -> Self {
        Node::Dataset(node)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.base().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let base = PipelineNode::deserialize(deserializer)?;
        Node::from_base(base).map_err(serde::de::Error::custom)
    }
}
