//! Pipeline graph: nodes, connections and start nodes

use crate::core::{GraphError, Result};
use crate::pipeline::connection::{PipelineConnection, PipelineConnectionPort};
use crate::pipeline::node::Node;
use crate::pipeline::trigger::Trigger;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartNodeKind {
    Root,
    Trigger,
}

/// Entry point of a pipeline: the root node, or a node fired by a trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNode {
    pub node_id: String,

    #[serde(rename = "type")]
    pub kind: StartNodeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
}

/// Pipeline-level variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,

    #[serde(rename = "type")]
    pub variable_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Port selection and gating for [`Pipeline::connect`]
///
/// Ports left as `None` default to the source's first output and the
/// target's first input.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub source_port: Option<String>,
    pub target_port: Option<String>,
    pub filters: Option<Value>,
    pub action: Option<String>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_port(mut self, port_id: impl Into<String>) -> Self {
        self.source_port = Some(port_id.into());
        self
    }

    pub fn target_port(mut self, port_id: impl Into<String>) -> Self {
        self.target_port = Some(port_id.into());
        self
    }

    pub fn filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// A pipeline definition as stored on the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default)]
    pub connections: Vec<PipelineConnection>,

    #[serde(default)]
    pub start_nodes: Vec<StartNode>,

    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            project_id: Some(project_id.into()),
            org_id: None,
            description: None,
            status: None,
            nodes: Vec::new(),
            connections: Vec::new(),
            start_nodes: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.node_id() == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.node_id() == node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node(node_id).is_some()
    }

    /// Add a node, returning its id.
    ///
    /// The first node of a pipeline with no start nodes becomes the root.
    pub fn add_node(&mut self, node: impl Into<Node>) -> std::result::Result<String, GraphError> {
        let node = node.into();
        let node_id = node.node_id().to_string();
        if self.contains(&node_id) {
            return Err(GraphError::DuplicateNode { node_id });
        }

        debug!("Adding node '{}' ({}) to pipeline '{}'", node.name(), node_id, self.name);
        self.nodes.push(node);
        if self.start_nodes.is_empty() {
            self.set_start_node(&node_id)?;
        }
        Ok(node_id)
    }

    /// Remove a node with its connections and start-node entries
    pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.node_id() == node_id)?;
        let node = self.nodes.remove(index);
        self.connections
            .retain(|c| c.source.node_id != node_id && c.target.node_id != node_id);
        self.start_nodes.retain(|s| s.node_id != node_id);
        Some(node)
    }

    /// Make `node_id` the root of the pipeline
    pub fn set_start_node(&mut self, node_id: &str) -> std::result::Result<(), GraphError> {
        if !self.contains(node_id) {
            return Err(GraphError::NodeNotInPipeline {
                node_id: node_id.to_string(),
            });
        }

        match self.start_nodes.iter_mut().find(|s| s.kind == StartNodeKind::Root) {
            Some(root) => root.node_id = node_id.to_string(),
            None => self.start_nodes.push(StartNode {
                node_id: node_id.to_string(),
                kind: StartNodeKind::Root,
                trigger: None,
            }),
        }
        Ok(())
    }

    pub fn is_root(&self, node_id: &str) -> bool {
        self.start_nodes
            .iter()
            .any(|s| s.kind == StartNodeKind::Root && s.node_id == node_id)
    }

    pub fn root(&self) -> Option<&Node> {
        let root = self.start_nodes.iter().find(|s| s.kind == StartNodeKind::Root)?;
        self.node(&root.node_id)
    }

    /// Connect `source_id` to `target_id`, appending and returning the edge.
    ///
    /// Both nodes must already be in the pipeline. Wiring a node into the
    /// current root moves the root to the source.
    pub fn connect(
        &mut self,
        source_id: &str,
        target_id: &str,
        options: ConnectOptions,
    ) -> std::result::Result<PipelineConnection, GraphError> {
        let connection = self.build_connection(source_id, target_id, options)?;
        if self.is_root(target_id) {
            debug!("Moving root from '{}' to upstream node '{}'", target_id, source_id);
            self.set_start_node(source_id)?;
        }
        self.connections.push(connection.clone());
        Ok(connection)
    }

    /// Remove the first connection matching what `connect` would build.
    ///
    /// Returns `false` when no such connection exists.
    pub fn disconnect(
        &mut self,
        source_id: &str,
        target_id: &str,
        options: ConnectOptions,
    ) -> std::result::Result<bool, GraphError> {
        let connection = self.build_connection(source_id, target_id, options)?;
        match self.connections.iter().position(|c| *c == connection) {
            Some(index) => {
                self.connections.remove(index);
                Ok(true)
            }
            None => {
                warn!("No connection from '{}' to '{}' to remove", source_id, target_id);
                Ok(false)
            }
        }
    }

    fn build_connection(
        &self,
        source_id: &str,
        target_id: &str,
        options: ConnectOptions,
    ) -> std::result::Result<PipelineConnection, GraphError> {
        let source = self.node(source_id).ok_or_else(|| GraphError::NodeNotInPipeline {
            node_id: source_id.to_string(),
        })?;
        let target = self.node(target_id).ok_or_else(|| GraphError::NodeNotFound {
            node_id: target_id.to_string(),
        })?;

        let source_port = match options.source_port {
            Some(port_id) => source
                .base()
                .output(&port_id)
                .map(|p| p.port_id.clone())
                .ok_or_else(|| GraphError::PortNotFound {
                    node_id: source_id.to_string(),
                    port_id,
                })?,
            None => source
                .base()
                .outputs
                .first()
                .map(|p| p.port_id.clone())
                .ok_or_else(|| GraphError::NoDefaultPort {
                    node_id: source_id.to_string(),
                    direction: "output".to_string(),
                })?,
        };

        let target_port = match options.target_port {
            Some(port_id) => target
                .base()
                .input(&port_id)
                .map(|p| p.port_id.clone())
                .ok_or_else(|| GraphError::PortNotFound {
                    node_id: target_id.to_string(),
                    port_id,
                })?,
            None => target
                .base()
                .inputs
                .first()
                .map(|p| p.port_id.clone())
                .ok_or_else(|| GraphError::NoDefaultPort {
                    node_id: target_id.to_string(),
                    direction: "input".to_string(),
                })?,
        };

        Ok(PipelineConnection {
            source: PipelineConnectionPort::new(source_id, source_port),
            target: PipelineConnectionPort::new(target_id, target_port),
            filters: options.filters,
            action: options.action,
        })
    }

    /// Attach a trigger to `node_id`, updating its start-node entry if any
    pub fn add_trigger(&mut self, node_id: &str, trigger: Trigger) -> std::result::Result<(), GraphError> {
        if !self.contains(node_id) {
            return Err(GraphError::NodeNotInPipeline {
                node_id: node_id.to_string(),
            });
        }
        trigger.validate()?;

        match self.start_nodes.iter_mut().find(|s| s.node_id == node_id) {
            Some(entry) => entry.trigger = Some(trigger),
            None => self.start_nodes.push(StartNode {
                node_id: node_id.to_string(),
                kind: StartNodeKind::Trigger,
                trigger: Some(trigger),
            }),
        }
        Ok(())
    }

    /// Check node ids are unique and every edge and start node resolves
    pub fn validate(&self) -> std::result::Result<(), GraphError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.node_id()) {
                return Err(GraphError::DuplicateNode {
                    node_id: node.node_id().to_string(),
                });
            }
        }

        for connection in &self.connections {
            let source = self.node(&connection.source.node_id).ok_or_else(|| GraphError::NodeNotFound {
                node_id: connection.source.node_id.clone(),
            })?;
            if source.base().output(&connection.source.port_id).is_none() {
                return Err(GraphError::PortNotFound {
                    node_id: connection.source.node_id.clone(),
                    port_id: connection.source.port_id.clone(),
                });
            }

            let target = self.node(&connection.target.node_id).ok_or_else(|| GraphError::NodeNotFound {
                node_id: connection.target.node_id.clone(),
            })?;
            if target.base().input(&connection.target.port_id).is_none() {
                return Err(GraphError::PortNotFound {
                    node_id: connection.target.node_id.clone(),
                    port_id: connection.target.port_id.clone(),
                });
            }
        }

        for start in &self.start_nodes {
            if !self.contains(&start.node_id) {
                return Err(GraphError::NodeNotFound {
                    node_id: start.node_id.clone(),
                });
            }
            if let Some(trigger) = &start.trigger {
                trigger.validate()?;
            }
        }

        Ok(())
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
