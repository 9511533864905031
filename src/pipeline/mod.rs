//! Client-side model of platform pipelines
//!
//! A [`Pipeline`] owns its nodes, connections and start nodes. Nodes carry
//! typed ports; connections reference ports by `(node_id, port_id)`. All
//! graph edits go through the pipeline so an edge can never point at a
//! node that isn't part of it.

pub mod connection;
pub mod graph;
pub mod io;
pub mod node;
pub mod nodes;
pub mod trigger;

pub use connection::{PipelineConnection, PipelineConnectionPort};
pub use graph::{ConnectOptions, Pipeline, StartNode, StartNodeKind, Variable};
pub use io::{PackageInputType, PipelineNameSpace, PipelineNodeIO};
pub use node::{Node, NodeType, PipelineNode};
pub use nodes::{CodeNode, DatasetNode, FunctionNode, TaskNode, TaskPriority, WorkloadUnit};
pub use trigger::{CronTrigger, EventTrigger, ExecutionMode, Trigger, TriggerAction, TriggerResource};
