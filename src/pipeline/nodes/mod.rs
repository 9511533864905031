//! Node specializations
//!
//! Each wraps a [`PipelineNode`](crate::pipeline::PipelineNode) and fixes
//! the namespace, default ports and metadata layout of its kind.

pub mod code;
pub mod dataset;
pub mod function;
pub mod task;

pub use code::CodeNode;
pub use dataset::DatasetNode;
pub use function::FunctionNode;
pub use task::{TaskNode, TaskNodeBuilder, TaskPriority, WorkloadUnit};
