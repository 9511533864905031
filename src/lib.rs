//! dataloop - client SDK for the Dataloop platform
//!
//! Builds pipeline graphs locally and pushes them through the REST API,
//! runs legacy step definitions against a shared context, and wraps the
//! platform's endpoints in typed repositories.

pub mod cli;
pub mod client;
pub mod core;
pub mod entities;
pub mod pipeline;
pub mod repositories;
pub mod steps;

// Re-export commonly used types
pub use client::{ApiClient, ApiRequest, ApiResponse, HttpMethod, ReqwestApiClient};
pub use core::{ClientConfig, Error, GraphError, PipelineContext, PlatformError, Result, StepError};
pub use pipeline::{
    CodeNode, ConnectOptions, DatasetNode, FunctionNode, Node, Pipeline, PipelineConnection, PipelineNode,
    PipelineNodeIO, TaskNode, Trigger,
};
pub use repositories::Dataloop;
pub use steps::{FunctionRegistry, PipelineBuilder, PipelineStage, PipelineStep, StepEnv};
