//! Core building blocks shared by the SDK
//!
//! Error types, client configuration and the interpreter context.

pub mod config;
pub mod context;
pub mod error;

pub use config::ClientConfig;
pub use context::PipelineContext;
pub use error::{Error, GraphError, PlatformError, Result, StepError};
