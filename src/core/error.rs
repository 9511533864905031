//! Error types for SDK operations

use crate::client::ApiResponse;
use thiserror::Error;

/// Result alias used across the SDK
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level SDK error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the remote platform, keyed by HTTP-like status code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("[{status_code}] Not found: {message}")]
    NotFound { status_code: String, message: String },

    #[error("[{status_code}] Internal server error: {message}")]
    InternalServerError { status_code: String, message: String },

    #[error("[{status_code}] Forbidden: {message}")]
    Forbidden { status_code: String, message: String },

    #[error("[{status_code}] Bad request: {message}")]
    BadRequest { status_code: String, message: String },

    #[error("[{status_code}] Unauthorized: {message}")]
    Unauthorized { status_code: String, message: String },

    #[error("[{status_code}] Request timeout: {message}")]
    RequestTimeout { status_code: String, message: String },

    #[error("[{status_code}] Unknown error: {message}")]
    Unknown { status_code: String, message: String },
}

impl PlatformError {
    /// Map a status code to the matching error kind.
    ///
    /// Unrecognized codes map to [`PlatformError::Unknown`].
    pub fn from_status(status_code: &str, message: impl Into<String>) -> Self {
        let status_code = status_code.to_string();
        let message = message.into();
        match status_code.as_str() {
            "404" => PlatformError::NotFound { status_code, message },
            "500" => PlatformError::InternalServerError { status_code, message },
            "403" => PlatformError::Forbidden { status_code, message },
            "400" => PlatformError::BadRequest { status_code, message },
            "401" => PlatformError::Unauthorized { status_code, message },
            "408" => PlatformError::RequestTimeout { status_code, message },
            _ => PlatformError::Unknown { status_code, message },
        }
    }

    /// Build an error from a failed API response.
    ///
    /// The message is taken from the body's `message` field, then `error`,
    /// then the raw body text.
    pub fn from_response(response: &ApiResponse) -> Self {
        let message = response
            .to_value()
            .ok()
            .and_then(|body| {
                body.get("message")
                    .or_else(|| body.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| response.text());

        Self::from_status(&response.status.to_string(), message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_status("400", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_status("404", message)
    }

    pub fn status_code(&self) -> &str {
        match self {
            PlatformError::NotFound { status_code, .. }
            | PlatformError::InternalServerError { status_code, .. }
            | PlatformError::Forbidden { status_code, .. }
            | PlatformError::BadRequest { status_code, .. }
            | PlatformError::Unauthorized { status_code, .. }
            | PlatformError::RequestTimeout { status_code, .. }
            | PlatformError::Unknown { status_code, .. } => status_code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PlatformError::NotFound { message, .. }
            | PlatformError::InternalServerError { message, .. }
            | PlatformError::Forbidden { message, .. }
            | PlatformError::BadRequest { message, .. }
            | PlatformError::Unauthorized { message, .. }
            | PlatformError::RequestTimeout { message, .. }
            | PlatformError::Unknown { message, .. } => message,
        }
    }
}

/// Errors raised while editing a pipeline graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Node '{node_id}' is not part of the pipeline, add it with Pipeline::add_node first")]
    NodeNotInPipeline { node_id: String },

    #[error("Target node '{node_id}' not found in pipeline")]
    NodeNotFound { node_id: String },

    #[error("Port '{port_id}' not found on node '{node_id}'")]
    PortNotFound { node_id: String, port_id: String },

    #[error("Node '{node_id}' has no {direction} port to connect by default")]
    NoDefaultPort { node_id: String, direction: String },

    #[error("Node '{node_id}' already exists in pipeline")]
    DuplicateNode { node_id: String },

    #[error("Invalid cron expression: '{cron}'")]
    InvalidCron { cron: String },
}

/// Errors raised by the step interpreter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("Input argument '{name}' not in pipeline context")]
    MissingInput { name: String },

    #[error("Step '{step}' requires argument '{argument}'")]
    MissingArgument { step: String, argument: String },

    #[error("Step declares {expected} outputs but returned {actual}")]
    OutputArity { expected: usize, actual: usize },

    #[error("Unknown step type: {type_name}")]
    UnknownStepType { type_name: String },

    #[error("Unknown param source 'by: {by}', expected 'val' or 'ref'")]
    InvalidParamSource { by: String },

    #[error("Malformed step params: {reason}")]
    MalformedParams { reason: String },

    #[error("No function registered for {path}::{method}")]
    FunctionNotRegistered { path: String, method: String },

    #[error("Step '{step}' failed: {reason}")]
    Failed { step: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes_map_to_kinds() {
        assert!(matches!(PlatformError::from_status("404", "x"), PlatformError::NotFound { .. }));
        assert!(matches!(
            PlatformError::from_status("500", "x"),
            PlatformError::InternalServerError { .. }
        ));
        assert!(matches!(PlatformError::from_status("403", "x"), PlatformError::Forbidden { .. }));
        assert!(matches!(PlatformError::from_status("400", "x"), PlatformError::BadRequest { .. }));
        assert!(matches!(PlatformError::from_status("401", "x"), PlatformError::Unauthorized { .. }));
        assert!(matches!(
            PlatformError::from_status("408", "x"),
            PlatformError::RequestTimeout { .. }
        ));
        assert!(matches!(PlatformError::from_status("418", "x"), PlatformError::Unknown { .. }));
    }

    #[test]
    fn test_from_response_prefers_message_field() {
        let response = ApiResponse::json(404, json!({"message": "Pipeline not found", "error": "nope"}));
        let err = PlatformError::from_response(&response);
        assert_eq!(err.status_code(), "404");
        assert_eq!(err.message(), "Pipeline not found");
    }

    #[test]
    fn test_from_response_falls_back_to_raw_text() {
        let response = ApiResponse::new(502, b"bad gateway".to_vec());
        let err = PlatformError::from_response(&response);
        assert!(matches!(err, PlatformError::Unknown { .. }));
        assert_eq!(err.message(), "bad gateway");
    }
}
