//! CLI command definitions

use clap::{Args, Subcommand};
use serde_json::Value;

#[derive(Debug, Subcommand, Clone)]
pub enum PipelineCommand {
    /// Check a pipeline JSON definition
    Validate(ValidateCommand),

    /// Create a pipeline on the platform
    Push(PushCommand),
}

#[derive(Debug, Subcommand, Clone)]
pub enum StepsCommand {
    /// Run a step definition against a fresh context
    Run(RunCommand),
}

#[derive(Debug, Subcommand, Clone)]
pub enum AnnotationsCommand {
    /// Upload annotations from a JSON file to an item
    Upload(UploadCommand),
}

/// Validate a pipeline definition
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline JSON file
    #[arg(short, long)]
    pub file: String,

    /// Print the normalized JSON
    #[arg(long)]
    pub json: bool,
}

/// Push a pipeline definition
#[derive(Debug, Args, Clone)]
pub struct PushCommand {
    /// Path to pipeline JSON file
    #[arg(short, long)]
    pub file: String,

    /// Install the pipeline after creating it
    #[arg(long)]
    pub install: bool,
}

/// Run a step definition
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to step definition (YAML or JSON)
    #[arg(short, long)]
    pub file: String,

    /// Initial context values (key=value, value parsed as JSON when possible)
    #[arg(long, value_parser = parse_key_value)]
    pub var: Vec<(String, String)>,
}

/// Upload annotations
#[derive(Debug, Args, Clone)]
pub struct UploadCommand {
    /// Target item id
    #[arg(long)]
    pub item: String,

    /// JSON file holding an array of annotations
    #[arg(short, long)]
    pub file: String,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}

/// Read a `--var` value as JSON, falling back to a plain string
pub fn parse_var_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
