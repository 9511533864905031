//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{AnnotationsCommand, PipelineCommand, StepsCommand};
use std::ffi::OsString;

/// Dataloop platform command-line client
#[derive(Debug, Parser, Clone)]
#[command(name = "dlp")]
#[command(version)]
#[command(about = "Build, validate and push Dataloop pipelines, run local step definitions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to client configuration file (defaults to $DATALOOP_PATH/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Work with pipeline graph definitions
    #[command(subcommand)]
    Pipeline(PipelineCommand),

    /// Run local step definitions
    #[command(subcommand)]
    Steps(StepsCommand),

    /// Manage item annotations
    #[command(subcommand)]
    Annotations(AnnotationsCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
