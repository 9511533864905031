use anyhow::{Context, Result};
use dataloop::cli::commands::{
    parse_var_value, AnnotationsCommand, PipelineCommand, PushCommand, RunCommand, StepsCommand, UploadCommand,
    ValidateCommand,
};
use dataloop::cli::output::*;
use dataloop::cli::{Cli, Command};
use dataloop::client::ReqwestApiClient;
use dataloop::core::{ClientConfig, PipelineContext};
use dataloop::pipeline::Pipeline;
use dataloop::repositories::Dataloop;
use dataloop::steps::{PipelineBuilder, StepEnv};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Pipeline(PipelineCommand::Validate(cmd)) => validate_pipeline(cmd)?,
        Command::Pipeline(PipelineCommand::Push(cmd)) => push_pipeline(cmd, &cli).await?,
        Command::Steps(StepsCommand::Run(cmd)) => run_steps(cmd, &cli).await?,
        Command::Annotations(AnnotationsCommand::Upload(cmd)) => upload_annotations(cmd, &cli).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = ClientConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config.validate()?;
            Ok(config)
        }
        None => ClientConfig::load(),
    }
}

fn connect(cli: &Cli) -> Result<Dataloop> {
    let config = load_config(cli)?;
    if config.token.is_none() {
        warn!("No token configured, requests will be unauthenticated");
    }
    Dataloop::from_config(config).context("Failed to create API client")
}

fn read_pipeline(file: &str) -> Result<Pipeline> {
    let content = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
    let value: Value = serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", file))?;
    Pipeline::from_json(&value).context("Failed to parse pipeline")
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let pipeline = match read_pipeline(&cmd.file) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = pipeline.validate() {
        println!("{}", format_graph_error(&e));
        std::process::exit(1);
    }

    println!("{} Pipeline graph is valid!", CHECK);
    println!("{}", format_pipeline_summary(&pipeline));

    if cmd.json {
        let json = serde_json::to_string_pretty(&pipeline.to_json()?)?;
        println!("\n{}", json);
    }
    Ok(())
}

async fn push_pipeline(cmd: &PushCommand, cli: &Cli) -> Result<()> {
    let pipeline = read_pipeline(&cmd.file)?;
    let platform = connect(cli)?;

    println!("{} Pushing pipeline {}", ROCKET, style(&pipeline.name).bold());
    let created = platform.pipelines().create(&pipeline).await?;
    let pipeline_id = created.id.clone().unwrap_or_default();
    println!("{} Created {} ({})", CHECK, style(&created.name).bold(), style(&pipeline_id).dim());

    if cmd.install {
        platform.pipelines().install(&pipeline_id).await?;
        println!("{} Installed {}", CHECK, style(&created.name).bold());
    }
    Ok(())
}

async fn run_steps(cmd: &RunCommand, cli: &Cli) -> Result<()> {
    let builder = PipelineBuilder::from_file(&cmd.file).context("Failed to load step definition")?;
    println!("{} Loaded {}", INFO, style(&builder.name).bold());

    let mut context = PipelineContext::new();
    for (key, raw) in &cmd.var {
        context.set(key.clone(), parse_var_value(raw));
        println!("{} Variable: {} = {}", INFO, style(key).cyan(), style(raw).dim());
    }

    // Steps that only call registered functions run without a platform
    let mut env = StepEnv::new();
    match load_config(cli) {
        Ok(config) if config.token.is_some() => {
            env = env.with_client(Arc::new(ReqwestApiClient::new(config)?));
        }
        Ok(_) => warn!("No token configured, platform steps will fail"),
        Err(e) => warn!("No client configuration: {:#}", e),
    }

    println!();
    match builder.execute(&mut context, &env).await {
        Ok(()) => {
            println!("{} {} completed {}", CHECK, style(&builder.name).bold(), style("successfully").green());
        }
        Err(e) => {
            println!("{} {} {}", CROSS, style(&builder.name).bold(), style("failed").red());
            error!("{}", e);
            print_context(&context);
            std::process::exit(1);
        }
    }

    print_context(&context);
    Ok(())
}

fn print_context(context: &PipelineContext) {
    if context.is_empty() {
        println!("{} Context is empty", WARN);
    } else {
        println!("\n{}", style("Context:").bold());
        println!("{}", format_context(context, 10));
    }
}

async fn upload_annotations(cmd: &UploadCommand, cli: &Cli) -> Result<()> {
    let content = std::fs::read_to_string(&cmd.file).with_context(|| format!("Failed to read {}", cmd.file))?;
    let annotations = match serde_json::from_str::<Value>(&content)? {
        Value::Array(annotations) => annotations,
        other => vec![other],
    };

    let platform = connect(cli)?;
    let total = annotations.len();
    let progress = BarProgress::new(total);

    let uploaded = platform
        .annotations()
        .upload_with_progress(&cmd.item, annotations, &progress)
        .await?;

    if progress.failed() == 0 {
        println!("{} Uploaded {} annotation(s) to {}", CHECK, uploaded.len(), style(&cmd.item).cyan());
    } else {
        println!(
            "{} Uploaded {}/{} annotation(s), {} failed",
            WARN,
            uploaded.len(),
            total,
            style(progress.failed()).red()
        );
    }
    Ok(())
}
