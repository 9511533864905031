//! CLI output formatting

use crate::core::{GraphError, PipelineContext};
use crate::pipeline::{Pipeline, StartNodeKind};
use crate::repositories::BatchProgress;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Batch observer that drives a progress bar
pub struct BarProgress {
    bar: ProgressBar,
    failed: std::sync::atomic::AtomicUsize,
}

impl BarProgress {
    pub fn new(total: usize) -> Self {
        Self {
            bar: create_progress_bar(total),
            failed: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn failed(&self) -> usize {
        self.failed.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl BatchProgress for BarProgress {
    fn on_item_done(&self, _index: usize, ok: bool) {
        if !ok {
            let failed = self.failed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            self.bar.set_message(format!("{} failed", failed));
        }
        self.bar.inc(1);
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// One-paragraph overview of a pipeline graph
pub fn format_pipeline_summary(pipeline: &Pipeline) -> String {
    let mut lines = vec![
        format!("  Name: {}", style(&pipeline.name).bold()),
        format!("  Nodes: {}", style(pipeline.nodes.len()).cyan()),
        format!("  Connections: {}", style(pipeline.connections.len()).cyan()),
    ];

    for node in &pipeline.nodes {
        let marker = if pipeline.is_root(node.node_id()) {
            style("(root)").green().to_string()
        } else {
            String::new()
        };
        lines.push(format!(
            "    - {} [{:?}] {}",
            style(node.name()).bold(),
            node.node_type(),
            marker
        ));
    }

    let triggers = pipeline
        .start_nodes
        .iter()
        .filter(|s| s.kind == StartNodeKind::Trigger || s.trigger.is_some())
        .count();
    if triggers > 0 {
        lines.push(format!("  Triggers: {}", style(triggers).cyan()));
    }

    lines.join("\n")
}

pub fn format_graph_error(error: &GraphError) -> String {
    format!("{} {}", CROSS, style(error).red())
}

/// Context values, one per line, long values truncated
pub fn format_context(context: &PipelineContext, max_lines: usize) -> String {
    let mut keys: Vec<&String> = context.keys().collect();
    keys.sort();

    keys.into_iter()
        .filter_map(|key| {
            let value = context.get(key)?;
            let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            Some(format!("  {} = {}", style(key).cyan(), format_output(&rendered, max_lines)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_output_truncates() {
        let text = "1\n2\n3\n4";
        assert_eq!(format_output(text, 5), text);
        let truncated = format_output(text, 2);
        assert!(truncated.starts_with("1\n2\n"));
        assert!(truncated.contains("2 more lines"));
    }

    #[test]
    fn test_format_context_sorted() {
        let context: PipelineContext = [
            ("b".to_string(), json!(2)),
            ("a".to_string(), json!("x")),
        ]
        .into_iter()
        .collect();
        let rendered = console::strip_ansi_codes(&format_context(&context, 5)).to_string();
        let a = rendered.find("a = ").unwrap();
        let b = rendered.find("b = ").unwrap();
        assert!(a < b);
    }
}
