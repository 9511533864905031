//! A named group of steps run in order

use crate::core::{PipelineContext, Result, StepError};
use crate::steps::env::StepEnv;
use crate::steps::step::PipelineStep;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// A named, ordered group of steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStage {
    pub name: String,
    pub steps: Vec<PipelineStep>,
}

impl PipelineStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn add_step(&mut self, step: PipelineStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| StepError::MalformedParams {
                reason: "stage requires a 'name'".to_string(),
            })?;

        let steps = match value.get("steps") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(steps)) => steps.iter().map(PipelineStep::from_json).collect::<Result<_>>()?,
            Some(other) => {
                return Err(StepError::MalformedParams {
                    reason: format!("steps of stage '{}' must be an array, got {}", name, other),
                }
                .into())
            }
        };

        Ok(Self {
            name: name.to_string(),
            steps,
        })
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Run the steps in order, stopping at the first failure
    pub async fn execute(&self, context: &mut PipelineContext, env: &StepEnv) -> Result<()> {
        info!("Stage '{}': {} step(s)", self.name, self.steps.len());
        for step in &self.steps {
            step.execute(context, env).await?;
        }
        Ok(())
    }
}
