//! Step pipeline definitions loaded from JSON or YAML files

use crate::core::{PipelineContext, Result, StepError};
use crate::steps::env::StepEnv;
use crate::steps::stage::PipelineStage;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// A sequence of stages run locally against one context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineBuilder {
    pub name: String,
    pub stages: Vec<PipelineStage>,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    pub fn add_stage(&mut self, stage: PipelineStage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let name = value.get("name").and_then(Value::as_str).unwrap_or("pipeline");
        let stages = match value.get("stages") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(stages)) => stages.iter().map(PipelineStage::from_json).collect::<Result<_>>()?,
            Some(other) => {
                return Err(StepError::MalformedParams {
                    reason: format!("stages must be an array, got {}", other),
                }
                .into())
            }
        };

        Ok(Self {
            name: name.to_string(),
            stages,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_json(&value)
    }

    /// Load a definition, YAML for `.yaml`/`.yml`, JSON otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&serde_json::from_str(&content)?),
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub async fn execute(&self, context: &mut PipelineContext, env: &StepEnv) -> Result<()> {
        info!("Running '{}' ({} stage(s))", self.name, self.stages.len());
        for stage in &self.stages {
            stage.execute(context, env).await?;
        }
        info!("'{}' finished, context holds {} value(s)", self.name, context.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::registry::FunctionRegistry;
    use serde_json::json;
    use std::io::Write;

    const DEFINITION: &str = r#"
name: numbers
stages:
  - name: prepare
    steps:
      - type: custom
        path: nums.py
        method: make
        inputs:
          name: count
          from: 3
          by: val
        outputs:
          name: numbers
  - name: reduce
    steps:
      - type: custom
        path: nums.py
        method: sum
        inputs:
          - name: values
            from: numbers
            by: ref
        outputs:
          - name: total
"#;

    fn env() -> StepEnv {
        let registry = FunctionRegistry::new()
            .with("nums.py", "make", |kwargs, _| {
                let count = kwargs.get("count").and_then(Value::as_i64).unwrap_or(0);
                Ok(json!((1..=count).collect::<Vec<_>>()))
            })
            .with("nums.py", "sum", |kwargs, _| {
                let values = kwargs.get("values").and_then(Value::as_array).cloned().unwrap_or_default();
                Ok(json!(values.iter().filter_map(Value::as_i64).sum::<i64>()))
            });
        StepEnv::new().with_registry(registry)
    }

    #[tokio::test]
    async fn test_stages_share_context() {
        let builder = PipelineBuilder::from_yaml(DEFINITION).unwrap();
        assert_eq!(builder.stages.len(), 2);

        let mut context = PipelineContext::new();
        builder.execute(&mut context, &env()).await.unwrap();
        assert_eq!(context.get("numbers"), Some(&json!([1, 2, 3])));
        assert_eq!(context.get("total"), Some(&json!(6)));
    }

    #[tokio::test]
    async fn test_failure_stops_later_stages() {
        let mut builder = PipelineBuilder::from_yaml(DEFINITION).unwrap();
        builder.stages.swap(0, 1);

        let mut context = PipelineContext::new();
        assert!(builder.execute(&mut context, &env()).await.is_err());
        assert!(context.is_empty());
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let from_yaml = PipelineBuilder::from_yaml(DEFINITION).unwrap();
        let from_json = PipelineBuilder::from_json(&from_yaml.to_json().unwrap()).unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(DEFINITION.as_bytes()).unwrap();
        let builder = PipelineBuilder::from_file(file.path()).unwrap();
        assert_eq!(builder.name, "numbers");

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(builder.to_json().unwrap().to_string().as_bytes()).unwrap();
        assert_eq!(PipelineBuilder::from_file(file.path()).unwrap(), builder);
    }

    #[test]
    fn test_add_stage() {
        let mut builder = PipelineBuilder::new("manual");
        builder.add_stage(PipelineStage::new("first")).add_stage(PipelineStage::new("second"));
        let json = builder.to_json().unwrap();
        assert_eq!(json["stages"][1]["name"], json!("second"));
        assert_eq!(json["stages"][0]["steps"], json!([]));
    }
}
