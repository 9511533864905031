//! A single step: resolve inputs, call the operation, store outputs

use crate::core::{PipelineContext, Result, StepError};
use crate::steps::env::StepEnv;
use crate::steps::kinds::StepKind;
use crate::steps::params::{parse_inputs, StepInput, StepOutput};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub kind: StepKind,
    pub inputs: Vec<StepInput>,
    pub outputs: Vec<StepOutput>,
    pub kwargs: Map<String, Value>,
    pub args: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StepWire {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default)]
    inputs: Value,
    #[serde(default)]
    outputs: Value,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    kwargs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<Value>,
}

impl PipelineStep {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            kwargs: Map::new(),
            args: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: StepInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(StepOutput::new(name));
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.kwargs.insert(key.into(), value);
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let wire: StepWire = serde_json::from_value(value.clone())?;
        let kind = StepKind::from_type_name(&wire.type_name, wire.path.as_deref(), wire.method.as_deref())?;

        let outputs = match wire.outputs {
            Value::Null => Vec::new(),
            Value::Array(_) => serde_json::from_value(wire.outputs)?,
            single @ Value::Object(_) => vec![serde_json::from_value(single)?],
            other => {
                return Err(StepError::MalformedParams {
                    reason: format!("outputs must be an object or array, got {}", other),
                }
                .into())
            }
        };

        Ok(Self {
            kind,
            inputs: parse_inputs(&wire.inputs)?,
            outputs,
            kwargs: wire.kwargs,
            args: wire.args,
        })
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Run the step against `context`.
    ///
    /// Every `ref` input must be present before anything runs, and the
    /// returned value is checked against the declared outputs before any
    /// of them is written.
    pub async fn execute(&self, context: &mut PipelineContext, env: &StepEnv) -> Result<()> {
        for input in &self.inputs {
            if let Some(key) = input.ref_key()? {
                if !context.contains(key) {
                    return Err(StepError::MissingInput { name: key.to_string() }.into());
                }
            }
        }

        let mut kwargs = self.kwargs.clone();
        for input in &self.inputs {
            kwargs.insert(input.name.clone(), input.resolve(context)?);
        }

        info!("Running step {}", self.kind.type_name());
        let value = self.kind.invoke(env, kwargs, self.args.clone()).await?;
        self.store_outputs(context, value)?;
        Ok(())
    }

    fn store_outputs(&self, context: &mut PipelineContext, value: Value) -> std::result::Result<(), StepError> {
        match self.outputs.as_slice() {
            [] => {}
            [output] => {
                debug!("Storing output '{}'", output.name);
                context.set(output.name.clone(), value);
            }
            outputs => {
                let values = match value {
                    Value::Array(values) if values.len() >= outputs.len() => values,
                    Value::Array(values) => {
                        return Err(StepError::OutputArity {
                            expected: outputs.len(),
                            actual: values.len(),
                        })
                    }
                    _ => {
                        return Err(StepError::OutputArity {
                            expected: outputs.len(),
                            actual: 1,
                        })
                    }
                };
                for (output, value) in outputs.iter().zip(values) {
                    context.set(output.name.clone(), value);
                }
            }
        }
        Ok(())
    }
}

impl Serialize for PipelineStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let (path, method) = match &self.kind {
            StepKind::Custom { path, method } => (Some(path.clone()), Some(method.clone())),
            _ => (None, None),
        };
        let inputs = serde_json::to_value(&self.inputs).map_err(serde::ser::Error::custom)?;
        let outputs = serde_json::to_value(&self.outputs).map_err(serde::ser::Error::custom)?;

        StepWire {
            type_name: self.kind.type_name().to_string(),
            path,
            method,
            inputs,
            outputs,
            kwargs: self.kwargs.clone(),
            args: self.args.clone(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::steps::registry::FunctionRegistry;
    use serde_json::json;

    fn env() -> StepEnv {
        let registry = FunctionRegistry::new()
            .with("math.py", "split", |kwargs, _| {
                let n = kwargs.get("n").and_then(Value::as_i64).unwrap_or(0);
                Ok(json!([n / 2, n % 2]))
            })
            .with("math.py", "echo", |kwargs, args| Ok(json!({"kwargs": kwargs, "args": args})));
        StepEnv::new().with_registry(registry)
    }

    fn custom(method: &str) -> PipelineStep {
        PipelineStep::new(StepKind::Custom {
            path: "math.py".to_string(),
            method: method.to_string(),
        })
    }

    #[tokio::test]
    async fn test_outputs_stored_positionally() {
        let step = custom("split")
            .with_input(StepInput::reference("n", "number"))
            .with_output("half")
            .with_output("rest");
        let mut context: PipelineContext = [("number".to_string(), json!(7))].into_iter().collect();

        step.execute(&mut context, &env()).await.unwrap();
        assert_eq!(context.get("half"), Some(&json!(3)));
        assert_eq!(context.get("rest"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_short_return_writes_nothing() {
        let step = custom("split")
            .with_input(StepInput::val("n", json!(4)))
            .with_output("a")
            .with_output("b")
            .with_output("c");
        let mut context = PipelineContext::new();

        let err = step.execute(&mut context, &env()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Step(StepError::OutputArity { expected: 3, actual: 2 })
        ));
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_missing_ref_input() {
        let step = custom("echo").with_input(StepInput::reference("item", "item"));
        let err = step.execute(&mut PipelineContext::new(), &env()).await.unwrap_err();
        assert!(matches!(err, Error::Step(StepError::MissingInput { ref name }) if name == "item"));
    }

    #[tokio::test]
    async fn test_kwargs_merged_with_inputs() {
        let step = custom("echo")
            .with_kwarg("limit", json!(10))
            .with_input(StepInput::val("limit", json!(5)))
            .with_output("result");
        let mut context = PipelineContext::new();

        step.execute(&mut context, &env()).await.unwrap();
        assert_eq!(context.get("result").unwrap()["kwargs"]["limit"], json!(5));
    }

    #[tokio::test]
    async fn test_unregistered_custom_step() {
        let step = custom("missing");
        let err = step.execute(&mut PipelineContext::new(), &env()).await.unwrap_err();
        assert!(matches!(err, Error::Step(StepError::FunctionNotRegistered { .. })));
    }

    #[test]
    fn test_json_round_trip() {
        let raw = json!({
            "type": "custom",
            "path": "math.py",
            "method": "split",
            "inputs": [{"name": "n", "from": "number", "by": "ref"}],
            "outputs": [{"name": "half"}, {"name": "rest"}]
        });
        let step = PipelineStep::from_json(&raw).unwrap();
        assert_eq!(step.to_json().unwrap(), raw);
    }

    #[test]
    fn test_single_object_params() {
        let step = PipelineStep::from_json(&json!({
            "type": "items_get",
            "inputs": {"name": "item_id", "from": "item-1", "by": "val"},
            "outputs": {"name": "item"}
        }))
        .unwrap();
        assert_eq!(step.inputs.len(), 1);
        assert_eq!(step.outputs[0].name, "item");
    }

    #[test]
    fn test_unknown_step_type() {
        let err = PipelineStep::from_json(&json!({"type": "teleport"})).unwrap_err();
        assert!(matches!(err, Error::Step(StepError::UnknownStepType { .. })));
    }
}
