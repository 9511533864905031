//! Step parameter declarations and context lookup

use crate::core::{PipelineContext, StepError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a step input gets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    /// `from` is the value itself
    Val,
    /// `from` names a context key
    Ref,
}

impl ParamSource {
    pub fn parse(by: &str) -> Result<Self, StepError> {
        match by {
            "val" => Ok(ParamSource::Val),
            "ref" => Ok(ParamSource::Ref),
            other => Err(StepError::InvalidParamSource { by: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    pub name: String,
    pub from: Value,
    pub by: ParamSource,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
}

impl StepInput {
    pub fn val(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            from: value,
            by: ParamSource::Val,
            input_type: None,
        }
    }

    pub fn reference(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: Value::String(key.into()),
            by: ParamSource::Ref,
            input_type: None,
        }
    }

    /// Parse one declaration, reporting bad `by` values as such
    pub fn from_json(value: &Value) -> Result<Self, StepError> {
        let object = value.as_object().ok_or_else(|| StepError::MalformedParams {
            reason: format!("expected an object, got {}", value),
        })?;
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| missing_field("name"))?;
        let from = object.get("from").ok_or_else(|| missing_field("from"))?;
        let by = object.get("by").and_then(Value::as_str).ok_or_else(|| missing_field("by"))?;

        Ok(Self {
            name: name.to_string(),
            from: from.clone(),
            by: ParamSource::parse(by)?,
            input_type: object.get("type").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Context key of a `ref` input
    pub fn ref_key(&self) -> Result<Option<&str>, StepError> {
        match self.by {
            ParamSource::Val => Ok(None),
            ParamSource::Ref => self
                .from
                .as_str()
                .map(Some)
                .ok_or_else(|| StepError::MalformedParams {
                    reason: format!("'from' of ref input '{}' must be a string", self.name),
                }),
        }
    }

    /// The literal for `val`, the context value for `ref`
    pub fn resolve(&self, context: &PipelineContext) -> Result<Value, StepError> {
        match self.ref_key()? {
            None => Ok(self.from.clone()),
            Some(key) => context.get(key).cloned().ok_or_else(|| StepError::MissingInput {
                name: key.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
}

impl StepOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_type: None,
        }
    }
}

fn missing_field(field: &str) -> StepError {
    StepError::MalformedParams {
        reason: format!("param is missing '{}'", field),
    }
}

/// Parse step inputs given as one object or an array of objects
pub fn parse_inputs(params: &Value) -> Result<Vec<StepInput>, StepError> {
    match params {
        Value::Null => Ok(Vec::new()),
        Value::Object(_) => Ok(vec![StepInput::from_json(params)?]),
        Value::Array(entries) => entries.iter().map(StepInput::from_json).collect(),
        other => Err(StepError::MalformedParams {
            reason: format!("expected an object or array of objects, got {}", other),
        }),
    }
}

/// Resolve the param named `name` against `context`.
///
/// `params` is a single declaration, used whatever its name, or an array
/// searched by name. Returns `Ok(None)` when the array has no such entry.
pub fn get_value_from_context(
    params: &Value,
    context: &PipelineContext,
    name: &str,
) -> Result<Option<Value>, StepError> {
    let declaration = match params {
        Value::Object(_) => StepInput::from_json(params)?,
        Value::Array(entries) => {
            let entry = entries
                .iter()
                .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name));
            match entry {
                Some(entry) => StepInput::from_json(entry)?,
                None => return Ok(None),
            }
        }
        other => {
            return Err(StepError::MalformedParams {
                reason: format!("expected an object or array of objects, got {}", other),
            })
        }
    };
    declaration.resolve(context).map(Some)
}
