//! Operations a step can bind to

use crate::core::{Result, StepError};
use crate::repositories::Dataloop;
use crate::steps::env::StepEnv;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// The fixed set of step operations.
///
/// Platform operations go through the repositories; `Custom` calls a
/// function from the environment's registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    DatasetsGet,
    ItemsList,
    ItemsGet,
    ItemsDownload,
    AnnotationsList,
    AnnotationsUpload,
    Custom { path: String, method: String },
}

impl StepKind {
    pub fn from_type_name(type_name: &str, path: Option<&str>, method: Option<&str>) -> std::result::Result<Self, StepError> {
        Ok(match type_name {
            "datasets_get" => StepKind::DatasetsGet,
            "items_list" => StepKind::ItemsList,
            "items_get" => StepKind::ItemsGet,
            "items_download" => StepKind::ItemsDownload,
            "annotations_list" => StepKind::AnnotationsList,
            "annotations_upload" => StepKind::AnnotationsUpload,
            "custom" => match (path, method) {
                (Some(path), Some(method)) => StepKind::Custom {
                    path: path.to_string(),
                    method: method.to_string(),
                },
                _ => {
                    return Err(StepError::MalformedParams {
                        reason: "custom step requires 'path' and 'method'".to_string(),
                    })
                }
            },
            other => {
                return Err(StepError::UnknownStepType {
                    type_name: other.to_string(),
                })
            }
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StepKind::DatasetsGet => "datasets_get",
            StepKind::ItemsList => "items_list",
            StepKind::ItemsGet => "items_get",
            StepKind::ItemsDownload => "items_download",
            StepKind::AnnotationsList => "annotations_list",
            StepKind::AnnotationsUpload => "annotations_upload",
            StepKind::Custom { .. } => "custom",
        }
    }

    /// Run the operation with resolved keyword and positional arguments
    pub async fn invoke(&self, env: &StepEnv, kwargs: Map<String, Value>, args: Vec<Value>) -> Result<Value> {
        debug!("Invoking {} with {} kwargs", self.type_name(), kwargs.len());

        match self {
            StepKind::Custom { path, method } => {
                let function = env.registry().get(path, method)?;
                function(kwargs, args).map_err(|err| {
                    StepError::Failed {
                        step: format!("{}::{}", path, method),
                        reason: format!("{:#}", err),
                    }
                    .into()
                })
            }
            StepKind::DatasetsGet => {
                let platform = self.platform(env)?;
                let dataset = platform.datasets().get(self.id_arg(&kwargs, "dataset_id")?).await?;
                Ok(serde_json::to_value(dataset)?)
            }
            StepKind::ItemsList => {
                let platform = self.platform(env)?;
                let filters = kwargs.get("filters").filter(|f| !f.is_null()).cloned();
                let items = platform.items().list(self.id_arg(&kwargs, "dataset_id")?, filters).await?;
                Ok(serde_json::to_value(items)?)
            }
            StepKind::ItemsGet => {
                let platform = self.platform(env)?;
                let item = platform.items().get(self.id_arg(&kwargs, "item_id")?).await?;
                Ok(serde_json::to_value(item)?)
            }
            StepKind::ItemsDownload => {
                let platform = self.platform(env)?;
                let local_path = self.str_arg(&kwargs, "local_path")?;
                let written = platform
                    .items()
                    .download(self.id_arg(&kwargs, "item_id")?, Path::new(local_path))
                    .await?;
                Ok(Value::String(written.display().to_string()))
            }
            StepKind::AnnotationsList => {
                let platform = self.platform(env)?;
                let annotations = platform.annotations().list(self.id_arg(&kwargs, "item_id")?).await?;
                Ok(serde_json::to_value(annotations)?)
            }
            StepKind::AnnotationsUpload => {
                let platform = self.platform(env)?;
                let annotations = match kwargs.get("annotations") {
                    Some(Value::Array(annotations)) => annotations.clone(),
                    Some(single @ Value::Object(_)) => vec![single.clone()],
                    _ => return Err(self.missing("annotations").into()),
                };
                let uploaded = platform
                    .annotations()
                    .upload(self.id_arg(&kwargs, "item_id")?, annotations)
                    .await?;
                Ok(serde_json::to_value(uploaded)?)
            }
        }
    }

    fn platform(&self, env: &StepEnv) -> std::result::Result<Dataloop, StepError> {
        env.platform().ok_or_else(|| StepError::Failed {
            step: self.type_name().to_string(),
            reason: "no platform client configured".to_string(),
        })
    }

    fn missing(&self, argument: &str) -> StepError {
        StepError::MissingArgument {
            step: self.type_name().to_string(),
            argument: argument.to_string(),
        }
    }

    fn str_arg<'a>(&self, kwargs: &'a Map<String, Value>, name: &str) -> std::result::Result<&'a str, StepError> {
        kwargs.get(name).and_then(Value::as_str).ok_or_else(|| self.missing(name))
    }

    /// An id given directly, or the `id` of an entity produced by an earlier step
    fn id_arg<'a>(&self, kwargs: &'a Map<String, Value>, name: &str) -> std::result::Result<&'a str, StepError> {
        match kwargs.get(name) {
            Some(Value::String(id)) => Ok(id),
            Some(Value::Object(entity)) => entity.get("id").and_then(Value::as_str).ok_or_else(|| self.missing(name)),
            _ => Err(self.missing(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::registry::FunctionRegistry;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        for name in [
            "datasets_get",
            "items_list",
            "items_get",
            "items_download",
            "annotations_list",
            "annotations_upload",
        ] {
            assert_eq!(StepKind::from_type_name(name, None, None).unwrap().type_name(), name);
        }
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            StepKind::from_type_name("items_upload", None, None),
            Err(StepError::UnknownStepType {
                type_name: "items_upload".to_string()
            })
        );
    }

    #[test]
    fn test_custom_requires_path_and_method() {
        assert!(StepKind::from_type_name("custom", Some("a.py"), None).is_err());
        assert_eq!(
            StepKind::from_type_name("custom", Some("a.py"), Some("run")).unwrap(),
            StepKind::Custom {
                path: "a.py".to_string(),
                method: "run".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_platform_step_without_client() {
        let mut kwargs = Map::new();
        kwargs.insert("dataset_id".to_string(), json!("ds-1"));
        let err = StepKind::DatasetsGet
            .invoke(&StepEnv::new(), kwargs, Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no platform client"));
    }

    #[tokio::test]
    async fn test_custom_step_runs_without_platform() {
        let registry = FunctionRegistry::new()
            .with("a.py", "echo", |kwargs, _| Ok(Value::Object(kwargs)))
            .with("a.py", "fail", |_, _| Err(anyhow::anyhow!("bad input")));
        let env = StepEnv::new().with_registry(registry);
        let custom = |method: &str| StepKind::Custom {
            path: "a.py".to_string(),
            method: method.to_string(),
        };

        let mut kwargs = Map::new();
        kwargs.insert("x".to_string(), json!(1));
        let echoed = custom("echo").invoke(&env, kwargs, Vec::new()).await.unwrap();
        assert_eq!(echoed, json!({"x": 1}));

        let err = custom("fail").invoke(&env, Map::new(), Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            crate::core::Error::Step(StepError::Failed { ref step, ref reason })
                if step == "a.py::fail" && reason == "bad input"
        ));
    }

    #[test]
    fn test_id_arg_accepts_entities() {
        let mut kwargs = Map::new();
        kwargs.insert("item_id".to_string(), json!({"id": "item-7", "name": "a.jpg"}));
        assert_eq!(StepKind::ItemsGet.id_arg(&kwargs, "item_id").unwrap(), "item-7");
        assert!(StepKind::ItemsGet.id_arg(&kwargs, "dataset_id").is_err());
    }
}
