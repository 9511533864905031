//! Pipelines: query, create and lifecycle calls

use crate::client::{ApiClient, ApiRequest};
use crate::core::{PlatformError, Result};
use crate::pipeline::Pipeline;
use crate::repositories::{build_entities, get_entity, query_all, request_json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct Pipelines {
    client: Arc<dyn ApiClient>,
}

impl Pipelines {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Pipeline>> {
        let query = json!({
            "resource": "pipeline",
            "filter": {"projectId": project_id}
        });
        let records = query_all(self.client.as_ref(), "/pipelines/query", query).await?;
        Ok(build_entities(records).await)
    }

    pub async fn get(&self, pipeline_id: &str) -> Result<Pipeline> {
        get_entity(self.client.as_ref(), ApiRequest::get(format!("/pipelines/{}", pipeline_id))).await
    }

    pub async fn get_by_name(&self, project_id: &str, name: &str) -> Result<Pipeline> {
        let query = json!({
            "resource": "pipeline",
            "filter": {"projectId": project_id, "name": name}
        });
        let records = query_all(self.client.as_ref(), "/pipelines/query", query).await?;
        let mut pipelines: Vec<Pipeline> = build_entities(records).await;
        match pipelines.len() {
            0 => Err(PlatformError::not_found(format!("Pipeline not found: name={}", name)).into()),
            1 => Ok(pipelines.remove(0)),
            n => Err(PlatformError::bad_request(format!("Found {} pipelines named '{}'", n, name)).into()),
        }
    }

    /// Create the pipeline on the platform after checking its graph
    pub async fn create(&self, pipeline: &Pipeline) -> Result<Pipeline> {
        pipeline.validate()?;
        let created: Pipeline =
            get_entity(self.client.as_ref(), ApiRequest::post("/pipelines", pipeline.to_json()?)).await?;
        info!("Created pipeline '{}' ({})", created.name, created.id.as_deref().unwrap_or("-"));
        Ok(created)
    }

    pub async fn update(&self, pipeline: &Pipeline) -> Result<Pipeline> {
        let pipeline_id = pipeline
            .id
            .as_deref()
            .ok_or_else(|| PlatformError::bad_request("Cannot update a pipeline without an id"))?;
        pipeline.validate()?;
        get_entity(
            self.client.as_ref(),
            ApiRequest::patch(format!("/pipelines/{}", pipeline_id), pipeline.to_json()?),
        )
        .await
    }

    pub async fn delete(&self, pipeline_id: &str) -> Result<()> {
        request_json(self.client.as_ref(), ApiRequest::delete(format!("/pipelines/{}", pipeline_id))).await?;
        info!("Deleted pipeline {}", pipeline_id);
        Ok(())
    }

    pub async fn install(&self, pipeline_id: &str) -> Result<Pipeline> {
        get_entity(
            self.client.as_ref(),
            ApiRequest::post(format!("/pipelines/{}/install", pipeline_id), json!({})),
        )
        .await
    }

    pub async fn pause(&self, pipeline_id: &str) -> Result<()> {
        request_json(
            self.client.as_ref(),
            ApiRequest::post(format!("/pipelines/{}/uninstall", pipeline_id), json!({})),
        )
        .await?;
        Ok(())
    }
}
