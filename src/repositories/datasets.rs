//! Datasets repository

use crate::client::{ApiClient, ApiRequest};
use crate::core::Result;
use crate::entities::Dataset;
use crate::repositories::{build_entities, get_entity, records, request_json};
use std::sync::Arc;

pub struct Datasets {
    client: Arc<dyn ApiClient>,
}

impl Datasets {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, dataset_id: &str) -> Result<Dataset> {
        get_entity(self.client.as_ref(), ApiRequest::get(format!("/datasets/{}", dataset_id))).await
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Dataset>> {
        let request = ApiRequest::get("/datasets").with_query("projects", project_id);
        let response = request_json(self.client.as_ref(), request).await?;
        Ok(build_entities(records(response)).await)
    }
}
