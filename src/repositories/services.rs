//! Services and bots

use crate::client::{ApiClient, ApiRequest};
use crate::core::Result;
use crate::entities::{Bot, Service};
use crate::repositories::{build_entities, get_entity, records, request_json};
use std::sync::Arc;

pub struct Services {
    client: Arc<dyn ApiClient>,
}

impl Services {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, service_id: &str) -> Result<Service> {
        get_entity(self.client.as_ref(), ApiRequest::get(format!("/services/{}", service_id))).await
    }
}

pub struct Bots {
    client: Arc<dyn ApiClient>,
}

impl Bots {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Bot>> {
        let response = request_json(
            self.client.as_ref(),
            ApiRequest::get(format!("/projects/{}/bots", project_id)),
        )
        .await?;
        Ok(build_entities(records(response)).await)
    }

    pub async fn get(&self, bot_id: &str) -> Result<Bot> {
        get_entity(self.client.as_ref(), ApiRequest::get(format!("/bots/{}", bot_id))).await
    }
}
