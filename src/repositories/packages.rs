//! Packages and app-registry DPKs

use crate::client::{ApiClient, ApiRequest};
use crate::core::Result;
use crate::entities::{Dpk, Package};
use crate::repositories::{build_entities, get_entity, records, request_json};
use std::sync::Arc;

pub struct Packages {
    client: Arc<dyn ApiClient>,
}

impl Packages {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, package_id: &str) -> Result<Package> {
        get_entity(self.client.as_ref(), ApiRequest::get(format!("/packages/{}", package_id))).await
    }
}

/// App registry
pub struct Dpks {
    client: Arc<dyn ApiClient>,
}

impl Dpks {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Dpk>> {
        let response = request_json(self.client.as_ref(), ApiRequest::get("/app-registry")).await?;
        Ok(build_entities(records(response)).await)
    }

    pub async fn get(&self, dpk_id: &str) -> Result<Dpk> {
        get_entity(self.client.as_ref(), ApiRequest::get(format!("/app-registry/{}", dpk_id))).await
    }
}
