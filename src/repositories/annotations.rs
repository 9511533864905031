//! Annotations: per-item listing and batched upload and update

use crate::client::{ApiClient, ApiRequest};
use crate::core::{PlatformError, Result};
use crate::entities::Annotation;
use crate::repositories::{build_entities, get_entity, records, request_json, run_batch, BatchProgress, NoProgress};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

pub struct Annotations {
    client: Arc<dyn ApiClient>,
}

impl Annotations {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, item_id: &str) -> Result<Vec<Annotation>> {
        let response = request_json(
            self.client.as_ref(),
            ApiRequest::get(format!("/items/{}/annotations", item_id)),
        )
        .await?;
        Ok(build_entities(records(response)).await)
    }

    pub async fn get(&self, annotation_id: &str) -> Result<Annotation> {
        get_entity(
            self.client.as_ref(),
            ApiRequest::get(format!("/annotations/{}", annotation_id)),
        )
        .await
    }

    pub async fn delete(&self, annotation_id: &str) -> Result<()> {
        request_json(
            self.client.as_ref(),
            ApiRequest::delete(format!("/annotations/{}", annotation_id)),
        )
        .await?;
        Ok(())
    }

    /// Upload annotations to an item, one request per annotation
    pub async fn upload(&self, item_id: &str, annotations: Vec<Value>) -> Result<Vec<Annotation>> {
        self.upload_with_progress(item_id, annotations, &NoProgress).await
    }

    /// Like [`upload`](Self::upload), reporting each finished request.
    ///
    /// Failed uploads are logged and left out of the result.
    pub async fn upload_with_progress(
        &self,
        item_id: &str,
        annotations: Vec<Value>,
        progress: &dyn BatchProgress,
    ) -> Result<Vec<Annotation>> {
        let total = annotations.len();
        let client = self.client.clone();
        let path = format!("/items/{}/annotations", item_id);

        let uploaded: Vec<Vec<Annotation>> =
            run_batch(self.client.pool_size(), annotations, progress, move |annotation| {
                let client = client.clone();
                let path = path.clone();
                async move {
                    let response = request_json(client.as_ref(), ApiRequest::post(path, json!([annotation]))).await?;
                    let created = records(response)
                        .into_iter()
                        .map(serde_json::from_value)
                        .collect::<std::result::Result<Vec<Annotation>, _>>()?;
                    Ok(created)
                }
            })
            .await;

        let uploaded: Vec<Annotation> = uploaded.into_iter().flatten().collect();
        info!("Uploaded {}/{} annotations to item {}", uploaded.len(), total, item_id);
        Ok(uploaded)
    }

    /// Push local changes of existing annotations
    pub async fn update(&self, annotations: Vec<Annotation>) -> Result<Vec<Annotation>> {
        if let Some(missing) = annotations.iter().position(|a| a.id.is_empty()) {
            return Err(PlatformError::bad_request(format!(
                "Annotation at index {} has no id, upload it instead",
                missing
            ))
            .into());
        }

        let client = self.client.clone();
        let updated = run_batch(self.client.pool_size(), annotations, &NoProgress, move |annotation| {
            let client = client.clone();
            async move {
                let path = format!("/annotations/{}", annotation.id);
                get_entity::<Annotation>(client.as_ref(), ApiRequest::put(path, serde_json::to_value(&annotation)?))
                    .await
            }
        })
        .await;
        Ok(updated)
    }
}
