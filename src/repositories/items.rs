//! Items: dataset queries and binary downloads

use crate::client::{ApiClient, ApiRequest, HttpMethod};
use crate::core::{PlatformError, Result};
use crate::entities::Item;
use crate::repositories::{build_entities, get_entity, query_all};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct Items {
    client: Arc<dyn ApiClient>,
}

impl Items {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    /// Query filter matching every file in a dataset
    pub fn default_filter() -> Value {
        json!({"$and": [{"hidden": false}, {"type": "file"}]})
    }

    pub async fn get(&self, item_id: &str) -> Result<Item> {
        get_entity(self.client.as_ref(), ApiRequest::get(format!("/items/{}", item_id))).await
    }

    /// List the dataset's items, all pages, optionally narrowed by a query filter
    pub async fn list(&self, dataset_id: &str, filters: Option<Value>) -> Result<Vec<Item>> {
        let query = json!({
            "resource": "items",
            "filter": filters.unwrap_or_else(Self::default_filter)
        });
        let path = format!("/datasets/{}/query", dataset_id);
        let records = query_all(self.client.as_ref(), &path, query).await?;
        Ok(build_entities(records).await)
    }

    /// Stream the item's binary into `local_path`.
    ///
    /// When `local_path` is an existing directory the item's name is appended.
    pub async fn download(&self, item_id: &str, local_path: &Path) -> Result<PathBuf> {
        let request = ApiRequest::new(HttpMethod::Get, format!("/items/{}/stream", item_id));
        let response = self.client.gen_request(request).await?;
        if !response.ok() {
            return Err(PlatformError::from_response(&response).into());
        }

        let target = if local_path.is_dir() {
            let item = self.get(item_id).await?;
            // only the final component, the name comes from the server
            let file_name = Path::new(&item.name).file_name().ok_or_else(|| {
                PlatformError::bad_request(format!("Item {} has no usable file name: '{}'", item_id, item.name))
            })?;
            local_path.join(file_name)
        } else {
            local_path.to_path_buf()
        };
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &response.body).await?;

        info!("Downloaded item {} to {}", item_id, target.display());
        Ok(target)
    }
}
