//! Typed wrappers over the REST endpoints
//!
//! Each repository holds a shared [`ApiClient`] handle, builds the request,
//! maps non-2xx responses to [`PlatformError`] and parses entities.

pub mod annotations;
pub mod datasets;
pub mod items;
pub mod packages;
pub mod pipelines;
pub mod services;

pub use annotations::Annotations;
pub use datasets::Datasets;
pub use items::Items;
pub use packages::{Dpks, Packages};
pub use pipelines::Pipelines;
pub use services::{Bots, Services};

use crate::client::{ApiClient, ApiRequest, ReqwestApiClient};
use crate::core::{ClientConfig, PlatformError, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Page size used for query endpoints
pub const PAGE_SIZE: usize = 1000;

/// Observer for batch operations
pub trait BatchProgress: Send + Sync {
    fn on_start(&self, _total: usize) {}

    /// Called once per finished element, in completion order
    fn on_item_done(&self, _index: usize, _ok: bool) {}

    fn on_finish(&self) {}
}

/// Progress observer that ignores every event
pub struct NoProgress;

impl BatchProgress for NoProgress {}

/// Entry point bundling every repository over one client
#[derive(Clone)]
pub struct Dataloop {
    client: Arc<dyn ApiClient>,
}

impl Dataloop {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    /// Connect with the default reqwest transport
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(ReqwestApiClient::new(config)?)))
    }

    pub fn client(&self) -> Arc<dyn ApiClient> {
        self.client.clone()
    }

    pub fn pipelines(&self) -> Pipelines {
        Pipelines::new(self.client.clone())
    }

    pub fn datasets(&self) -> Datasets {
        Datasets::new(self.client.clone())
    }

    pub fn items(&self) -> Items {
        Items::new(self.client.clone())
    }

    pub fn annotations(&self) -> Annotations {
        Annotations::new(self.client.clone())
    }

    pub fn services(&self) -> Services {
        Services::new(self.client.clone())
    }

    pub fn packages(&self) -> Packages {
        Packages::new(self.client.clone())
    }

    pub fn dpks(&self) -> Dpks {
        Dpks::new(self.client.clone())
    }

    pub fn bots(&self) -> Bots {
        Bots::new(self.client.clone())
    }
}

/// Send a request and return its JSON body, mapping failures to platform errors
pub(crate) async fn request_json(client: &dyn ApiClient, request: ApiRequest) -> Result<Value> {
    debug!("{:?} {}", request.method, request.path);
    let response = client.gen_request(request).await?;
    if !response.ok() {
        return Err(PlatformError::from_response(&response).into());
    }
    response.to_value()
}

/// Fetch a single entity
pub(crate) async fn get_entity<T: DeserializeOwned>(client: &dyn ApiClient, request: ApiRequest) -> Result<T> {
    let value = request_json(client, request).await?;
    Ok(serde_json::from_value(value)?)
}

/// Extract the records of a list response: a bare array or a page object
pub(crate) fn records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(records) => records,
        Value::Object(mut page) => match page.remove("items") {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Walk every page of a query endpoint and return all records
pub(crate) async fn query_all(client: &dyn ApiClient, path: &str, query: Value) -> Result<Vec<Value>> {
    let mut all = Vec::new();
    let mut page = 0usize;
    loop {
        let mut body = query.clone();
        if let Some(body) = body.as_object_mut() {
            body.insert("page".to_string(), json!(page));
            body.insert("pageSize".to_string(), json!(PAGE_SIZE));
        }

        let response = request_json(client, ApiRequest::post(path, body)).await?;
        let has_next = response.get("hasNextPage").and_then(Value::as_bool).unwrap_or(false);
        let page_records = records(response);
        if page_records.is_empty() {
            if has_next {
                warn!("Empty page {} from {} still reports more pages, stopping", page, path);
            }
            break;
        }
        all.extend(page_records);

        if !has_next {
            break;
        }
        page += 1;
    }
    debug!("Fetched {} records from {} in {} page(s)", all.len(), path, page + 1);
    Ok(all)
}

/// Build entities from JSON records on the blocking pool.
///
/// Output order follows input order. Records that fail to parse are logged
/// and dropped.
pub(crate) async fn build_entities<T>(records: Vec<Value>) -> Vec<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let handles: Vec<_> = records
        .into_iter()
        .map(|record| tokio::task::spawn_blocking(move || serde_json::from_value::<T>(record)))
        .collect();

    let mut entities = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(entity)) => entities.push(entity),
            Ok(Err(err)) => error!("Failed to build entity at index {}: {}", index, err),
            Err(err) => error!("Entity builder at index {} did not finish: {}", index, err),
        }
    }
    entities
}

/// Run `job` over `inputs` with at most `pool_size` in flight.
///
/// Successful results are returned in input order. Failures are logged
/// with their index and left out.
pub(crate) async fn run_batch<I, T, F, Fut>(
    pool_size: usize,
    inputs: Vec<I>,
    progress: &dyn BatchProgress,
    job: F,
) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let total = inputs.len();
    progress.on_start(total);

    let semaphore = Arc::new(Semaphore::new(pool_size.max(1)));
    let job = Arc::new(job);
    let mut tasks = JoinSet::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let job = job.clone();
        tasks.spawn(async move {
            // Hold the permit until the request completes
            let _permit = semaphore.acquire_owned().await.ok();
            (index, job(input).await)
        });
    }

    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(value))) => {
                results[index] = Some(value);
                progress.on_item_done(index, true);
            }
            Ok((index, Err(err))) => {
                error!("Batch element {} failed: {}", index, err);
                progress.on_item_done(index, false);
            }
            Err(err) => error!("Batch task did not finish: {}", err),
        }
    }

    progress.on_finish();
    results.into_iter().flatten().collect()
}
