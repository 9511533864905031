//! Test utilities: a scripted in-memory platform

#![allow(dead_code)]

use async_trait::async_trait;
use dataloop::client::{ApiClient, ApiRequest, ApiResponse, HttpMethod};
use dataloop::core::Result;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Handler = Box<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;

/// Mock client that returns scripted responses and records every request
///
/// Responses are matched by method and path. Queued responses are used
/// first, in order, then a handler registered for the route, then 404.
pub struct MockApiClient {
    queued: Mutex<HashMap<(HttpMethod, String), VecDeque<ApiResponse>>>,
    handlers: Mutex<HashMap<(HttpMethod, String), Arc<Handler>>>,
    requests: Mutex<Vec<ApiRequest>>,
    pool_size: usize,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self {
            queued: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            pool_size: 4,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Queue a JSON response for one call to `method path`
    pub fn respond(self, method: HttpMethod, path: &str, status: u16, body: Value) -> Self {
        self.queued
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse::json(status, body));
        self
    }

    /// Queue a raw body response
    pub fn respond_bytes(self, method: HttpMethod, path: &str, status: u16, body: Vec<u8>) -> Self {
        self.queued
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse::new(status, body));
        self
    }

    /// Answer every call to `method path` with `handler`
    pub fn handle<F>(self, method: HttpMethod, path: &str, handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Arc::new(Box::new(handler)));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

impl Default for MockApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn gen_request(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let key = (request.method, request.path.clone());

        let queued = self.queued.lock().unwrap().get_mut(&key).and_then(VecDeque::pop_front);
        if let Some(response) = queued {
            return Ok(response);
        }

        let handler = self.handlers.lock().unwrap().get(&key).cloned();
        if let Some(handler) = handler {
            // let concurrent batch requests interleave
            tokio::task::yield_now().await;
            return Ok(handler(&request));
        }

        Ok(ApiResponse::json(
            404,
            serde_json::json!({"message": format!("no route for {:?} {}", request.method, request.path)}),
        ))
    }

    fn pool_size(&self) -> usize {
        self.pool_size
    }
}
