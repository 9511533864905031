//! Request and response types exchanged with the platform

use crate::core::Result;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// A single API call, path relative to the gateway base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub json_body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            json_body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Patch, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Raw response: status code and body bytes
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Build a response carrying a JSON body
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
        }
    }

    /// Whether the status is 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, an empty body is `null`
    pub fn to_value(&self) -> Result<Value> {
        if self.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::post("/pipelines", json!({"name": "p"})).with_query("projectId", "p-1");
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.json_body, Some(json!({"name": "p"})));
        assert_eq!(request.query, vec![("projectId".to_string(), "p-1".to_string())]);
    }

    #[test]
    fn test_response_status_and_body() {
        let response = ApiResponse::json(201, json!({"id": "x"}));
        assert!(response.ok());
        assert_eq!(response.to_value().unwrap(), json!({"id": "x"}));

        let empty = ApiResponse::new(204, Vec::new());
        assert!(empty.ok());
        assert_eq!(empty.to_value().unwrap(), Value::Null);

        assert!(!ApiResponse::new(404, Vec::new()).ok());
    }
}
