//! Transport to the Dataloop REST API

pub mod reqwest_client;
pub mod request;

use crate::core::{config::DEFAULT_POOL_SIZE, Result};
use async_trait::async_trait;
pub use request::{ApiRequest, ApiResponse, HttpMethod};
pub use reqwest_client::ReqwestApiClient;

/// Trait for sending requests - allows for different transports
///
/// Implementations return `Err` only for transport failures. Non-2xx
/// responses come back as `Ok` and are mapped to
/// [`PlatformError`](crate::core::PlatformError) by the repositories.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Send a request and return the raw response
    async fn gen_request(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Maximum number of concurrent requests for batch operations
    fn pool_size(&self) -> usize {
        DEFAULT_POOL_SIZE
    }
}
