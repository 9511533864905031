//! Runtime environment handed to each step

use crate::client::ApiClient;
use crate::repositories::Dataloop;
use crate::steps::registry::FunctionRegistry;
use std::sync::Arc;

/// What steps may reach while executing: the platform and registered functions
#[derive(Clone, Default)]
pub struct StepEnv {
    client: Option<Arc<dyn ApiClient>>,
    registry: FunctionRegistry,
}

impl StepEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client: Arc<dyn ApiClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// Repositories over the configured client, if any
    pub fn platform(&self) -> Option<Dataloop> {
        self.client.clone().map(Dataloop::new)
    }
}

impl std::fmt::Debug for StepEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepEnv")
            .field("client", &self.client.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}
