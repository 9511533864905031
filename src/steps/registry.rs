//! Caller-registered functions for `custom` steps

use crate::core::StepError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A custom step body: keyword arguments and positional arguments in, one value out
pub type StepFunction = Arc<dyn Fn(Map<String, Value>, Vec<Value>) -> anyhow::Result<Value> + Send + Sync>;

/// Functions a `custom` step may call, keyed by `(path, method)`.
///
/// Only registered functions run. Pipeline definitions cannot load code.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<(String, String), StepFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, path: impl Into<String>, method: impl Into<String>, function: F)
    where
        F: Fn(Map<String, Value>, Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert((path.into(), method.into()), Arc::new(function));
    }

    pub fn with<F>(mut self, path: impl Into<String>, method: impl Into<String>, function: F) -> Self
    where
        F: Fn(Map<String, Value>, Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(path, method, function);
        self
    }

    pub fn contains(&self, path: &str, method: &str) -> bool {
        self.functions.contains_key(&(path.to_string(), method.to_string()))
    }

    pub fn get(&self, path: &str, method: &str) -> Result<StepFunction, StepError> {
        self.functions
            .get(&(path.to_string(), method.to_string()))
            .cloned()
            .ok_or_else(|| StepError::FunctionNotRegistered {
                path: path.to_string(),
                method: method.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.functions.keys().collect();
        keys.sort();
        f.debug_struct("FunctionRegistry").field("functions", &keys).finish()
    }
}
