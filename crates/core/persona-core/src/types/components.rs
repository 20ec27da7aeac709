//! Component contracts mounted by plugins

use super::State;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Provider result
#[derive(Debug, Clone, Default)]
pub struct ProviderResult {
    /// Human-readable text for LLM prompt
    pub text: Option<String>,

    /// Key-value pairs for template substitution
    pub values: Option<HashMap<String, String>>,

    /// Structured data for programmatic access
    pub data: Option<HashMap<String, serde_json::Value>>,
}

/// Provider trait - supplies contextual information
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Description
    fn description(&self) -> Option<String> {
        None
    }

    /// Position in provider list (affects execution order)
    fn position(&self) -> i32 {
        0
    }

    /// Get provider data
    async fn get(
        &self,
        runtime: Arc<dyn std::any::Any + Send + Sync>,
        state: &State,
    ) -> Result<ProviderResult>;
}
