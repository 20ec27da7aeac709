//! State types for conversation state management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State for conversation context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// String values from providers (for template substitution)
    pub values: HashMap<String, String>,

    /// Structured data from providers (for programmatic access)
    pub data: HashMap<String, serde_json::Value>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string value
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a string value
    pub fn get_value(&self, key: &str) -> Option<&String> {
        self.values.get(key)
    }

    /// Set structured data
    pub fn set_data(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get structured data
    pub fn get_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Merge another state into this one
    pub fn merge(&mut self, other: State) {
        self.values.extend(other.values);
        self.data.extend(other.data);
    }
}
