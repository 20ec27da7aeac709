//! Symptom Profile Provider
//!
//! Renders the subject's current condition map as prompt context for the
//! narrative collaborator.

use crate::types::{ConditionMap, ConditionState};
use async_trait::async_trait;
use ordered_float::OrderedFloat;
use persona_core::{types::*, PersonaError, Result};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

/// State data key holding the serialized condition map
pub const CONDITION_MAP_KEY: &str = "condition_map";

/// Provides the active symptom profile to LLM prompts
pub struct SymptomProfileProvider {
    max_symptoms: usize,
}

impl SymptomProfileProvider {
    /// Create a new provider
    pub fn new() -> Self {
        Self { max_symptoms: 3 }
    }

    /// Limit how many symptoms are listed per condition
    pub fn with_max_symptoms(mut self, max_symptoms: usize) -> Self {
        self.max_symptoms = max_symptoms;
        self
    }

    fn render(&self, active: &[&ConditionState]) -> String {
        if active.is_empty() {
            return "No active psychological conditions.".to_string();
        }
        let mut lines = vec!["Active psychological conditions:".to_string()];
        for state in active {
            let symptoms: Vec<String> = state
                .top_symptoms(self.max_symptoms)
                .into_iter()
                .map(|(name, value)| format!("{} {:.2}", name.replace('_', " "), value))
                .collect();
            let mut line = format!(
                "- {} (severity {:.2}, since age {})",
                state.name.replace('_', " "),
                state.severity,
                state.onset_age
            );
            if !symptoms.is_empty() {
                line.push_str(&format!(": {}", symptoms.join(", ")));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

impl Default for SymptomProfileProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for SymptomProfileProvider {
    fn name(&self) -> &str {
        "symptom_profile"
    }

    fn description(&self) -> Option<String> {
        Some("Provides active psychological conditions and leading symptoms".to_string())
    }

    fn position(&self) -> i32 {
        -4
    }

    async fn get(
        &self,
        _runtime: Arc<dyn std::any::Any + Send + Sync>,
        state: &State,
    ) -> Result<ProviderResult> {
        let map: ConditionMap = match state.get_data(CONDITION_MAP_KEY) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                PersonaError::provider(format!("malformed {}: {}", CONDITION_MAP_KEY, e))
            })?,
            None => ConditionMap::new(),
        };

        let mut active: Vec<&ConditionState> = map.values().filter(|s| s.is_active()).collect();
        active.sort_by_key(|s| (Reverse(OrderedFloat(s.severity)), s.name.clone()));

        let context = self.render(&active);
        let names: Vec<&str> = active.iter().map(|s| s.name.as_str()).collect();
        let primary = names.first().copied().unwrap_or_default().to_string();

        tracing::debug!(
            active = active.len(),
            tracked = map.len(),
            primary = %primary,
            "SymptomProfileProvider: Providing symptom context"
        );

        let mut values = HashMap::new();
        values.insert("SYMPTOM_CONTEXT".to_string(), context.clone());
        values.insert("ACTIVE_CONDITIONS".to_string(), names.join(", "));
        values.insert("PRIMARY_CONDITION".to_string(), primary);

        let mut data = HashMap::new();
        data.insert("active_conditions".to_string(), serde_json::json!(names));
        data.insert(
            "severities".to_string(),
            serde_json::json!(active
                .iter()
                .map(|s| (s.name.clone(), s.severity))
                .collect::<HashMap<_, _>>()),
        );

        Ok(ProviderResult {
            text: Some(context),
            values: Some(values),
            data: Some(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> ConditionMap {
        let mut depression = ConditionState::new("depression", "Mood Disorders", 0.6, 19);
        depression.symptoms.insert("anhedonia".into(), 0.7);
        depression.symptoms.insert("fatigue".into(), 0.5);
        let ptsd = ConditionState::new("ptsd", "Trauma", 0.8, 9);
        let remitted = ConditionState::new("social_anxiety", "Anxiety", 0.2, 12);

        let mut map = ConditionMap::new();
        for s in [depression, ptsd, remitted] {
            map.insert(s.name.clone(), s);
        }
        map
    }

    #[tokio::test]
    async fn test_profile_from_state() {
        let mut state = State::new();
        state.set_data(CONDITION_MAP_KEY, serde_json::to_value(map()).unwrap());

        let result = SymptomProfileProvider::new()
            .get(Arc::new(()), &state)
            .await
            .unwrap();
        let values = result.values.unwrap();
        assert_eq!(values["PRIMARY_CONDITION"], "ptsd");
        assert_eq!(values["ACTIVE_CONDITIONS"], "ptsd, depression");
        let text = result.text.unwrap();
        assert!(text.contains("anhedonia 0.70"));
        assert!(!text.contains("social anxiety"));
    }

    #[tokio::test]
    async fn test_missing_state() {
        let result = SymptomProfileProvider::new()
            .get(Arc::new(()), &State::new())
            .await
            .unwrap();
        let values = result.values.unwrap();
        assert_eq!(values["PRIMARY_CONDITION"], "");
        assert_eq!(result.text.unwrap(), "No active psychological conditions.");
    }

    #[tokio::test]
    async fn test_malformed_state() {
        let mut state = State::new();
        state.set_data(CONDITION_MAP_KEY, serde_json::json!({"ptsd": "bad"}));
        let result = SymptomProfileProvider::new().get(Arc::new(()), &state).await;
        assert!(matches!(result, Err(PersonaError::Provider(_))));
    }
}
