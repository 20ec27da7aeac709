//! Backstory baseline mapper
//!
//! Seeds starting conditions from free-text backstory before any experience
//! records exist.

use super::assessment::{symptom_breakdown, SymptomVariance};
use crate::reference::ReferenceData;
use crate::types::*;
use ordered_float::OrderedFloat;
use persona_core::Result;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Baseline condition states implied by `text` at `baseline_age`.
///
/// Keyword rules match case-insensitively on word boundaries. When several
/// rules seed the same condition the highest severity wins. Results are
/// ordered by severity, strongest first.
pub fn baseline_from_backstory(
    data: &ReferenceData,
    text: &str,
    baseline_age: u32,
    variance: &SymptomVariance,
) -> Result<Vec<ConditionState>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut seeds: BTreeMap<&str, f32> = BTreeMap::new();
    for matcher in data.backstory_matchers() {
        if !matcher.is_match(text) {
            continue;
        }
        tracing::debug!(rule = %matcher.rule.name, "Backstory rule matched");
        for seed in &matcher.rule.seeds {
            if seed.max_baseline_age.is_some_and(|max| baseline_age > max) {
                continue;
            }
            let entry = seeds.entry(seed.condition.as_str()).or_insert(0.0);
            *entry = entry.max(seed.severity);
        }
    }

    let mut states = Vec::with_capacity(seeds.len());
    for (name, severity) in seeds {
        let definition = data.condition(name)?;
        let mut state = ConditionState::new(name, &definition.category, severity, baseline_age);
        state.symptoms = symptom_breakdown(definition, state.severity, variance);
        states.push(state);
    }
    states.sort_by_key(|s| (Reverse(OrderedFloat(s.severity)), s.name.clone()));

    Ok(states)
}
