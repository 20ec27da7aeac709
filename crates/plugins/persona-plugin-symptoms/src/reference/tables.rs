//! Static multiplier, risk, efficacy and stage tables

use crate::types::{ConditionClass, DevelopmentalStage, Intensity, TherapyModality};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Age vulnerability rule for one condition class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeRule {
    /// Condition class the rule applies to
    pub class: ConditionClass,

    /// Youngest age covered (inclusive)
    #[serde(default)]
    pub min_age: Option<u32>,

    /// Oldest age covered (inclusive)
    #[serde(default)]
    pub max_age: Option<u32>,

    /// Multiplier applied to base risk
    pub multiplier: f32,
}

impl AgeRule {
    /// Whether the rule covers `class` at `age`
    pub fn applies(&self, class: ConditionClass, age: u32) -> bool {
        self.class == class
            && self.min_age.map_or(true, |min| age >= min)
            && self.max_age.map_or(true, |max| age <= max)
    }
}

/// Condition seeded by a backstory keyword rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackstorySeed {
    /// Condition name
    pub condition: String,

    /// Baseline severity
    pub severity: f32,

    /// Only seeded when the baseline age is at most this
    #[serde(default)]
    pub max_baseline_age: Option<u32>,
}

/// Keyword rule matched against backstory text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackstoryRule {
    /// Rule name, e.g. "neglect"
    pub name: String,

    /// Keywords or phrases, matched on word boundaries
    pub keywords: Vec<String>,

    /// Conditions the rule seeds
    pub seeds: Vec<BackstorySeed>,
}

/// On-disk shape of `tables.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticTables {
    /// Data version
    pub version: String,

    /// Intensity label -> multiplier
    pub intensity_multipliers: BTreeMap<String, f32>,

    /// Age vulnerability rules; the first matching rule wins
    pub age_rules: Vec<AgeRule>,

    /// Experience category -> condition -> base risk
    pub experience_risk: BTreeMap<String, BTreeMap<String, f32>>,

    /// Known categories that carry no risk
    #[serde(default)]
    pub neutral_categories: Vec<String>,

    /// Reference duration for catalog entries that do not name one
    #[serde(default = "default_reference_weeks")]
    pub default_reference_weeks: u32,

    /// Therapy catalog
    pub therapies: Vec<TherapyModality>,

    /// Condition -> therapy code -> base efficacy
    pub efficacy: BTreeMap<String, BTreeMap<String, f32>>,

    /// Developmental stages, youngest first
    pub stages: Vec<DevelopmentalStage>,

    /// Backstory keyword rules
    #[serde(default)]
    pub backstory_rules: Vec<BackstoryRule>,
}

fn default_reference_weeks() -> u32 {
    24
}

impl StaticTables {
    /// Multiplier for an intensity label
    pub fn intensity_multiplier(&self, intensity: Intensity) -> f32 {
        self.intensity_multipliers
            .get(intensity.as_str())
            .copied()
            .unwrap_or(1.0)
    }

    /// Multiplier for a condition class at an age; 1.0 when no rule applies
    pub fn age_multiplier(&self, class: ConditionClass, age: u32) -> f32 {
        self.age_rules
            .iter()
            .find(|rule| rule.applies(class, age))
            .map_or(1.0, |rule| rule.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<AgeRule> {
        vec![
            AgeRule {
                class: ConditionClass::Attachment,
                min_age: None,
                max_age: Some(5),
                multiplier: 2.0,
            },
            AgeRule {
                class: ConditionClass::Substance,
                min_age: Some(13),
                max_age: Some(25),
                multiplier: 1.4,
            },
        ]
    }

    fn tables() -> StaticTables {
        StaticTables {
            version: "test".into(),
            intensity_multipliers: [("mild", 0.3), ("moderate", 0.6), ("severe", 0.9), ("extreme", 1.0)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            age_rules: rules(),
            experience_risk: BTreeMap::new(),
            neutral_categories: vec![],
            default_reference_weeks: 24,
            therapies: vec![],
            efficacy: BTreeMap::new(),
            stages: vec![],
            backstory_rules: vec![],
        }
    }

    #[test]
    fn test_age_multiplier() {
        let t = tables();
        assert_eq!(t.age_multiplier(ConditionClass::Attachment, 5), 2.0);
        assert_eq!(t.age_multiplier(ConditionClass::Attachment, 6), 1.0);
        assert_eq!(t.age_multiplier(ConditionClass::Substance, 12), 1.0);
        assert_eq!(t.age_multiplier(ConditionClass::Substance, 13), 1.4);
        assert_eq!(t.age_multiplier(ConditionClass::Substance, 25), 1.4);
        assert_eq!(t.age_multiplier(ConditionClass::General, 2), 1.0);
    }

    #[test]
    fn test_intensity_multiplier() {
        let t = tables();
        assert_eq!(t.intensity_multiplier(Intensity::Mild), 0.3);
        assert_eq!(t.intensity_multiplier(Intensity::Extreme), 1.0);
    }
}
