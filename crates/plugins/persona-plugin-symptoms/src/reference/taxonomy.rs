//! Disorder taxonomy

use crate::types::ConditionDefinition;
use persona_core::{PersonaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// On-disk shape of `taxonomy.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDocument {
    /// Data version
    pub version: String,
    /// Condition definitions
    pub conditions: Vec<ConditionDefinition>,
}

/// Condition definitions keyed by name
#[derive(Debug, Clone)]
pub struct Taxonomy {
    version: String,
    conditions: BTreeMap<String, ConditionDefinition>,
}

impl Taxonomy {
    /// Build from a parsed document; duplicate names are rejected
    pub fn from_document(doc: TaxonomyDocument) -> Result<Self> {
        let mut conditions = BTreeMap::new();
        for def in doc.conditions {
            if def.symptoms.is_empty() {
                return Err(PersonaError::config(format!(
                    "condition '{}' has no symptoms",
                    def.name
                )));
            }
            let name = def.name.clone();
            if conditions.insert(name.clone(), def).is_some() {
                return Err(PersonaError::config(format!(
                    "duplicate condition '{}' in taxonomy",
                    name
                )));
            }
        }
        Ok(Self {
            version: doc.version,
            conditions,
        })
    }

    /// Data version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the taxonomy is empty
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether `name` is a known condition
    pub fn contains(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    /// Look up a condition by name
    pub fn condition(&self, name: &str) -> Result<&ConditionDefinition> {
        self.conditions
            .get(name)
            .ok_or_else(|| PersonaError::not_found(format!("condition '{}'", name)))
    }

    /// All conditions in a category, in name order
    pub fn conditions_in_category(&self, category: &str) -> Result<Vec<&ConditionDefinition>> {
        let members: Vec<&ConditionDefinition> = self
            .conditions
            .values()
            .filter(|def| def.category == category)
            .collect();
        if members.is_empty() {
            return Err(PersonaError::not_found(format!("category '{}'", category)));
        }
        Ok(members)
    }

    /// Distinct category labels, sorted
    pub fn categories(&self) -> Vec<&str> {
        self.conditions
            .values()
            .map(|def| def.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Condition names, sorted
    pub fn condition_names(&self) -> Vec<&str> {
        self.conditions.keys().map(String::as_str).collect()
    }

    /// Ordered symptom list of a condition
    pub fn symptoms_of(&self, name: &str) -> Result<&[String]> {
        Ok(&self.condition(name)?.symptoms)
    }

    /// Iterate over all definitions in name order
    pub fn iter(&self) -> impl Iterator<Item = &ConditionDefinition> {
        self.conditions.values()
    }
}
