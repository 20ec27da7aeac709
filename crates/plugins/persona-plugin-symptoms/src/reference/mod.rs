//! Reference data
//!
//! The taxonomy and the static tables are loaded once, validated against each
//! other and then shared read-only. A bad cross reference is a load-time
//! `Config` error.

mod tables;
mod taxonomy;

pub use tables::*;
pub use taxonomy::*;

use crate::types::{
    ConditionClass, ConditionDefinition, DevelopmentalStage, ImpactContext, Intensity,
    TherapyModality,
};
use once_cell::sync::OnceCell;
use persona_core::{PersonaError, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const BUILTIN_TAXONOMY: &str = include_str!("../../data/taxonomy.json");
const BUILTIN_TABLES: &str = include_str!("../../data/tables.json");

static BUILTIN: OnceCell<ReferenceData> = OnceCell::new();

/// Backstory rule with its compiled keyword pattern
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    /// Source rule
    pub rule: BackstoryRule,
    pattern: Regex,
}

impl KeywordMatcher {
    fn compile(rule: BackstoryRule) -> Result<Self> {
        if rule.keywords.is_empty() {
            return Err(PersonaError::config(format!(
                "backstory rule '{}' has no keywords",
                rule.name
            )));
        }
        let alternation = rule
            .keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).map_err(|e| {
            PersonaError::config(format!("backstory rule '{}': {}", rule.name, e))
        })?;
        Ok(Self { rule, pattern })
    }

    /// Whether any keyword occurs in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Validated taxonomy plus static tables
#[derive(Debug, Clone)]
pub struct ReferenceData {
    taxonomy: Taxonomy,
    tables: StaticTables,
    therapy_index: HashMap<String, usize>,
    matchers: Vec<KeywordMatcher>,
}

impl ReferenceData {
    /// Built-in data, parsed on first use and shared for the process lifetime
    pub fn builtin() -> Result<&'static ReferenceData> {
        BUILTIN.get_or_try_init(|| Self::from_json(BUILTIN_TAXONOMY, BUILTIN_TABLES))
    }

    /// Parse and validate a taxonomy document and a tables document
    pub fn from_json(taxonomy: &str, tables: &str) -> Result<Self> {
        let taxonomy: TaxonomyDocument = serde_json::from_str(taxonomy)?;
        let tables: StaticTables = serde_json::from_str(tables)?;
        Self::new(Taxonomy::from_document(taxonomy)?, tables)
    }

    /// Load `taxonomy.json` and `tables.json` from a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let taxonomy = std::fs::read_to_string(dir.join("taxonomy.json"))?;
        let tables = std::fs::read_to_string(dir.join("tables.json"))?;
        tracing::debug!(path = %dir.display(), "Loading reference data from directory");
        Self::from_json(&taxonomy, &tables)
    }

    /// Validate and index already-parsed data
    pub fn new(taxonomy: Taxonomy, mut tables: StaticTables) -> Result<Self> {
        if tables.default_reference_weeks == 0 {
            return Err(PersonaError::config("default reference duration must be positive"));
        }
        let mut therapy_index = HashMap::new();
        for (i, therapy) in tables.therapies.iter_mut().enumerate() {
            if therapy.reference_weeks == 0 {
                therapy.reference_weeks = tables.default_reference_weeks;
            }
            if therapy_index.insert(therapy.code.clone(), i).is_some() {
                return Err(PersonaError::config(format!(
                    "duplicate therapy code '{}'",
                    therapy.code
                )));
            }
        }

        validate_tables(&taxonomy, &tables, &therapy_index)?;

        let matchers = tables
            .backstory_rules
            .iter()
            .cloned()
            .map(KeywordMatcher::compile)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            taxonomy_version = %taxonomy.version(),
            tables_version = %tables.version,
            conditions = taxonomy.len(),
            therapies = tables.therapies.len(),
            "Reference data loaded"
        );

        Ok(Self {
            taxonomy,
            tables,
            therapy_index,
            matchers,
        })
    }

    /// The taxonomy
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// The raw tables
    pub fn tables(&self) -> &StaticTables {
        &self.tables
    }

    /// Look up a condition by name
    pub fn condition(&self, name: &str) -> Result<&ConditionDefinition> {
        self.taxonomy.condition(name)
    }

    /// All conditions in a category
    pub fn conditions_in_category(&self, category: &str) -> Result<Vec<&ConditionDefinition>> {
        self.taxonomy.conditions_in_category(category)
    }

    /// Distinct category labels
    pub fn categories(&self) -> Vec<&str> {
        self.taxonomy.categories()
    }

    /// Condition names
    pub fn condition_names(&self) -> Vec<&str> {
        self.taxonomy.condition_names()
    }

    /// Ordered symptoms of a condition
    pub fn symptoms_of(&self, name: &str) -> Result<&[String]> {
        self.taxonomy.symptoms_of(name)
    }

    /// Condition -> base risk for an experience category
    pub fn risk_for(&self, category: &str) -> Option<&BTreeMap<String, f32>> {
        self.tables.experience_risk.get(category)
    }

    /// Whether the category is known to carry no risk
    pub fn is_neutral(&self, category: &str) -> bool {
        self.tables.neutral_categories.iter().any(|c| c == category)
    }

    /// Intensity multiplier
    pub fn intensity_multiplier(&self, intensity: Intensity) -> f32 {
        self.tables.intensity_multiplier(intensity)
    }

    /// Age multiplier for a condition class
    pub fn age_multiplier(&self, class: ConditionClass, age: u32) -> f32 {
        self.tables.age_multiplier(class, age)
    }

    /// Therapy catalog entry
    pub fn therapy(&self, code: &str) -> Option<&TherapyModality> {
        self.therapy_index
            .get(code)
            .and_then(|&i| self.tables.therapies.get(i))
    }

    /// Full therapy catalog
    pub fn therapies(&self) -> &[TherapyModality] {
        &self.tables.therapies
    }

    /// Base efficacy of a therapy for a condition
    pub fn efficacy(&self, condition: &str, therapy: &str) -> Option<f32> {
        self.tables
            .efficacy
            .get(condition)
            .and_then(|row| row.get(therapy))
            .copied()
    }

    /// All efficacy entries for a condition
    pub fn efficacy_for(&self, condition: &str) -> Option<&BTreeMap<String, f32>> {
        self.tables.efficacy.get(condition)
    }

    /// Developmental stage covering `age`
    pub fn stage_for(&self, age: u32) -> Result<&DevelopmentalStage> {
        self.tables
            .stages
            .iter()
            .find(|stage| stage.contains(age))
            .ok_or_else(|| PersonaError::config(format!("no developmental stage covers age {}", age)))
    }

    /// Impact context for an age
    pub fn impact_context(&self, age: u32) -> Result<ImpactContext> {
        Ok(ImpactContext::from((self.stage_for(age)?, age)))
    }

    /// Compiled backstory rules
    pub fn backstory_matchers(&self) -> &[KeywordMatcher] {
        &self.matchers
    }
}

fn unit_range(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn validate_tables(
    taxonomy: &Taxonomy,
    tables: &StaticTables,
    therapy_index: &HashMap<String, usize>,
) -> Result<()> {
    let known = |name: &str, context: &str| -> Result<()> {
        if taxonomy.contains(name) {
            Ok(())
        } else {
            Err(PersonaError::config(format!(
                "{} references unknown condition '{}'",
                context, name
            )))
        }
    };
    let known_therapy = |code: &str, context: &str| -> Result<()> {
        if therapy_index.contains_key(code) {
            Ok(())
        } else {
            Err(PersonaError::config(format!(
                "{} references unknown therapy '{}'",
                context, code
            )))
        }
    };

    for def in taxonomy.iter() {
        for other in &def.comorbidities {
            known(other, &format!("comorbidities of '{}'", def.name))?;
        }
    }

    for intensity in Intensity::ALL {
        match tables.intensity_multipliers.get(intensity.as_str()) {
            Some(m) if m.is_finite() && *m >= 0.0 => {}
            _ => {
                return Err(PersonaError::config(format!(
                    "missing or invalid intensity multiplier '{}'",
                    intensity.as_str()
                )))
            }
        }
    }

    for rule in &tables.age_rules {
        if !rule.multiplier.is_finite() || rule.multiplier <= 0.0 {
            return Err(PersonaError::config(format!(
                "age rule for {:?} has invalid multiplier {}",
                rule.class, rule.multiplier
            )));
        }
    }

    for (category, risks) in &tables.experience_risk {
        for (condition, risk) in risks {
            known(condition, &format!("experience category '{}'", category))?;
            if !unit_range(*risk) {
                return Err(PersonaError::config(format!(
                    "base risk {} for '{}' in '{}' is outside [0, 1]",
                    risk, condition, category
                )));
            }
        }
    }

    for (condition, row) in &tables.efficacy {
        known(condition, "efficacy table")?;
        for (therapy, efficacy) in row {
            known_therapy(therapy, &format!("efficacy row '{}'", condition))?;
            if !unit_range(*efficacy) {
                return Err(PersonaError::config(format!(
                    "efficacy {} for '{}'/'{}' is outside [0, 1]",
                    efficacy, condition, therapy
                )));
            }
        }
    }

    let Some(first) = tables.stages.first() else {
        return Err(PersonaError::config("no developmental stages defined"));
    };
    if first.min_age != 0 {
        return Err(PersonaError::config("developmental stages must start at age 0"));
    }
    for pair in tables.stages.windows(2) {
        match pair[0].max_age {
            Some(max) if pair[1].min_age == max + 1 => {}
            _ => {
                return Err(PersonaError::config(format!(
                    "developmental stages '{}' and '{}' are not contiguous",
                    pair[0].name, pair[1].name
                )))
            }
        }
    }
    for stage in &tables.stages {
        for therapy in &stage.age_appropriate_therapies {
            known_therapy(therapy, &format!("stage '{}'", stage.name))?;
        }
    }

    for rule in &tables.backstory_rules {
        for seed in &rule.seeds {
            known(&seed.condition, &format!("backstory rule '{}'", rule.name))?;
            if !unit_range(seed.severity) {
                return Err(PersonaError::config(format!(
                    "backstory rule '{}' seeds '{}' outside [0, 1]",
                    rule.name, seed.condition
                )));
            }
        }
    }

    Ok(())
}
