//! Condition definitions and derived condition state

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Vulnerability class of a condition, used by the age multiplier rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionClass {
    /// Attachment-related (e.g. reactive attachment disorder)
    Attachment,
    /// Complex trauma
    ComplexTrauma,
    /// Personality patterns
    Personality,
    /// Substance use
    Substance,
    /// Everything else
    #[default]
    General,
}

/// Immutable taxonomy entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Lookup key, e.g. "ptsd"
    pub name: String,

    /// Display name
    pub full_name: String,

    /// Category label, e.g. "Trauma and Stressor-Related Disorders"
    pub category: String,

    /// Diagnostic code
    pub code: String,

    /// Vulnerability class
    #[serde(default)]
    pub class: ConditionClass,

    /// Ordered symptom names
    pub symptoms: Vec<String>,

    /// Severity band labels
    #[serde(default)]
    pub severity_levels: Option<Vec<String>>,

    /// Subtypes
    #[serde(default)]
    pub subtypes: Option<Vec<String>>,

    /// Commonly comorbid condition names
    #[serde(default)]
    pub comorbidities: Vec<String>,
}

/// Lifecycle status derived from severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    /// Severity at or above 0.30
    Active,
    /// Severity in [0.10, 0.30)
    InRemission,
    /// Severity below 0.10
    Resolved,
}

impl ConditionStatus {
    /// Severities below this are resolved
    pub const RESOLVED_BELOW: f32 = 0.10;

    /// Severities below this (and not resolved) are in remission
    pub const REMISSION_BELOW: f32 = 0.30;

    /// Derive the status for a severity
    pub fn from_severity(severity: f32) -> Self {
        if severity < Self::RESOLVED_BELOW {
            ConditionStatus::Resolved
        } else if severity < Self::REMISSION_BELOW {
            ConditionStatus::InRemission
        } else {
            ConditionStatus::Active
        }
    }

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::Active => "active",
            ConditionStatus::InRemission => "in_remission",
            ConditionStatus::Resolved => "resolved",
        }
    }
}

/// Current state of one condition for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionState {
    /// Condition name (taxonomy key)
    pub name: String,

    /// Taxonomy category label
    pub category: String,

    /// Severity in [0, 1]
    pub severity: f32,

    /// Age at the experience that first activated the condition
    pub onset_age: u32,

    /// Status derived from severity
    pub status: ConditionStatus,

    /// Symptom name -> severity in [0, 1]
    pub symptoms: BTreeMap<String, f32>,

    /// Experiences that contributed risk, in processing order
    #[serde(default)]
    pub contributing_experiences: Vec<Uuid>,

    /// Unclamped experience risk already reflected in `severity`
    #[serde(default)]
    pub risk_exposure: f32,
}

impl ConditionState {
    /// Create a state at the given severity; status follows severity
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        severity: f32,
        onset_age: u32,
    ) -> Self {
        let severity = clamp_unit(severity);
        Self {
            name: name.into(),
            category: category.into(),
            severity,
            onset_age,
            status: ConditionStatus::from_severity(severity),
            symptoms: BTreeMap::new(),
            contributing_experiences: Vec::new(),
            risk_exposure: 0.0,
        }
    }

    /// Update severity (clamped) and re-derive status
    pub fn set_severity(&mut self, severity: f32) {
        self.severity = clamp_unit(severity);
        self.status = ConditionStatus::from_severity(self.severity);
    }

    /// Whether the condition currently manifests
    pub fn is_active(&self) -> bool {
        self.status == ConditionStatus::Active
    }

    /// Symptoms sorted by severity, strongest first
    pub fn top_symptoms(&self, limit: usize) -> Vec<(&str, f32)> {
        let mut symptoms: Vec<(&str, f32)> = self
            .symptoms
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        symptoms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        symptoms.truncate(limit);
        symptoms
    }
}

/// All conditions ever triggered for a subject, keyed by condition name
pub type ConditionMap = BTreeMap<String, ConditionState>;

/// Clamp to [0, 1]; NaN collapses to 0
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Round to two decimals
pub(crate) fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
