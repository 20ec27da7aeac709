//! Append-only symptom history

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What caused a severity change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// A new life experience was processed
    Experience,
    /// A therapeutic intervention was applied
    Intervention,
}

/// One severity change of one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomHistoryEntry {
    /// Condition name
    pub condition: String,

    /// Severity before the change
    pub severity_before: f32,

    /// Severity after the change
    pub severity_after: f32,

    /// Subject's age at the change
    pub age: u32,

    /// Kind of trigger
    pub trigger: TriggerKind,

    /// Identifier of the experience or intervention record
    pub trigger_id: Uuid,
}

impl SymptomHistoryEntry {
    /// Signed change in severity (negative means improvement)
    pub fn delta(&self) -> f32 {
        self.severity_after - self.severity_before
    }
}
