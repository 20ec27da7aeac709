//! Therapy catalog entries, intervention outcomes and recommendations

use super::condition::{clamp_unit, round2, ConditionState, ConditionStatus};
use super::history::SymptomHistoryEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A therapy modality from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyModality {
    /// Therapy code, e.g. "EMDR"
    pub code: String,

    /// Display name
    pub name: String,

    /// How the therapy works
    pub mechanism: String,

    /// Symptom targets the therapy is best suited for
    #[serde(default)]
    pub best_for: Vec<String>,

    /// Known limitations
    #[serde(default)]
    pub limitations: Vec<String>,

    /// Typical course length, free text
    #[serde(default)]
    pub typical_duration: String,

    /// Weeks after which the therapy reaches full effect; 0 until the
    /// loader fills in the tables' default
    #[serde(default)]
    pub reference_weeks: u32,
}

impl TherapyModality {
    /// Linear ramp from 0 to 1 that saturates at the reference duration
    pub fn duration_factor(&self, duration_weeks: u32) -> f32 {
        if self.reference_weeks == 0 {
            return 1.0;
        }
        (duration_weeks as f32 / self.reference_weeks as f32).min(1.0)
    }

    /// Compare a course length against the reference duration
    pub fn assess_duration(&self, duration_weeks: u32) -> DurationAssessment {
        if duration_weeks < self.reference_weeks {
            DurationAssessment::ShorterThanRecommended
        } else {
            DurationAssessment::Appropriate
        }
    }
}

/// Whether a course was long enough to reach full effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationAssessment {
    /// Stopped before the reference duration
    ShorterThanRecommended,
    /// At or beyond the reference duration
    Appropriate,
}

/// Caller context for an intervention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionContext {
    /// Subject's age when the intervention ended
    pub age: u32,

    /// Identifier of the intervention record
    pub intervention_id: Uuid,
}

impl InterventionContext {
    /// Context with a fresh intervention id
    pub fn at_age(age: u32) -> Self {
        Self {
            age,
            intervention_id: Uuid::new_v4(),
        }
    }
}

/// Result of applying an intervention to a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionOutcome {
    /// Condition name
    pub condition: String,

    /// Therapy code
    pub therapy_type: String,

    /// Severity removed by the intervention
    pub reduction: f32,

    /// Severity after the intervention
    pub new_severity: f32,

    /// Status after the intervention
    pub new_status: ConditionStatus,

    /// Course length against the therapy's reference duration
    pub duration_assessment: DurationAssessment,

    /// History record for the caller to persist
    pub history_entry: SymptomHistoryEntry,
}

impl InterventionOutcome {
    /// Build the updated state without touching the input.
    ///
    /// Symptom values are scaled by the same ratio as overall severity.
    pub fn apply_to(&self, state: &ConditionState) -> ConditionState {
        let mut updated = state.clone();
        if state.severity > 0.0 {
            let ratio = self.new_severity / state.severity;
            for value in updated.symptoms.values_mut() {
                *value = round2(clamp_unit(*value * ratio));
            }
        }
        updated.set_severity(self.new_severity);
        updated
    }
}

/// One ranked therapy option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyRecommendation {
    /// Therapy code
    pub therapy_type: String,

    /// Therapy display name
    pub therapy_name: String,

    /// Reduction expected at reference duration and adherence
    pub expected_reduction: f32,

    /// Expected reduction capped at the current severity
    pub achievable_reduction: f32,

    /// Whether the therapy suits the subject's developmental stage
    pub age_appropriate: bool,
}

/// Ranked therapy options for one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    /// Condition name
    pub condition: String,

    /// Severity the ranking was computed for
    pub severity: f32,

    /// Subject's age
    pub age: u32,

    /// Developmental stage name for the age
    pub stage: String,

    /// Options, best first
    pub recommendations: Vec<TherapyRecommendation>,

    /// Known comorbidities, unranked
    pub comorbidities: Vec<String>,
}

impl RecommendationSet {
    /// Best age-appropriate option, if any
    pub fn best_age_appropriate(&self) -> Option<&TherapyRecommendation> {
        self.recommendations.iter().find(|r| r.age_appropriate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TriggerKind;

    fn modality(reference_weeks: u32) -> TherapyModality {
        TherapyModality {
            code: "CBT".into(),
            name: "Cognitive Behavioral Therapy".into(),
            mechanism: "restructuring".into(),
            best_for: vec!["depression".into()],
            limitations: vec![],
            typical_duration: "12-20 sessions".into(),
            reference_weeks,
        }
    }

    #[test]
    fn test_duration_factor_saturates() {
        let cbt = modality(24);
        assert_eq!(cbt.duration_factor(0), 0.0);
        assert_eq!(cbt.duration_factor(12), 0.5);
        assert_eq!(cbt.duration_factor(24), 1.0);
        assert_eq!(cbt.duration_factor(52), 1.0);
        assert_eq!(modality(0).duration_factor(1), 1.0);
    }

    #[test]
    fn test_assess_duration() {
        let cbt = modality(24);
        assert_eq!(cbt.assess_duration(8), DurationAssessment::ShorterThanRecommended);
        assert_eq!(cbt.assess_duration(24), DurationAssessment::Appropriate);
    }

    #[test]
    fn test_apply_to_scales_symptoms() {
        let mut state = ConditionState::new("depression", "Mood Disorders", 0.8, 25);
        state.symptoms.insert("fatigue".into(), 0.8);
        state.symptoms.insert("anhedonia".into(), 0.6);

        let outcome = InterventionOutcome {
            condition: "depression".into(),
            therapy_type: "CBT".into(),
            reduction: 0.4,
            new_severity: 0.4,
            new_status: ConditionStatus::Active,
            duration_assessment: DurationAssessment::Appropriate,
            history_entry: SymptomHistoryEntry {
                condition: "depression".into(),
                severity_before: 0.8,
                severity_after: 0.4,
                age: 30,
                trigger: TriggerKind::Intervention,
                trigger_id: Uuid::nil(),
            },
        };

        let updated = outcome.apply_to(&state);
        assert_eq!(updated.severity, 0.4);
        assert_eq!(updated.symptoms["fatigue"], 0.4);
        assert_eq!(updated.symptoms["anhedonia"], 0.3);
        // input untouched
        assert_eq!(state.severity, 0.8);
    }
}
