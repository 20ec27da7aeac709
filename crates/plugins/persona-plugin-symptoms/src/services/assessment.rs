//! Assessment engine
//!
//! Turns a chronological experience history into a condition map. Every
//! function here is pure: same reference data and inputs, same output.

use crate::reference::ReferenceData;
use crate::types::*;
use persona_core::{PersonaError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Cumulative risk at which a condition is considered present
pub const DEFAULT_ACTIVATION_THRESHOLD: f32 = 0.3;

/// Largest distance between a symptom and its condition's overall severity
pub const SYMPTOM_OFFSET_SPAN: f32 = 0.15;

const RISK_EPSILON: f32 = 1e-6;

/// Variance strategy as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VarianceMode {
    /// Offset is a fixed function of the symptom index
    #[default]
    Indexed,
    /// Offsets drawn from a generator seeded by the subject id
    Seeded,
}

impl std::str::FromStr for VarianceMode {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "indexed" => Ok(VarianceMode::Indexed),
            "seeded" => Ok(VarianceMode::Seeded),
            other => Err(PersonaError::config(format!(
                "unknown symptom variance '{}' (expected indexed or seeded)",
                other
            ))),
        }
    }
}

/// Per-symptom variance around a condition's overall severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymptomVariance {
    /// Offset derived from the symptom's position in the definition
    #[default]
    Indexed,
    /// Offsets drawn from `StdRng` with this seed
    Seeded(u64),
}

impl SymptomVariance {
    /// Resolve a configured mode for a subject. Seeded mode without a
    /// subject falls back to indexed offsets.
    pub fn for_subject(mode: VarianceMode, subject: Option<Uuid>) -> Self {
        match (mode, subject) {
            (VarianceMode::Seeded, Some(id)) => SymptomVariance::Seeded(seed_from_subject(id)),
            _ => SymptomVariance::Indexed,
        }
    }

    /// Offsets for the symptoms of one condition, each within
    /// [-SYMPTOM_OFFSET_SPAN, SYMPTOM_OFFSET_SPAN]
    pub fn offsets(&self, condition: &str, count: usize) -> Vec<f32> {
        match self {
            SymptomVariance::Indexed => (0..count).map(indexed_offset).collect(),
            SymptomVariance::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(seed ^ name_salt(condition));
                (0..count)
                    .map(|_| rng.gen_range(-SYMPTOM_OFFSET_SPAN..=SYMPTOM_OFFSET_SPAN))
                    .collect()
            }
        }
    }
}

/// Fold a subject id into a generator seed
pub fn seed_from_subject(id: Uuid) -> u64 {
    let (hi, lo) = id.as_u64_pair();
    hi ^ lo.rotate_left(32)
}

fn indexed_offset(index: usize) -> f32 {
    // walks 11 evenly spaced steps across [-1, 1] in a scrambled order
    let step = ((index * 7 + 3) % 11) as f32;
    (step / 5.0 - 1.0) * SYMPTOM_OFFSET_SPAN
}

// FNV-1a, stable across builds
fn name_salt(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Knobs for a single assessment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentOptions {
    /// Cumulative risk needed to activate a condition
    pub activation_threshold: f32,
    /// Symptom variance strategy
    pub variance: SymptomVariance,
}

impl Default for AssessmentOptions {
    fn default() -> Self {
        Self {
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
            variance: SymptomVariance::Indexed,
        }
    }
}

#[derive(Debug, Default)]
struct RiskAccumulator {
    risk: f32,
    exposure: f32,
    onset_age: Option<u32>,
    contributing: Vec<Uuid>,
}

/// Assess a full experience history at `current_age`.
///
/// Experiences must be in non-decreasing age order and no later than
/// `current_age`. Categories without a risk mapping contribute nothing.
pub fn assess(
    data: &ReferenceData,
    history: &[ExperienceRecord],
    current_age: u32,
    options: &AssessmentOptions,
) -> Result<ConditionMap> {
    validate_options(options)?;
    validate_history(history, current_age)?;

    let mut accumulators: BTreeMap<&str, RiskAccumulator> = BTreeMap::new();

    for experience in history {
        let Some(risks) = data.risk_for(&experience.category) else {
            if data.is_neutral(&experience.category) {
                tracing::debug!(
                    category = %experience.category,
                    experience_id = %experience.id,
                    "Neutral experience category, no risk contribution"
                );
            } else {
                tracing::warn!(
                    category = %experience.category,
                    experience_id = %experience.id,
                    "Unknown experience category, no risk contribution"
                );
            }
            continue;
        };

        let intensity = data.intensity_multiplier(experience.intensity);
        for (condition, base_risk) in risks {
            let definition = data.condition(condition)?;
            let contribution =
                base_risk * data.age_multiplier(definition.class, experience.age) * intensity;
            if contribution <= 0.0 {
                continue;
            }

            let acc = accumulators.entry(condition.as_str()).or_default();
            acc.risk = (acc.risk + contribution).min(1.0);
            acc.exposure += contribution;
            acc.contributing.push(experience.id);

            if acc.onset_age.is_none() && acc.risk >= options.activation_threshold {
                acc.onset_age = Some(experience.age);
                tracing::debug!(
                    condition = %condition,
                    onset_age = experience.age,
                    risk = acc.risk,
                    "Condition activated"
                );
            }
        }
    }

    let mut map = ConditionMap::new();
    for (name, acc) in accumulators {
        let Some(onset_age) = acc.onset_age else {
            continue;
        };
        let definition = data.condition(name)?;
        let mut state = ConditionState::new(name, &definition.category, acc.risk, onset_age);
        state.symptoms = symptom_breakdown(definition, state.severity, &options.variance);
        state.contributing_experiences = acc.contributing;
        state.risk_exposure = acc.exposure;
        map.insert(name.to_string(), state);
    }

    Ok(map)
}

/// Per-symptom severities around an overall severity, rounded to two decimals
pub fn symptom_breakdown(
    definition: &ConditionDefinition,
    severity: f32,
    variance: &SymptomVariance,
) -> BTreeMap<String, f32> {
    let offsets = variance.offsets(&definition.name, definition.symptoms.len());
    definition
        .symptoms
        .iter()
        .zip(offsets)
        .map(|(symptom, offset)| (symptom.clone(), round2(clamp_unit(severity + offset))))
        .collect()
}

/// Result of reconciling a fresh assessment with a previous snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reassessment {
    /// Reconciled condition map
    pub conditions: ConditionMap,
    /// One entry per condition whose severity changed
    pub changes: Vec<SymptomHistoryEntry>,
}

/// Re-run the assessment and reconcile it with `previous`.
///
/// Severity moves only by experience risk that `previous` has not seen yet:
/// the fresh exposure minus the stored `risk_exposure`, added to the previous
/// severity and clamped. Severity lowered by an intervention therefore stays
/// lowered until new risk arrives. Conditions new to the snapshot enter at
/// their assessed severity; conditions absent now are carried over unchanged.
/// Each changed severity yields an `experience` history entry naming the
/// latest experience in `history`.
pub fn reassess(
    data: &ReferenceData,
    previous: &ConditionMap,
    history: &[ExperienceRecord],
    current_age: u32,
    options: &AssessmentOptions,
) -> Result<Reassessment> {
    let fresh = assess(data, history, current_age, options)?;
    let mut conditions = previous.clone();
    let mut changes = Vec::new();

    let Some(latest) = history.last() else {
        return Ok(Reassessment {
            conditions,
            changes,
        });
    };

    for (name, mut state) in fresh {
        let severity_before = match previous.get(&name) {
            Some(before) => {
                let added = state.risk_exposure - before.risk_exposure;
                if added <= RISK_EPSILON {
                    continue;
                }
                let definition = data.condition(&name)?;
                state.onset_age = state.onset_age.min(before.onset_age);
                state.set_severity(before.severity + added);
                state.symptoms = symptom_breakdown(definition, state.severity, &options.variance);
                before.severity
            }
            None => 0.0,
        };

        if (state.severity - severity_before).abs() > RISK_EPSILON {
            changes.push(SymptomHistoryEntry {
                condition: name.clone(),
                severity_before,
                severity_after: state.severity,
                age: latest.age,
                trigger: TriggerKind::Experience,
                trigger_id: latest.id,
            });
        }
        conditions.insert(name, state);
    }

    Ok(Reassessment {
        conditions,
        changes,
    })
}

fn validate_options(options: &AssessmentOptions) -> Result<()> {
    let t = options.activation_threshold;
    if !t.is_finite() || t <= 0.0 || t > 1.0 {
        return Err(PersonaError::invalid_input(format!(
            "activation threshold {} must be in (0, 1]",
            t
        )));
    }
    Ok(())
}

fn validate_history(history: &[ExperienceRecord], current_age: u32) -> Result<()> {
    let mut previous_age = 0;
    for experience in history {
        if experience.age > current_age {
            return Err(PersonaError::invalid_input(format!(
                "experience {} at age {} is after current age {}",
                experience.id, experience.age, current_age
            )));
        }
        if experience.age < previous_age {
            return Err(PersonaError::invalid_input(format!(
                "experience {} at age {} is out of order (previous age {})",
                experience.id, experience.age, previous_age
            )));
        }
        previous_age = experience.age;
    }
    Ok(())
}
