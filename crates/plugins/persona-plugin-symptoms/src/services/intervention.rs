//! Intervention effectiveness calculator

use crate::reference::ReferenceData;
use crate::types::*;
use persona_core::{PersonaError, Result};
use std::collections::BTreeSet;

/// Compute the effect of a therapy course on one condition.
///
/// `reduction = base_efficacy × min(1, weeks / reference_weeks) × adherence`,
/// rounded to two decimals. The input state is not modified; use
/// [`InterventionOutcome::apply_to`] to build the updated state.
pub fn apply_intervention(
    data: &ReferenceData,
    state: &ConditionState,
    therapy_type: &str,
    duration_weeks: u32,
    adherence: f32,
    context: InterventionContext,
) -> Result<InterventionOutcome> {
    if duration_weeks == 0 {
        return Err(PersonaError::invalid_input(
            "intervention duration must be at least one week",
        ));
    }
    if !adherence.is_finite() || !(0.0..=1.0).contains(&adherence) {
        return Err(PersonaError::invalid_input(format!(
            "adherence {} must be within [0, 1]",
            adherence
        )));
    }

    let therapy = data
        .therapy(therapy_type)
        .ok_or_else(|| PersonaError::unknown_therapy(&state.name, therapy_type))?;
    let base_efficacy = data
        .efficacy(&state.name, therapy_type)
        .ok_or_else(|| PersonaError::unknown_therapy(&state.name, therapy_type))?;

    let reduction = course_reduction(base_efficacy, therapy, duration_weeks, adherence);
    let new_severity = clamp_unit(state.severity - reduction);
    let new_status = ConditionStatus::from_severity(new_severity);

    tracing::debug!(
        condition = %state.name,
        therapy = %therapy_type,
        duration_weeks,
        adherence,
        reduction,
        new_severity,
        "Intervention applied"
    );

    Ok(InterventionOutcome {
        condition: state.name.clone(),
        therapy_type: therapy_type.to_string(),
        reduction,
        new_severity,
        new_status,
        duration_assessment: therapy.assess_duration(duration_weeks),
        history_entry: SymptomHistoryEntry {
            condition: state.name.clone(),
            severity_before: state.severity,
            severity_after: new_severity,
            age: context.age,
            trigger: TriggerKind::Intervention,
            trigger_id: context.intervention_id,
        },
    })
}

/// `base_efficacy × duration_factor(weeks) × adherence`, rounded to two decimals
pub(crate) fn course_reduction(
    base_efficacy: f32,
    therapy: &TherapyModality,
    duration_weeks: u32,
    adherence: f32,
) -> f32 {
    round2(base_efficacy * therapy.duration_factor(duration_weeks) * adherence)
}

/// How well a therapy's best-for targets cover a list of symptom targets.
///
/// 0.0 when nothing matches; otherwise the match ratio plus a bonus
/// (+0.2 at ≥ 75%, +0.25 at ≥ 50%, +0.3 below), capped at 1.0.
pub fn therapy_match_score<S: AsRef<str>>(therapy: &TherapyModality, targets: &[S]) -> f32 {
    if targets.is_empty() {
        return 0.0;
    }
    let matches = targets
        .iter()
        .filter(|target| {
            let target = target.as_ref().to_lowercase();
            therapy.best_for.iter().any(|b| b.to_lowercase() == target)
        })
        .count();
    if matches == 0 {
        return 0.0;
    }

    let ratio = matches as f32 / targets.len() as f32;
    let bonus = if ratio >= 0.75 {
        0.2
    } else if ratio >= 0.5 {
        0.25
    } else {
        0.3
    };
    (ratio + bonus).min(1.0)
}

/// Catalog codes whose best-for list includes `target`
pub fn therapies_for_target<'a>(data: &'a ReferenceData, target: &str) -> Vec<&'a str> {
    let target = target.to_lowercase();
    data.therapies()
        .iter()
        .filter(|t| t.best_for.iter().any(|b| b.to_lowercase() == target))
        .map(|t| t.code.as_str())
        .collect()
}

/// Every best-for target in the catalog, sorted
pub fn treatable_targets(data: &ReferenceData) -> Vec<&str> {
    data.therapies()
        .iter()
        .flat_map(|t| t.best_for.iter().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
