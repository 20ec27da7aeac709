//! Recommendation generator

use super::intervention::course_reduction;
use crate::reference::ReferenceData;
use crate::types::*;
use ordered_float::OrderedFloat;
use persona_core::{PersonaError, Result};
use std::cmp::Reverse;

/// Adherence assumed when ranking therapies
pub const DEFAULT_REFERENCE_ADHERENCE: f32 = 1.0;

/// Rank every therapy with efficacy data for `condition`.
///
/// Expected reduction is what [`apply_intervention`](super::apply_intervention)
/// reports for a course of the therapy's reference length at
/// `reference_adherence`; the achievable reduction caps it at `severity`.
/// Therapies that do not suit the developmental stage of `age` stay in the
/// list, flagged.
pub fn recommend(
    data: &ReferenceData,
    condition: &str,
    severity: f32,
    age: u32,
    reference_adherence: f32,
) -> Result<RecommendationSet> {
    if !severity.is_finite() || !(0.0..=1.0).contains(&severity) {
        return Err(PersonaError::invalid_input(format!(
            "severity {} must be within [0, 1]",
            severity
        )));
    }
    if !reference_adherence.is_finite() || !(0.0..=1.0).contains(&reference_adherence) {
        return Err(PersonaError::invalid_input(format!(
            "reference adherence {} must be within [0, 1]",
            reference_adherence
        )));
    }

    let definition = data.condition(condition)?;
    let stage = data.stage_for(age)?;

    let mut recommendations: Vec<TherapyRecommendation> = data
        .efficacy_for(condition)
        .into_iter()
        .flatten()
        .filter_map(|(code, efficacy)| {
            let therapy = data.therapy(code)?;
            let expected_reduction =
                course_reduction(*efficacy, therapy, therapy.reference_weeks, reference_adherence);
            Some(TherapyRecommendation {
                therapy_type: code.clone(),
                therapy_name: therapy.name.clone(),
                expected_reduction,
                achievable_reduction: round2(expected_reduction.min(severity)),
                age_appropriate: stage.is_age_appropriate(code),
            })
        })
        .collect();

    recommendations.sort_by_key(|r| {
        (
            Reverse(OrderedFloat(r.expected_reduction)),
            r.therapy_type.clone(),
        )
    });

    tracing::debug!(
        condition = %condition,
        age,
        stage = %stage.name,
        options = recommendations.len(),
        "Ranked therapy options"
    );

    Ok(RecommendationSet {
        condition: definition.name.clone(),
        severity,
        age,
        stage: stage.name.clone(),
        recommendations,
        comorbidities: definition.comorbidities.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn data() -> &'static ReferenceData {
        ReferenceData::builtin().unwrap()
    }

    #[test]
    fn test_depression_ranking() {
        let set = recommend(data(), "depression", 0.72, 28, 1.0).unwrap();
        assert!(!set.recommendations.is_empty());
        assert_eq!(set.stage, "adult");
        assert_eq!(set.recommendations[0].therapy_type, "combination");
        assert!((set.recommendations[0].expected_reduction - 0.7).abs() < 1e-6);

        let unique: HashSet<_> = set.recommendations.iter().map(|r| &r.therapy_type).collect();
        assert_eq!(unique.len(), set.recommendations.len());
        assert!(set
            .recommendations
            .windows(2)
            .all(|w| w[0].expected_reduction >= w[1].expected_reduction));
        assert!(set.comorbidities.contains(&"generalized_anxiety".to_string()));
    }

    #[test]
    fn test_low_severity_keeps_efficacy_order() {
        let set = recommend(data(), "depression", 0.3, 40, 1.0).unwrap();
        let top = &set.recommendations[0];
        assert_eq!(top.therapy_type, "combination");
        assert!((top.expected_reduction - 0.7).abs() < 1e-6);
        assert!(set
            .recommendations
            .iter()
            .all(|r| r.achievable_reduction <= 0.3 && r.achievable_reduction <= r.expected_reduction));
    }

    #[test]
    fn test_ties_break_by_name() {
        // ACT and IFS both carry 0.4 for depression
        let set = recommend(data(), "depression", 0.9, 40, 1.0).unwrap();
        let tied: Vec<&str> = set
            .recommendations
            .iter()
            .filter(|r| (r.expected_reduction - 0.4).abs() < 1e-6)
            .map(|r| r.therapy_type.as_str())
            .collect();
        assert_eq!(tied, vec!["ACT", "IFS"]);
    }

    #[test]
    fn test_matches_intervention_reduction() {
        let adherence = 0.8;
        let set = recommend(data(), "ptsd", 0.9, 30, adherence).unwrap();
        let state = ConditionState::new("ptsd", "Trauma", 0.9, 12);
        for r in &set.recommendations {
            let weeks = data().therapy(&r.therapy_type).unwrap().reference_weeks;
            let outcome = super::super::apply_intervention(
                data(),
                &state,
                &r.therapy_type,
                weeks,
                adherence,
                InterventionContext::at_age(30),
            )
            .unwrap();
            assert_eq!(r.expected_reduction, outcome.reduction, "{}", r.therapy_type);
        }
    }

    #[test]
    fn test_child_flags() {
        let set = recommend(data(), "reactive_attachment_disorder", 0.9, 4, 1.0).unwrap();
        assert_eq!(set.stage, "early_childhood");
        let psychodynamic = set
            .recommendations
            .iter()
            .find(|r| r.therapy_type == "Psychodynamic")
            .unwrap();
        assert!(!psychodynamic.age_appropriate);
        assert!(set.best_age_appropriate().is_some());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            recommend(data(), "depression", 1.2, 30, 1.0),
            Err(PersonaError::InvalidInput(_))
        ));
        assert!(matches!(
            recommend(data(), "made_up", 0.5, 30, 1.0),
            Err(PersonaError::NotFound(_))
        ));
    }

    #[test]
    fn test_condition_without_efficacy_data() {
        let set = recommend(data(), "schizoid_personality", 0.5, 30, 1.0).unwrap();
        assert!(set.recommendations.is_empty());
    }
}
