//! End-to-end scenarios for the symptom engine
//!
//! Exercises the public API against the built-in reference data, plus
//! seeded randomized histories checking the engine's invariants.

use persona_core::types::{Plugin, Provider, State};
use persona_core::PersonaError;
use persona_plugin_symptoms::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;

const RISK_CATEGORIES: [&str; 14] = [
    "trauma",
    "neglect",
    "abuse",
    "loss",
    "achievement",
    "social_isolation",
    "bullying",
    "parental_substance_use",
    "domestic_violence",
    "sexual_abuse",
    "financial_instability",
    "chronic_illness",
    "peer_rejection",
    "attachment_disruption",
];

fn engine() -> SymptomEngine {
    SymptomEngine::new(SymptomEngineConfig::default()).unwrap()
}

fn random_history(rng: &mut StdRng, len: usize) -> Vec<ExperienceRecord> {
    let mut ages: Vec<u32> = (0..len).map(|_| rng.gen_range(0..40)).collect();
    ages.sort_unstable();
    ages.into_iter()
        .map(|age| {
            let category = RISK_CATEGORIES[rng.gen_range(0..RISK_CATEGORIES.len())];
            let intensity = Intensity::ALL[rng.gen_range(0..Intensity::ALL.len())];
            ExperienceRecord::new(age, category, intensity)
        })
        .collect()
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

/// An empty history yields no conditions
#[test]
fn test_empty_history() {
    let map = engine().assess(None, &[], 10).unwrap();
    assert!(map.is_empty());
}

/// Repeated early abuse saturates attachment disorder at first exposure
#[test]
fn test_early_abuse_attachment_disorder() {
    let history = vec![
        ExperienceRecord::new(4, "abuse", Intensity::Severe),
        ExperienceRecord::new(6, "abuse", Intensity::Severe),
        ExperienceRecord::new(8, "abuse", Intensity::Severe),
    ];
    let map = engine().assess(None, &history, 9).unwrap();

    let rad = &map["reactive_attachment_disorder"];
    assert_close(rad.severity, 1.0);
    assert_eq!(rad.onset_age, 4);
    assert_eq!(rad.status, ConditionStatus::Active);
    assert_eq!(rad.contributing_experiences.len(), 3);
    assert_eq!(rad.contributing_experiences[0], history[0].id);
}

/// Half a medication course at 80% adherence takes 0.24 off depression
#[test]
fn test_medication_half_course() {
    let engine = engine();
    let state = ConditionState::new("depression", "Mood Disorders", 0.8, 19);
    let context = InterventionContext::at_age(25);

    let outcome = engine
        .apply_intervention(&state, "medication", 12, 0.8, context)
        .unwrap();

    assert_close(outcome.reduction, 0.24);
    assert_close(outcome.new_severity, 0.56);
    assert_eq!(outcome.new_status, ConditionStatus::Active);
    assert_eq!(
        outcome.duration_assessment,
        DurationAssessment::ShorterThanRecommended
    );
    assert_eq!(outcome.history_entry.trigger, TriggerKind::Intervention);
    assert_eq!(outcome.history_entry.trigger_id, context.intervention_id);
    assert_eq!(outcome.history_entry.age, 25);
    assert_close(state.severity, 0.8);

    let updated = outcome.apply_to(&state);
    assert_close(updated.severity, 0.56);
}

#[test]
fn test_therapy_without_efficacy_is_rejected() {
    let state = ConditionState::new("depression", "Mood Disorders", 0.8, 19);
    let result = engine().apply_intervention(&state, "EMDR", 12, 1.0, InterventionContext::at_age(20));
    assert!(matches!(result, Err(PersonaError::UnknownTherapy { .. })));
}

/// Depression options for an adult are unique and ranked best first
#[test]
fn test_recommend_depression_adult() {
    let set = engine().recommend("depression", 0.72, 28).unwrap();
    assert_eq!(set.stage, "adult");
    assert_eq!(set.recommendations[0].therapy_type, "combination");

    let unique: HashSet<&str> = set
        .recommendations
        .iter()
        .map(|r| r.therapy_type.as_str())
        .collect();
    assert_eq!(unique.len(), set.recommendations.len());
    for pair in set.recommendations.windows(2) {
        assert!(pair[0].expected_reduction >= pair[1].expected_reduction);
    }
    for r in &set.recommendations {
        assert!(r.achievable_reduction <= 0.72);
    }
}

/// A ranked option promises exactly what the calculator delivers for a
/// reference-length course at the reference adherence
#[test]
fn test_recommendations_agree_with_calculator() {
    let engine = engine();
    let data = engine.data();
    let adherence = engine.config().reference_adherence;

    for condition in data.condition_names() {
        for severity in [0.15f32, 0.3, 0.9] {
            let set = engine.recommend(condition, severity, 40).unwrap();
            let state = ConditionState::new(condition, "any", severity, 20);
            for r in &set.recommendations {
                let weeks = data.therapy(&r.therapy_type).unwrap().reference_weeks;
                let outcome = engine
                    .apply_intervention(
                        &state,
                        &r.therapy_type,
                        weeks,
                        adherence,
                        InterventionContext::at_age(40),
                    )
                    .unwrap();
                assert_eq!(
                    r.expected_reduction, outcome.reduction,
                    "{condition}/{}",
                    r.therapy_type
                );
            }
        }
    }
}

/// Treatment persists through a reassessment that brings no new risk
#[test]
fn test_intervention_survives_neutral_reassessment() {
    let engine = engine();
    let mut history = vec![ExperienceRecord::new(20, "loss", Intensity::Extreme)];
    let mut conditions = engine.assess(None, &history, 20).unwrap();
    assert_close(conditions["depression"].severity, 0.7);

    let outcome = engine
        .apply_intervention(
            &conditions["depression"],
            "combination",
            24,
            1.0,
            InterventionContext::at_age(21),
        )
        .unwrap();
    let treated = outcome.apply_to(&conditions["depression"]);
    assert_eq!(treated.status, ConditionStatus::Resolved);
    conditions.insert("depression".to_string(), treated);

    history.push(ExperienceRecord::new(22, "career", Intensity::Moderate));
    let result = engine.reassess(None, &conditions, &history, 22).unwrap();
    assert!(result.changes.is_empty());
    assert_eq!(result.conditions["depression"], conditions["depression"]);

    // fresh risk builds on the treated severity, not the untreated one
    history.push(ExperienceRecord::new(24, "loss", Intensity::Mild));
    let result = engine.reassess(None, &conditions, &history, 24).unwrap();
    let depression = &result.conditions["depression"];
    assert_close(depression.severity, 0.21);
    assert_eq!(depression.status, ConditionStatus::InRemission);
    let change = result
        .changes
        .iter()
        .find(|c| c.condition == "depression")
        .unwrap();
    assert_close(change.severity_before, 0.0);
    assert_eq!(change.trigger_id, history[2].id);
}

#[test]
fn test_reassess_records_changes() {
    let engine = engine();
    let mut history = vec![ExperienceRecord::new(20, "loss", Intensity::Moderate)];
    let previous = engine.assess(None, &history, 20).unwrap();

    history.push(ExperienceRecord::new(22, "loss", Intensity::Severe));
    let result = engine.reassess(None, &previous, &history, 22).unwrap();

    let change = result
        .changes
        .iter()
        .find(|c| c.condition == "depression")
        .unwrap();
    assert!(change.severity_after > change.severity_before);
    assert_eq!(change.trigger_id, history[1].id);
    assert_eq!(result.conditions["depression"].onset_age, 20);
}

#[test]
fn test_backstory_then_treatment() {
    let engine = engine();
    let baseline = engine
        .baseline_from_backstory(None, "He was beaten by his stepfather.", 10)
        .unwrap();
    let ptsd = baseline.iter().find(|s| s.name == "ptsd").unwrap();
    assert_eq!(ptsd.onset_age, 10);

    let outcome = engine
        .apply_intervention(ptsd, "PE", 52, 1.0, InterventionContext::at_age(30))
        .unwrap();
    assert_eq!(outcome.duration_assessment, DurationAssessment::Appropriate);
    assert_close(outcome.reduction, 0.7);
    assert_eq!(outcome.new_status, ConditionStatus::Resolved);
}

/// Assessment output feeds the profile provider through state
#[tokio::test]
async fn test_plugin_profile_end_to_end() {
    let plugin = SymptomsPlugin::new();
    let provider = plugin.providers().remove(0);

    let history = vec![ExperienceRecord::new(4, "abuse", Intensity::Severe)];
    let map = engine().assess(None, &history, 12).unwrap();

    let mut state = State::new();
    state.set_data(CONDITION_MAP_KEY, serde_json::to_value(&map).unwrap());

    let result = provider.get(Arc::new(()), &state).await.unwrap();
    let values = result.values.unwrap();
    assert!(values["ACTIVE_CONDITIONS"].contains("reactive_attachment_disorder"));
    assert!(!values["PRIMARY_CONDITION"].is_empty());
}

#[test]
fn test_randomized_histories_hold_invariants() {
    let engine = engine();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let len = rng.gen_range(0..12);
        let history = random_history(&mut rng, len);
        let age = history.last().map_or(0, |e| e.age) + rng.gen_range(0..5);

        let map = engine.assess(None, &history, age).unwrap();
        assert_eq!(map, engine.assess(None, &history, age).unwrap());

        for state in map.values() {
            assert!((0.0..=1.0).contains(&state.severity));
            assert_eq!(state.status, ConditionStatus::from_severity(state.severity));
            assert!(state.onset_age <= age);
            assert!(!state.contributing_experiences.is_empty());
            for value in state.symptoms.values() {
                assert!((0.0..=1.0).contains(value));
            }
        }

        // One more experience never lowers or removes a condition
        let extra_age = age + rng.gen_range(0..3);
        let mut longer = history.clone();
        longer.extend(random_history(&mut rng, 1).into_iter().map(|mut e| {
            e.age = extra_age;
            e
        }));
        let grown = engine.assess(None, &longer, extra_age).unwrap();
        for (name, state) in &map {
            let after = &grown[name];
            assert!(after.severity >= state.severity);
            assert_eq!(after.onset_age, state.onset_age);
        }
    }
}

#[test]
fn test_randomized_interventions() {
    let engine = engine();
    let data = engine.data();
    let mut rng = StdRng::seed_from_u64(42);

    let pairs: Vec<(String, String, f32)> = data
        .condition_names()
        .into_iter()
        .filter_map(|name| data.efficacy_for(name).map(|row| (name, row)))
        .flat_map(|(name, row)| {
            row.iter()
                .map(move |(code, eff)| (name.to_string(), code.clone(), *eff))
        })
        .collect();
    assert!(!pairs.is_empty());

    for _ in 0..200 {
        let (condition, code, efficacy) = &pairs[rng.gen_range(0..pairs.len())];
        let reference_weeks = data.therapy(code).unwrap().reference_weeks;
        let severity = rng.gen_range(0.0..=1.0f32);
        let state = ConditionState::new(condition.as_str(), "any", severity, 10);

        let idle = engine
            .apply_intervention(&state, code, 8, 0.0, InterventionContext::at_age(20))
            .unwrap();
        assert_eq!(idle.reduction, 0.0);
        assert_close(idle.new_severity, state.severity);

        let weeks = reference_weeks + rng.gen_range(0..10);
        let full = engine
            .apply_intervention(&state, code, weeks, 1.0, InterventionContext::at_age(20))
            .unwrap();
        assert_close(full.reduction, (efficacy * 100.0).round() / 100.0);
        assert!((0.0..=1.0).contains(&full.new_severity));
        assert!(full.new_severity <= state.severity);
        assert_eq!(full.new_status, ConditionStatus::from_severity(full.new_severity));

        let adherence = rng.gen_range(0.0..=1.0f32);
        let partial = engine
            .apply_intervention(&state, code, weeks, adherence, InterventionContext::at_age(20))
            .unwrap();
        assert!(partial.reduction <= full.reduction + 1e-4);
    }
}
