//! Symptom engine services
//!
//! The free functions in the submodules are the pure engine; the
//! [`SymptomEngine`] wraps them with reference data, configuration and
//! logging for the plugin host.

pub mod assessment;
pub mod backstory;
pub mod intervention;
pub mod recommendation;
mod symptom_engine;

pub use assessment::{
    assess, reassess, seed_from_subject, symptom_breakdown, AssessmentOptions, Reassessment,
    SymptomVariance, VarianceMode, DEFAULT_ACTIVATION_THRESHOLD, SYMPTOM_OFFSET_SPAN,
};
pub use backstory::baseline_from_backstory;
pub use intervention::{
    apply_intervention, therapies_for_target, therapy_match_score, treatable_targets,
};
pub use recommendation::{recommend, DEFAULT_REFERENCE_ADHERENCE};
pub use symptom_engine::*;
