//! Core types for the symptom engine
//!
//! - ExperienceRecord: caller-supplied life events
//! - ConditionDefinition / ConditionState: taxonomy entries and derived state
//! - SymptomHistoryEntry: append-only change log
//! - TherapyModality and intervention/recommendation results
//! - DevelopmentalStage: age bands and their treatment implications

mod condition;
mod experience;
mod history;
mod stage;
mod therapy;

pub use condition::*;
pub use experience::*;
pub use history::*;
pub use stage::*;
pub use therapy::*;

pub(crate) use condition::{clamp_unit, round2};
