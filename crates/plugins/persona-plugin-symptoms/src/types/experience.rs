//! Life experience records
//!
//! Experiences are supplied by the persistence layer in chronological order
//! and are never modified by the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Qualitative valence of an experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Valence {
    /// Harmful or distressing
    #[default]
    Negative,
    /// Neither harmful nor supportive
    Neutral,
    /// Supportive or healing
    Positive,
}

/// Qualitative intensity label of an experience
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Mild
    Mild,
    /// Moderate
    #[default]
    Moderate,
    /// Severe
    Severe,
    /// Extreme
    Extreme,
}

impl Intensity {
    /// All intensity labels, weakest first
    pub const ALL: [Intensity; 4] = [
        Intensity::Mild,
        Intensity::Moderate,
        Intensity::Severe,
        Intensity::Extreme,
    ];

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Mild => "mild",
            Intensity::Moderate => "moderate",
            Intensity::Severe => "severe",
            Intensity::Extreme => "extreme",
        }
    }
}

/// A single life event in a subject's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    /// Opaque identifier assigned by the persistence layer
    pub id: Uuid,

    /// Subject's age when the event happened
    pub age: u32,

    /// Category label, e.g. "abuse" or "career"
    pub category: String,

    /// Qualitative valence
    #[serde(default)]
    pub valence: Valence,

    /// Qualitative intensity
    pub intensity: Intensity,

    /// Free-text description
    #[serde(default)]
    pub description: String,
}

impl ExperienceRecord {
    /// Create a negative experience with a fresh identifier
    pub fn new(age: u32, category: impl Into<String>, intensity: Intensity) -> Self {
        Self {
            id: Uuid::new_v4(),
            age,
            category: category.into(),
            valence: Valence::Negative,
            intensity,
            description: String::new(),
        }
    }

    /// Use a caller-supplied identifier
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the valence
    pub fn with_valence(mut self, valence: Valence) -> Self {
        self.valence = valence;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
