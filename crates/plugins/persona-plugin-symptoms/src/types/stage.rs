//! Developmental stages

use serde::{Deserialize, Serialize};

/// Age-typical coping resources, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CopingCapacity {
    /// Ability to make sense of events
    pub cognitive_processing: f32,
    /// Ability to regulate emotion
    pub emotional_regulation: f32,
    /// Access to supportive others
    pub social_support_access: f32,
    /// Ability to put experiences into words
    pub verbal_articulation: f32,
    /// Sense of control over circumstances
    pub agency: f32,
}

/// A developmental stage and what it implies for impact and treatment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentalStage {
    /// Stage name, e.g. "middle_childhood"
    pub name: String,

    /// First age in the stage
    pub min_age: u32,

    /// Last age in the stage; open-ended when absent
    #[serde(default)]
    pub max_age: Option<u32>,

    /// Developmental tasks of the stage
    pub key_tasks: Vec<String>,

    /// Why events at this age weigh more
    #[serde(default)]
    pub vulnerability_factors: Vec<String>,

    /// Protective factors available at this age
    #[serde(default)]
    pub resilience_factors: Vec<String>,

    /// Weight of negative events relative to adulthood
    pub trauma_impact_multiplier: f32,

    /// Weight of positive events relative to adulthood
    pub positive_impact_multiplier: f32,

    /// Typical coping resources
    pub coping_capacity: CopingCapacity,

    /// Therapy codes suited to this stage
    pub age_appropriate_therapies: Vec<String>,
}

impl DevelopmentalStage {
    /// Whether `age` falls inside the stage
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min_age && self.max_age.map_or(true, |max| age <= max)
    }

    /// Whether the therapy code suits this stage
    pub fn is_age_appropriate(&self, therapy: &str) -> bool {
        self.age_appropriate_therapies.iter().any(|t| t == therapy)
    }
}

/// Vulnerability context for an age, handed to narrative collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactContext {
    /// Age the context describes
    pub age: u32,
    /// Stage name
    pub stage: String,
    /// Weight of negative events relative to adulthood
    pub trauma_impact_multiplier: f32,
    /// Weight of positive events relative to adulthood
    pub positive_impact_multiplier: f32,
    /// Developmental tasks at risk
    pub key_tasks: Vec<String>,
    /// Vulnerability factors
    pub vulnerability_factors: Vec<String>,
    /// Resilience factors
    pub resilience_factors: Vec<String>,
    /// Coping resources
    pub coping_capacity: CopingCapacity,
}

impl ImpactContext {
    /// Prompt-ready summary
    pub fn to_context(&self) -> String {
        let mut out = format!(
            "Developmental context (age {}, {}): negative events weigh {:.1}x the adult baseline.",
            self.age,
            self.stage.replace('_', " "),
            self.trauma_impact_multiplier
        );
        if !self.key_tasks.is_empty() {
            let tasks: Vec<String> = self.key_tasks.iter().map(|t| t.replace('_', " ")).collect();
            out.push_str(&format!(" Key tasks: {}.", tasks.join(", ")));
        }
        if let Some(first) = self.vulnerability_factors.first() {
            out.push_str(&format!(" Main vulnerability: {}.", first));
        }
        out
    }
}

impl From<(&DevelopmentalStage, u32)> for ImpactContext {
    fn from((stage, age): (&DevelopmentalStage, u32)) -> Self {
        Self {
            age,
            stage: stage.name.clone(),
            trauma_impact_multiplier: stage.trauma_impact_multiplier,
            positive_impact_multiplier: stage.positive_impact_multiplier,
            key_tasks: stage.key_tasks.clone(),
            vulnerability_factors: stage.vulnerability_factors.clone(),
            resilience_factors: stage.resilience_factors.clone(),
            coping_capacity: stage.coping_capacity,
        }
    }
}
