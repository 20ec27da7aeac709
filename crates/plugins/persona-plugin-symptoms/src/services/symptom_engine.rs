//! Symptom Engine Service
//!
//! Binds the pure engine functions to one set of reference data and one
//! configuration, and adds the logging the pure functions leave out.

use super::assessment::{self, AssessmentOptions, Reassessment, SymptomVariance, VarianceMode};
use super::{backstory, intervention, recommendation};
use crate::reference::ReferenceData;
use crate::types::*;
use async_trait::async_trait;
use persona_core::{
    get_env_bool, get_env_float, get_env_int, get_env_or, types::Service, PersonaError, Result,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Configuration for the Symptom Engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEngineConfig {
    /// Orchestration switch; the engine functions ignore it
    pub enabled: bool,

    /// Cumulative risk needed to activate a condition
    pub activation_threshold: f32,

    /// Symptom variance strategy
    pub symptom_variance: VarianceMode,

    /// Adherence assumed when ranking therapies
    pub reference_adherence: f32,

    /// Symptoms listed per condition in the profile provider
    pub profile_symptoms: usize,

    /// Directory holding `taxonomy.json` and `tables.json`; built-in data when unset
    pub tables_path: Option<PathBuf>,
}

impl Default for SymptomEngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            activation_threshold: assessment::DEFAULT_ACTIVATION_THRESHOLD,
            symptom_variance: VarianceMode::Indexed,
            reference_adherence: recommendation::DEFAULT_REFERENCE_ADHERENCE,
            profile_symptoms: 3,
            tables_path: None,
        }
    }
}

impl SymptomEngineConfig {
    /// Read `SYMPTOMS_*` environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let symptom_variance = get_env_or("SYMPTOMS_VARIANCE", "indexed").parse()?;
        let tables_path = Some(get_env_or("SYMPTOMS_TABLES_PATH", ""))
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let config = Self {
            enabled: get_env_bool("SYMPTOMS_ENABLED", defaults.enabled),
            activation_threshold: get_env_float(
                "SYMPTOMS_ACTIVATION_THRESHOLD",
                defaults.activation_threshold,
            ),
            symptom_variance,
            reference_adherence: get_env_float(
                "SYMPTOMS_REFERENCE_ADHERENCE",
                defaults.reference_adherence,
            ),
            profile_symptoms: get_env_int("SYMPTOMS_PROFILE_SYMPTOMS", defaults.profile_symptoms),
            tables_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let t = self.activation_threshold;
        if !t.is_finite() || t <= 0.0 || t > 1.0 {
            return Err(PersonaError::config(format!(
                "SYMPTOMS_ACTIVATION_THRESHOLD must be in (0, 1], got {}",
                t
            )));
        }
        let a = self.reference_adherence;
        if !a.is_finite() || !(0.0..=1.0).contains(&a) {
            return Err(PersonaError::config(format!(
                "SYMPTOMS_REFERENCE_ADHERENCE must be in [0, 1], got {}",
                a
            )));
        }
        if self.profile_symptoms == 0 {
            return Err(PersonaError::config(
                "SYMPTOMS_PROFILE_SYMPTOMS must be at least 1",
            ));
        }
        Ok(())
    }

    /// Set the variance strategy
    pub fn with_variance(mut self, mode: VarianceMode) -> Self {
        self.symptom_variance = mode;
        self
    }

    /// Load reference data from a directory instead of the built-in tables
    pub fn with_tables_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tables_path = Some(path.into());
        self
    }
}

/// Symptom Engine Service
pub struct SymptomEngine {
    data: Cow<'static, ReferenceData>,
    config: SymptomEngineConfig,
    running: bool,
}

impl SymptomEngine {
    /// Create an engine, loading reference data named by the configuration
    pub fn new(config: SymptomEngineConfig) -> Result<Self> {
        config.validate()?;
        let data = match &config.tables_path {
            Some(path) => Cow::Owned(ReferenceData::from_dir(path)?),
            None => Cow::Borrowed(ReferenceData::builtin()?),
        };
        Ok(Self {
            data,
            config,
            running: false,
        })
    }

    /// Create an engine over caller-supplied reference data
    pub fn with_data(data: ReferenceData, config: SymptomEngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            data: Cow::Owned(data),
            config,
            running: false,
        })
    }

    /// Reference data in use
    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    /// Configuration in use
    pub fn config(&self) -> &SymptomEngineConfig {
        &self.config
    }

    /// Assessment options for a subject
    pub fn options(&self, subject: Option<Uuid>) -> AssessmentOptions {
        AssessmentOptions {
            activation_threshold: self.config.activation_threshold,
            variance: SymptomVariance::for_subject(self.config.symptom_variance, subject),
        }
    }

    /// Assess a subject's history
    pub fn assess(
        &self,
        subject: Option<Uuid>,
        history: &[ExperienceRecord],
        current_age: u32,
    ) -> Result<ConditionMap> {
        let map = assessment::assess(&self.data, history, current_age, &self.options(subject))?;
        let active = map.values().filter(|s| s.is_active()).count();
        tracing::info!(
            subject = ?subject,
            experiences = history.len(),
            current_age,
            conditions = map.len(),
            active,
            "Assessment complete"
        );
        Ok(map)
    }

    /// Reassess against a previous snapshot
    pub fn reassess(
        &self,
        subject: Option<Uuid>,
        previous: &ConditionMap,
        history: &[ExperienceRecord],
        current_age: u32,
    ) -> Result<Reassessment> {
        let result = assessment::reassess(
            &self.data,
            previous,
            history,
            current_age,
            &self.options(subject),
        )?;
        tracing::info!(
            subject = ?subject,
            conditions = result.conditions.len(),
            changes = result.changes.len(),
            "Reassessment complete"
        );
        Ok(result)
    }

    /// Apply a therapy course to one condition
    pub fn apply_intervention(
        &self,
        state: &ConditionState,
        therapy_type: &str,
        duration_weeks: u32,
        adherence: f32,
        context: InterventionContext,
    ) -> Result<InterventionOutcome> {
        let outcome = intervention::apply_intervention(
            &self.data,
            state,
            therapy_type,
            duration_weeks,
            adherence,
            context,
        );
        match &outcome {
            Ok(o) => tracing::info!(
                condition = %o.condition,
                therapy = %o.therapy_type,
                reduction = o.reduction,
                status = o.new_status.as_str(),
                "Intervention evaluated"
            ),
            Err(e) if e.is_user_facing() => tracing::warn!(
                condition = %state.name,
                therapy = %therapy_type,
                error = %e,
                "Intervention rejected"
            ),
            Err(_) => {}
        }
        outcome
    }

    /// Rank therapies for a condition
    pub fn recommend(&self, condition: &str, severity: f32, age: u32) -> Result<RecommendationSet> {
        recommendation::recommend(
            &self.data,
            condition,
            severity,
            age,
            self.config.reference_adherence,
        )
    }

    /// Seed baseline conditions from backstory text
    pub fn baseline_from_backstory(
        &self,
        subject: Option<Uuid>,
        text: &str,
        baseline_age: u32,
    ) -> Result<Vec<ConditionState>> {
        let variance = SymptomVariance::for_subject(self.config.symptom_variance, subject);
        let states = backstory::baseline_from_backstory(&self.data, text, baseline_age, &variance)?;
        tracing::info!(
            subject = ?subject,
            baseline_age,
            seeded = states.len(),
            "Backstory baseline mapped"
        );
        Ok(states)
    }

    /// Developmental stage for an age
    pub fn developmental_stage(&self, age: u32) -> Result<&DevelopmentalStage> {
        self.data.stage_for(age)
    }

    /// Vulnerability context for an age
    pub fn impact_context(&self, age: u32) -> Result<ImpactContext> {
        self.data.impact_context(age)
    }
}

#[async_trait]
impl Service for SymptomEngine {
    fn service_type(&self) -> &str {
        "symptom_engine"
    }

    async fn initialize(&mut self, _runtime: Arc<dyn Any + Send + Sync>) -> Result<()> {
        tracing::info!(
            conditions = self.data.taxonomy().len(),
            therapies = self.data.therapies().len(),
            "Symptom Engine initialized"
        );
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        self.running = true;
        tracing::info!("Symptom Engine started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.running = false;
        tracing::info!("Symptom Engine stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
