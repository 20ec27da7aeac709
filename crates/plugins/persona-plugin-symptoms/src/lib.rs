//! Persona Symptoms Plugin
//!
//! Deterministic symptom assessment and intervention-effectiveness engine for
//! simulated personas.
//!
//! # Overview
//!
//! - **Reference data**: a disorder taxonomy plus static tables (experience
//!   risk, age and intensity multipliers, therapy catalog, base efficacy,
//!   developmental stages, backstory keyword rules), embedded as JSON and
//!   validated once at load.
//!
//! - **Assessment**: folds a chronological experience history into a
//!   [`ConditionMap`] of severities, onset ages, symptom breakdowns and
//!   contributing experiences.
//!
//! - **Interventions**: computes how much a therapy course reduces a
//!   condition and returns the history entry for the caller to persist.
//!
//! - **Recommendations**: ranks therapies for a condition, flagging those
//!   that do not suit the subject's developmental stage.
//!
//! - **Backstory baseline**: seeds starting conditions from backstory text.
//!
//! All engine functions are pure and synchronous. [`SymptomEngine`] binds
//! them to one configuration for the plugin host, and
//! [`SymptomProfileProvider`] renders the current profile for prompts.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use persona_plugin_symptoms::{ExperienceRecord, Intensity, SymptomEngine, SymptomEngineConfig};
//!
//! let engine = SymptomEngine::new(SymptomEngineConfig::default())?;
//! let history = vec![ExperienceRecord::new(6, "neglect", Intensity::Severe)];
//! let conditions = engine.assess(None, &history, 30)?;
//! let options = engine.recommend("reactive_attachment_disorder", 0.8, 30)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use persona_core::{types::*, PersonaError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Core types for the symptom engine
pub mod types;
/// Reference data loading and lookup
pub mod reference;
/// Engine functions and the engine service
pub mod services;
/// Providers for LLM context
pub mod providers;

pub use providers::*;
pub use reference::{ReferenceData, StaticTables, Taxonomy};
pub use services::*;
pub use types::*;

// ============================================================================
// ANSI Art Banner Rendering
// ============================================================================

/// Represents a configuration setting row for display
struct SettingRow {
    value: String,
    is_default: bool,
    env_var: String,
}

/// Pad string to width, truncating if necessary
fn pad(s: &str, w: usize) -> String {
    let mut out = s.to_string();
    if out.len() > w {
        out.truncate(w);
    }
    let pad_len = w.saturating_sub(out.len());
    out + &" ".repeat(pad_len)
}

const BANNER_ART: [&str; 5] = [
    r"  ____ __   ____  __ ____ _____ ___  __  __ ____  ",
    r" / ___|\ \ / /  \/  |  _ \_   _/ _ \|  \/  / ___| ",
    r" \___ \ \ V /| |\/| | |_) || || | | | |\/| \___ \ ",
    r"  ___) | | | | |  | |  __/ | || |_| | |  | |___) |",
    r" |____/  |_| |_|  |_|_|    |_| \___/|_|  |_|____/ ",
];

/// Render the symptoms plugin banner with settings
fn render_symptoms_banner(rows: &[SettingRow]) {
    let blue = "\x1b[34m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let green = "\x1b[32m";
    let dim = "\x1b[2m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    println!("{blue}+{line}+{reset}", line = "=".repeat(78));
    for art in BANNER_ART {
        println!("{blue}|{bold}{art}{reset}{blue}|{reset}", art = pad(art, 78));
    }

    println!("{blue}|{reset}");
    println!(
        "{blue}|{inner}|{reset}",
        inner = pad(
            &format!(
                "  {yellow}Assessment{reset}  {dim}◈{reset}  {yellow}Intervention{reset}  {dim}◈{reset}  {yellow}Recommendation{reset}  {dim}◈{reset}  {cyan}Backstory{reset}"
            ),
            78
        ),
    );

    println!("{blue}+{line}+{reset}", line = "-".repeat(78));
    println!(
        "{blue}|{a}|{b}|{c}|{reset}",
        a = pad(&format!(" {bold}SETTING{reset}"), 40),
        b = pad(&format!(" {bold}VALUE{reset}"), 24),
        c = pad(&format!(" {bold}STATUS{reset}"), 12),
    );
    println!("{blue}+{line}+{reset}", line = "-".repeat(78));

    for row in rows {
        let status_color = if row.is_default { dim } else { green };
        let status_text = if row.is_default { "default" } else { "custom" };
        let status_icon = if row.is_default { " " } else { "◈" };

        println!(
            "{blue}|{status_icon} {name}|{value}|{status}|{reset}",
            name = pad(&row.env_var, 38),
            value = pad(&row.value, 24),
            status = pad(&format!("{status_color}{status_text}{reset}"), 20),
        );
    }

    println!("{blue}+{line}+{reset}", line = "-".repeat(78));
    println!(
        "{blue}|{inner}|{reset}",
        inner = pad(
            &format!("  {green}◈{reset} custom  {dim}○{reset} default  {yellow}!{reset} set SYMPTOMS_ENABLED=false to unmount"),
            78
        ),
    );
    println!("{blue}+{line}+{reset}", line = "=".repeat(78));
}

// ============================================================================
// Plugin Implementation
// ============================================================================

/// Symptoms Plugin
///
/// Mounts the symptom engine service and the symptom profile provider.
pub struct SymptomsPlugin {
    config: SymptomEngineConfig,
}

impl SymptomsPlugin {
    /// Create a new plugin with default configuration
    pub fn new() -> Self {
        Self {
            config: SymptomEngineConfig::default(),
        }
    }

    /// Create with a custom configuration
    pub fn with_config(config: SymptomEngineConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &SymptomEngineConfig {
        &self.config
    }
}

impl Default for SymptomsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for SymptomsPlugin {
    fn name(&self) -> &str {
        "symptoms"
    }

    fn description(&self) -> &str {
        "Deterministic symptom assessment, intervention effectiveness and therapy recommendations"
    }

    fn priority(&self) -> i32 {
        5
    }

    async fn init(
        &self,
        config: HashMap<String, String>,
        _runtime: Arc<dyn std::any::Any + Send + Sync>,
    ) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| PersonaError::plugin(format!("symptoms: {}", e)))?;

        let mut rows: Vec<SettingRow> = Vec::new();

        if let Some(schema) = self.config_schema() {
            if let Some(map) = schema.as_object() {
                for (key, val) in map {
                    let def = val
                        .get("default")
                        .map(|v| v.to_string().replace('"', ""))
                        .unwrap_or_default();
                    let (value, is_default) = match config
                        .get(key)
                        .cloned()
                        .or_else(|| std::env::var(key).ok())
                    {
                        Some(v) => (v, false),
                        None => (def, true),
                    };
                    rows.push(SettingRow {
                        value,
                        is_default,
                        env_var: key.clone(),
                    });
                }
            }
        }

        render_symptoms_banner(&rows);

        tracing::info!(
            enabled = self.config.enabled,
            activation_threshold = self.config.activation_threshold,
            variance = ?self.config.symptom_variance,
            "Symptoms plugin initialized"
        );

        Ok(())
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        if !self.config.enabled {
            return vec![];
        }
        vec![Arc::new(
            SymptomProfileProvider::new().with_max_symptoms(self.config.profile_symptoms),
        )]
    }

    fn services(&self) -> Vec<Arc<dyn Service>> {
        if !self.config.enabled {
            return vec![];
        }
        match SymptomEngine::new(self.config.clone()) {
            Ok(engine) => vec![Arc::new(engine)],
            Err(e) => {
                tracing::error!(error = %e, "Symptom Engine could not load reference data");
                vec![]
            }
        }
    }

    fn schema(&self) -> Option<serde_json::Value> {
        // Tables for the host's storage layer; this crate never writes them
        Some(serde_json::json!({
            "persona_symptoms": {
                "columns": {
                    "id": "TEXT PRIMARY KEY",
                    "persona_id": "TEXT NOT NULL",
                    "condition": "TEXT NOT NULL",
                    "category": "TEXT",
                    "severity": "REAL NOT NULL",
                    "onset_age": "INTEGER",
                    "status": "TEXT NOT NULL",
                    "symptoms": "TEXT",
                    "contributing_experiences": "TEXT",
                    "created_at": "TEXT",
                    "updated_at": "TEXT"
                }
            },
            "symptom_history": {
                "columns": {
                    "id": "TEXT PRIMARY KEY",
                    "persona_symptom_id": "TEXT NOT NULL",
                    "severity_before": "REAL",
                    "severity_after": "REAL",
                    "age": "INTEGER",
                    "trigger": "TEXT NOT NULL",
                    "trigger_id": "TEXT",
                    "created_at": "TEXT"
                }
            }
        }))
    }

    fn config_schema(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "SYMPTOMS_ENABLED": {"type": "boolean", "default": true, "description": "Mount the symptom engine and profile provider"},
            "SYMPTOMS_ACTIVATION_THRESHOLD": {"type": "number", "default": 0.3, "description": "Cumulative risk at which a condition becomes present"},
            "SYMPTOMS_VARIANCE": {"type": "string", "default": "indexed", "description": "Symptom variance (indexed, seeded)"},
            "SYMPTOMS_REFERENCE_ADHERENCE": {"type": "number", "default": 1.0, "description": "Adherence assumed when ranking therapies"},
            "SYMPTOMS_PROFILE_SYMPTOMS": {"type": "integer", "default": 3, "description": "Symptoms listed per condition in the profile provider"},
            "SYMPTOMS_TABLES_PATH": {"type": "string", "default": "", "description": "Directory with taxonomy.json and tables.json (built-in data when empty)"}
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
