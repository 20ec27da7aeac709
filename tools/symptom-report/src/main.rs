//! Symptom Report Tool
//!
//! Runs the symptom engine over JSON inputs and prints JSON reports.
//! Configuration comes from `SYMPTOMS_*` environment variables (a `.env`
//! file is honored); logs go to stderr.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use persona_core::{init_logging, load_env, load_env_from_path, Logger};
use persona_plugin_symptoms::{
    ConditionMap, ConditionState, ExperienceRecord, InterventionContext, SymptomEngine,
    SymptomEngineConfig, VarianceMode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory with taxonomy.json and tables.json (overrides SYMPTOMS_TABLES_PATH)
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Symptom variance (overrides SYMPTOMS_VARIANCE)
    #[arg(long, value_enum, global = true)]
    variance: Option<VarianceArg>,

    /// Compact single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Environment file to load instead of `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VarianceArg {
    /// Fixed per-symptom offsets
    Indexed,
    /// Offsets seeded from the subject id
    Seeded,
}

impl From<VarianceArg> for VarianceMode {
    fn from(arg: VarianceArg) -> Self {
        match arg {
            VarianceArg::Indexed => VarianceMode::Indexed,
            VarianceArg::Seeded => VarianceMode::Seeded,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Assess an experience history (JSON array of experience records)
    Assess {
        /// Experience history file
        #[arg(long)]
        history: PathBuf,

        /// Subject's current age
        #[arg(long)]
        age: u32,

        /// Subject id, used for seeded variance
        #[arg(long)]
        subject: Option<Uuid>,

        /// Previous condition map; switches to reassessment
        #[arg(long)]
        previous: Option<PathBuf>,
    },

    /// Apply a therapy course to one condition
    Intervene {
        /// Condition name
        #[arg(long)]
        condition: String,

        /// Current severity
        #[arg(long)]
        severity: f32,

        /// Age at onset
        #[arg(long, default_value_t = 0)]
        onset_age: u32,

        /// Therapy code
        #[arg(long)]
        therapy: String,

        /// Course length in weeks
        #[arg(long)]
        weeks: u32,

        /// Fraction of sessions attended
        #[arg(long, default_value_t = 1.0)]
        adherence: f32,

        /// Subject's age when the course ended
        #[arg(long)]
        age: u32,
    },

    /// Rank therapies for a condition
    Recommend {
        /// Condition name
        #[arg(long)]
        condition: String,

        /// Current severity
        #[arg(long)]
        severity: f32,

        /// Subject's age
        #[arg(long)]
        age: u32,
    },

    /// Seed baseline conditions from backstory text
    Backstory {
        /// Backstory text file
        #[arg(long)]
        file: PathBuf,

        /// Age the baseline applies to
        #[arg(long)]
        age: u32,

        /// Subject id, used for seeded variance
        #[arg(long)]
        subject: Option<Uuid>,
    },

    /// Developmental stage and vulnerability context for an age
    Stage {
        /// Subject's age
        #[arg(long)]
        age: u32,
    },

    /// List taxonomy conditions
    Taxonomy {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_report(command: &str, body: impl Serialize, compact: bool) -> anyhow::Result<()> {
    let report = serde_json::json!({
        "command": command,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "report": body,
    });
    let out = if compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", out);
    Ok(())
}

fn build_engine(cli: &Cli) -> anyhow::Result<SymptomEngine> {
    let mut config = SymptomEngineConfig::from_env()?;
    if let Some(path) = &cli.tables {
        config = config.with_tables_path(path);
    }
    if let Some(variance) = cli.variance {
        config = config.with_variance(variance.into());
    }
    Ok(SymptomEngine::new(config)?)
}

fn run(cli: Cli, log: &Logger) -> anyhow::Result<()> {
    match &cli.env_file {
        Some(path) => load_env_from_path(path)?,
        None => {
            if let Err(e) = load_env() {
                log.warn(&format!("Ignoring .env: {}", e));
            }
        }
    }

    let engine = build_engine(&cli)?;
    tracing::debug!(
        taxonomy_version = %engine.data().taxonomy().version(),
        conditions = engine.data().taxonomy().len(),
        therapies = engine.data().therapies().len(),
        variance = ?engine.config().symptom_variance,
        "Reference data ready"
    );

    match &cli.command {
        Command::Assess {
            history,
            age,
            subject,
            previous,
        } => {
            let records: Vec<ExperienceRecord> = read_json(history)?;
            match previous {
                Some(path) => {
                    let previous: ConditionMap = read_json(path)?;
                    let result = engine.reassess(*subject, &previous, &records, *age)?;
                    print_report("reassess", result, cli.compact)
                }
                None => {
                    let map = engine.assess(*subject, &records, *age)?;
                    print_report("assess", map, cli.compact)
                }
            }
        }
        Command::Intervene {
            condition,
            severity,
            onset_age,
            therapy,
            weeks,
            adherence,
            age,
        } => {
            let definition = engine.data().condition(condition)?;
            let state = ConditionState::new(
                condition.as_str(),
                &definition.category,
                *severity,
                *onset_age,
            );
            let outcome = engine.apply_intervention(
                &state,
                therapy,
                *weeks,
                *adherence,
                InterventionContext::at_age(*age),
            )?;
            print_report("intervene", outcome, cli.compact)
        }
        Command::Recommend {
            condition,
            severity,
            age,
        } => {
            let set = engine.recommend(condition, *severity, *age)?;
            if set.recommendations.is_empty() {
                tracing::warn!(condition = %condition, "No therapy has efficacy data");
            }
            print_report("recommend", set, cli.compact)
        }
        Command::Backstory { file, age, subject } => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let states = engine.baseline_from_backstory(*subject, &text, *age)?;
            print_report("backstory", states, cli.compact)
        }
        Command::Stage { age } => {
            let stage = engine.developmental_stage(*age)?;
            let context = engine.impact_context(*age)?;
            print_report(
                "stage",
                serde_json::json!({ "stage": stage, "context": context.to_context() }),
                cli.compact,
            )
        }
        Command::Taxonomy { category } => {
            let conditions: Vec<_> = match category {
                Some(category) => engine.data().conditions_in_category(category)?,
                None => engine.data().taxonomy().iter().collect(),
            };
            if conditions.is_empty() {
                bail!("taxonomy is empty");
            }
            print_report(
                "taxonomy",
                serde_json::json!({
                    "version": engine.data().taxonomy().version(),
                    "conditions": conditions,
                }),
                cli.compact,
            )
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging();
    let log = Logger::new("symptom-report");

    if let Err(e) = run(cli, &log) {
        log.error(&format!("{:#}", e));
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}
