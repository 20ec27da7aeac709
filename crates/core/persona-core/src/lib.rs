//! Persona core
//!
//! Shared plumbing for the persona simulation engines:
//!
//! - [`PersonaError`] and the crate-wide [`Result`] alias
//! - environment and `.env` helpers
//! - logging initialisation on top of `tracing-subscriber`
//! - the plugin, provider and conversation-state contract used by the
//!   orchestration layer to mount engines

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use uuid::Uuid;

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::{
    get_env_bool, get_env_float, get_env_int, get_env_or, load_env, load_env_from_path,
};
pub use error::{PersonaError, Result};
pub use utils::{init_logging, Logger};
