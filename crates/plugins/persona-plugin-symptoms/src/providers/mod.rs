//! Providers for LLM context

mod symptom_profile;

pub use symptom_profile::*;
