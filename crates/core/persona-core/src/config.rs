//! Configuration management and environment variable loading

use crate::{PersonaError, Result};
use std::env;
use std::path::Path;

/// Load environment variables from a .env file
///
/// Looks in the current directory and its parents. A missing file is not an
/// error; the process environment is used as-is.
///
/// # Example
///
/// ```no_run
/// use persona_core::load_env;
///
/// load_env().ok();
/// let threshold = std::env::var("SYMPTOMS_ACTIVATION_THRESHOLD").unwrap_or_default();
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!("✓ Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(PersonaError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::debug!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(PersonaError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(_) => {
            tracing::info!("✓ Loaded environment from: {}", path.as_ref().display());
            Ok(())
        }
        Err(e) => Err(PersonaError::config(format!(
            "Failed to load {} environment file: {}",
            path.as_ref().display(),
            e
        ))),
    }
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as boolean
pub fn get_env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Get environment variable as integer
pub fn get_env_int<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Get environment variable as float
pub fn get_env_float(key: &str, default: f32) -> f32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_bool() {
        env::set_var("PERSONA_TEST_BOOL_TRUE", "true");
        env::set_var("PERSONA_TEST_BOOL_OFF", "off");

        assert!(get_env_bool("PERSONA_TEST_BOOL_TRUE", false));
        assert!(!get_env_bool("PERSONA_TEST_BOOL_OFF", true));
        assert!(get_env_bool("PERSONA_TEST_NONEXISTENT", true));

        env::remove_var("PERSONA_TEST_BOOL_TRUE");
        env::remove_var("PERSONA_TEST_BOOL_OFF");
    }

    #[test]
    fn test_get_env_int() {
        env::set_var("PERSONA_TEST_INT", "24");
        assert_eq!(get_env_int("PERSONA_TEST_INT", 0u32), 24);
        assert_eq!(get_env_int("PERSONA_TEST_NONEXISTENT_INT", 12u32), 12);
        env::remove_var("PERSONA_TEST_INT");
    }

    #[test]
    fn test_get_env_float() {
        env::set_var("PERSONA_TEST_FLOAT", "0.35");
        assert_eq!(get_env_float("PERSONA_TEST_FLOAT", 0.0), 0.35);
        assert_eq!(get_env_float("PERSONA_TEST_NONEXISTENT_FLOAT", 0.3), 0.3);
        env::remove_var("PERSONA_TEST_FLOAT");
    }

    #[test]
    fn test_get_env_or() {
        env::set_var("PERSONA_TEST_STRING", "seeded");
        assert_eq!(get_env_or("PERSONA_TEST_STRING", "indexed"), "seeded");
        assert_eq!(get_env_or("PERSONA_TEST_NONEXISTENT_STRING", "indexed"), "indexed");
        env::remove_var("PERSONA_TEST_STRING");
    }

    #[test]
    fn test_load_env_from_missing_path() {
        let result = load_env_from_path("/definitely/not/here/.env");
        assert!(matches!(result, Err(PersonaError::Config(_))));
    }
}
