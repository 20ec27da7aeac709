//! Error types for the persona engines

use thiserror::Error;

/// Main error type for persona operations
#[derive(Debug, Error)]
pub enum PersonaError {
    /// Lookup of an unknown condition, category or therapy
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied out-of-range or out-of-order input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No efficacy data for a condition/therapy pair
    #[error("No known efficacy data for therapy '{therapy}' on condition '{condition}'")]
    UnknownTherapy {
        /// Condition name
        condition: String,
        /// Therapy code
        therapy: String,
    },

    /// Configuration or reference data error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Plugin-related error
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// Provider error
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Convenient Result type using PersonaError
pub type Result<T> = std::result::Result<T, PersonaError>;

impl PersonaError {
    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        PersonaError::NotFound(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        PersonaError::InvalidInput(msg.into())
    }

    /// Create an unknown-therapy error
    pub fn unknown_therapy(condition: impl Into<String>, therapy: impl Into<String>) -> Self {
        PersonaError::UnknownTherapy {
            condition: condition.into(),
            therapy: therapy.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        PersonaError::Config(msg.into())
    }

    /// Create a plugin error
    pub fn plugin(msg: impl Into<String>) -> Self {
        PersonaError::Plugin(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        PersonaError::Provider(msg.into())
    }

    /// Whether the caller should surface this as a validation message
    /// rather than a system fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PersonaError::NotFound(_)
                | PersonaError::InvalidInput(_)
                | PersonaError::UnknownTherapy { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PersonaError::not_found("condition 'foo'");
        assert!(matches!(err, PersonaError::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: condition 'foo'");
    }

    #[test]
    fn test_unknown_therapy_message() {
        let err = PersonaError::unknown_therapy("depression", "EMDR");
        assert_eq!(
            err.to_string(),
            "No known efficacy data for therapy 'EMDR' on condition 'depression'"
        );
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(PersonaError::invalid_input("adherence").is_user_facing());
        assert!(PersonaError::unknown_therapy("ptsd", "FBT").is_user_facing());
        assert!(!PersonaError::config("bad tables").is_user_facing());
        assert!(!PersonaError::provider("boom").is_user_facing());
        assert!(!PersonaError::plugin("symptoms").is_user_facing());
    }

    #[test]
    fn test_serde_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: PersonaError = parse.unwrap_err().into();
        assert!(matches!(err, PersonaError::Serialization(_)));
    }
}
