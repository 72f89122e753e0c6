use std::collections::BTreeMap;
use std::fmt;

use serde::{ Deserialize, Serialize };
use thiserror::Error;

use crate::config::ConfigError;

/// Fallback shown when the server gives us nothing better
pub const GENERIC_FAILURE: &str = "An error occurred";

/// Key used for messages that belong to the whole form rather than one field
pub const FORM_FIELD: &str = "_form";

/// Field-scoped validation messages, keyed by the wire name of the field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single form-level message
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(FORM_FIELD, message);
        errors
    }

    /// Record a message for a field. The first message for a field wins,
    /// matching the order in which rules are evaluated.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    /// `Ok(value)` when no errors were collected
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<BTreeMap<String, String>> for FieldErrors {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Custom error types for the registry client
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Please fill in all required fields correctly")]
    Validation(FieldErrors),

    #[error("Your session has expired. Please sign in again")]
    Unauthorized,

    #[error("{message}")] Rejected {
        status: u16,
        message: String,
        field_errors: FieldErrors,
    },

    #[error("{message}")] Server {
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse server response: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RegistryError {
    /// A business-rule failure detected on the client before any request
    pub fn rule(message: impl Into<String>) -> Self {
        RegistryError::Rejected {
            status: 0,
            message: message.into(),
            field_errors: FieldErrors::new(),
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            RegistryError::Validation(errors) => Some(errors),
            RegistryError::Rejected { field_errors, .. } if !field_errors.is_empty() => {
                Some(field_errors)
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RegistryError::Unauthorized)
    }
}

/// Result type specific to registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Normalized failure handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), field_errors: None }
    }
}

impl From<&RegistryError> for ErrorReport {
    fn from(err: &RegistryError) -> Self {
        let message = match err {
            RegistryError::Rejected { message, .. } | RegistryError::Server { message, .. }
                if message.trim().is_empty() => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        };
        Self {
            message,
            field_errors: err.field_errors().cloned(),
        }
    }
}

/// Recoverable vs. non-recoverable errors
pub trait RecoverableError {
    fn is_recoverable(&self) -> bool;
    fn recovery_strategy(&self) -> Option<String>;
}

impl RecoverableError for RegistryError {
    fn is_recoverable(&self) -> bool {
        match self {
            RegistryError::Validation(_) |
            RegistryError::Rejected { .. } |
            RegistryError::Server { .. } |
            RegistryError::Network(_) => true,
            RegistryError::Unauthorized |
            RegistryError::Parse(_) |
            RegistryError::Storage(_) |
            RegistryError::InvalidInput(_) |
            RegistryError::Config(_) => false,
        }
    }

    fn recovery_strategy(&self) -> Option<String> {
        match self {
            RegistryError::Validation(_) | RegistryError::Rejected { .. } =>
                Some("Correct the highlighted fields and submit the step again".to_string()),
            RegistryError::Server { .. } | RegistryError::Network(_) =>
                Some("Retry the same step once the service is reachable".to_string()),
            RegistryError::Unauthorized => Some("Sign in again with `landreg login`".to_string()),
            RegistryError::Config(_) => Some("Check the configuration file and environment".to_string()),
            _ => None,
        }
    }
}
