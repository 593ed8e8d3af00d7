//! crates/visa_guide_core/src/error.rs
//!
//! Errors raised by the wizard and the detail-screen controller. Port
//! failures live in `ports.rs`.

use serde::Serialize;
use std::fmt;

/// A single inline form error, attached to the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field error found in one submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Expected to be on step {expected} but the wizard is on step {actual}")]
    WrongStep { expected: u8, actual: u8 },
    #[error("The visa details screen is not open")]
    NoActiveJourney,
    #[error("Unknown timeline step: {0}")]
    UnknownStep(String),
    #[error("Unknown special-case scenario: {0}")]
    UnknownScenario(String),
    #[error("Checklist index {0} is out of range")]
    ChecklistIndexOutOfRange(usize),
    #[error("Open the special cases tab before exporting the checklist")]
    ExportLocked,
}
