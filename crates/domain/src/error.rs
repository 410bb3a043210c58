//! Domain error taxonomy.
//!
//! Every seat ledger, access gate and registry operation fails with one of
//! these categories. The HTTP layer maps each category to a status code.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarpoolError {
    /// An event, car, passenger or ride request does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The car has no free seat left.
    #[error("No seats available in car {car_id}")]
    CapacityExceeded { car_id: i64 },

    /// Wrong or missing PIN / event password.
    #[error("{0}")]
    AuthorizationFailed(String),

    /// Missing or invalid input.
    #[error("{0}")]
    Validation(String),

    /// The backing store failed for any other reason.
    #[error("Storage failure: {0}")]
    Transport(String),
}

pub type CarpoolResult<T> = Result<T, CarpoolError>;

impl CarpoolError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CarpoolError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CarpoolError::Validation(message.into())
    }

    /// Stable machine-readable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            CarpoolError::NotFound(_) => "not_found",
            CarpoolError::CapacityExceeded { .. } => "capacity_exceeded",
            CarpoolError::AuthorizationFailed(_) => "authorization_failed",
            CarpoolError::Validation(_) => "validation_error",
            CarpoolError::Transport(_) => "transport_failure",
        }
    }
}

impl From<sqlx::Error> for CarpoolError {
    fn from(err: sqlx::Error) -> Self {
        CarpoolError::Transport(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CarpoolError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field))
                })
            })
            .collect();

        // Nested struct or list errors carry no field-level message.
        if messages.is_empty() {
            messages.push("Invalid request".to_string());
        }
        messages.sort();

        CarpoolError::Validation(messages.join("; "))
    }
}
