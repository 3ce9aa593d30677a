// models/src/errors.rs

use std::io;

pub use thiserror::Error;

use crate::medical::AppointmentStatus;

#[derive(Debug, Error)]
pub enum RendezvousError {
    #[error("document {0} was not found")]
    NotFound(String),
    #[error("transition from {from} to {to} is not allowed")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Transaction error: {0}")]
    TransactionError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("An internal error occurred: {0}")]
    InternalError(String),

    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
}

impl RendezvousError {
    /// True for the "document does not exist" condition surfaced to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RendezvousError::NotFound(_))
    }
}

impl From<serde_json::Error> for RendezvousError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            RendezvousError::DeserializationError(format!("JSON decode error: {}", err))
        } else {
            RendezvousError::SerializationError(format!("JSON processing error: {}", err))
        }
    }
}

/// A validation error.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// An identifier is invalid (e.g., blank or malformed).
    #[error("identifier '{0}' is invalid")]
    InvalidIdentifier(String),
    /// An identifier has an invalid length.
    #[error("identifier has invalid length")]
    InvalidIdentifierLength,
    /// A reason is mandatory for this operation.
    #[error("a reason is required to {0}")]
    ReasonRequired(&'static str),
    /// Confirmed appointments must carry a doctor.
    #[error("appointment {0} has no assigned doctor")]
    MissingDoctor(String),
    /// The appointment is not in a state that accepts this operation.
    #[error("cannot {operation} an appointment in status {status}")]
    InvalidState {
        operation: &'static str,
        status: AppointmentStatus,
    },
    #[error("end time {end} must be after start time {start}")]
    InvalidTimeRange { start: String, end: String },
    #[error("invalid time slot: {0}")]
    InvalidTimeSlot(String),
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("unknown appointment status: {0}")]
    UnknownStatus(String),
    #[error("unknown appointment kind: {0}")]
    UnknownKind(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// A type alias for a `Result` that returns a `RendezvousError` on failure.
pub type RendezvousResult<T> = Result<T, RendezvousError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
