use std::fmt;

use crate::credential_state::CredentialState;

/// Convenience alias for registry results.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry and eligibility errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("credential already issued for course {course} to {student}")]
    AlreadyIssued { course: String, student: String },

    #[error("not eligible: {completed} of {required} requirements completed")]
    NotEligible { completed: usize, required: usize },

    #[error("invalid course: {0}")]
    InvalidCourse(String),

    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: CredentialState,
        to: CredentialState,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fieldless category of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unauthorized,
    AlreadyIssued,
    NotEligible,
    InvalidCourse,
    InvalidStateTransition,
    Storage,
    Serialization,
}

impl RegistryError {
    /// The category of this error, without its message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::AlreadyIssued { .. } => ErrorKind::AlreadyIssued,
            Self::NotEligible { .. } => ErrorKind::NotEligible,
            Self::InvalidCourse(_) => ErrorKind::InvalidCourse,
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidInput => "InvalidInput",
            Self::NotFound => "NotFound",
            Self::Unauthorized => "Unauthorized",
            Self::AlreadyIssued => "AlreadyIssued",
            Self::NotEligible => "NotEligible",
            Self::InvalidCourse => "InvalidCourse",
            Self::InvalidStateTransition => "InvalidStateTransition",
            Self::Storage => "Storage",
            Self::Serialization => "Serialization",
        };
        write!(f, "{}", name)
    }
}
