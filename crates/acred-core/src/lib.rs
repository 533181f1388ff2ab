//! Acred Core — Fundamental types, errors, lifecycle, and collaborator
//! traits for the Acred academic credential registry.

pub mod config;
pub mod credential_state;
pub mod error;
pub mod traits;
pub mod types;

pub use config::PolicyConfig;
pub use credential_state::{CredentialEvent, CredentialState, CredentialStateMachine};
pub use error::{ErrorKind, RegistryError, RegistryResult};
pub use traits::{Clock, Storage, Table, WriteBatch, WriteOp};
pub use types::{
    Caller, CourseRequirements, Credential, CredentialId, Identity, IssuedCredentialRecord,
    StudentProgress, Timestamp,
};
