use std::fmt;

use crate::error::RegistryError;

/// The states of a registry credential id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CredentialState {
    /// The id has never been assigned.
    Nonexistent,
    /// The credential record and its ownership entry exist.
    Active,
    /// The credential was revoked. Final state; the id is never reused.
    Revoked,
}

impl CredentialState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Whether a credential in this state can be read, transferred or revoked.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nonexistent => write!(f, "Nonexistent"),
            Self::Active => write!(f, "Active"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Events that trigger credential state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// An institution issues the credential.
    Issue,
    /// The issuing institution revokes the credential.
    Revoke,
}

/// Credential lifecycle rules.
///
/// Valid transitions:
/// - Nonexistent → Active (Issue)
/// - Active → Revoked (Revoke)
///
/// Transfers change the holder only and leave the state untouched.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(
        current: CredentialState,
        event: CredentialEvent,
    ) -> Result<CredentialState, RegistryError> {
        let new_state = match (current, event) {
            (CredentialState::Nonexistent, CredentialEvent::Issue) => CredentialState::Active,
            (CredentialState::Active, CredentialEvent::Revoke) => CredentialState::Revoked,
            _ => {
                let target = match event {
                    CredentialEvent::Issue => CredentialState::Active,
                    CredentialEvent::Revoke => CredentialState::Revoked,
                };
                return Err(RegistryError::InvalidStateTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "credential state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialState, event: CredentialEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
