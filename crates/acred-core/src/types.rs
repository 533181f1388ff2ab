use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in time used for issue and expiration dates.
pub type Timestamp = DateTime<Utc>;

/// An account identity (institution, student, or holder).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    /// Create an identity from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identity is empty or whitespace only (never a valid participant).
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The authenticated sender of the current operation.
///
/// Supplied by the transaction layer on every call; the registry never
/// derives it from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller(Identity);

impl Caller {
    /// Wrap an identity that the surrounding layer has authenticated.
    pub fn new(identity: impl Into<Identity>) -> Self {
        Self(identity.into())
    }

    /// The caller's identity.
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry-assigned credential identifier. Starts at 1, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CredentialId(pub u64);

impl CredentialId {
    /// The raw numeric id.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Big-endian key bytes; preserves numeric order in ordered stores.
    pub fn to_key(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode from key bytes produced by [`CredentialId::to_key`].
    pub fn from_key(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(raw)))
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

impl From<u64> for CredentialId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// An issued academic credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Registry id.
    pub id: CredentialId,
    /// Identity that issued the credential.
    pub institution: Identity,
    /// Original recipient. Transfers change the holder, not this field.
    pub student: Identity,
    /// Kind of credential (e.g. "degree", "certificate").
    pub credential_type: String,
    /// Course the credential was awarded for.
    pub course: String,
    /// When the credential was issued.
    pub issue_date: Timestamp,
    /// `None` means the credential never expires.
    pub expiration_date: Option<Timestamp>,
    /// Opaque pointer to off-registry metadata.
    pub metadata_uri: String,
}

impl Credential {
    /// Whether the credential has expired at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiration_date.is_some_and(|exp| now > exp)
    }
}

/// Requirement list configured for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRequirements {
    /// Ordered requirement names. Duplicates are counted individually.
    pub requirements: Vec<String>,
    /// Identity that configured the course and may replace the list.
    pub authority: Identity,
}

/// Requirements a student has completed for one course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProgress {
    /// Distinct requirement names, in completion order.
    pub completed_requirements: Vec<String>,
}

impl StudentProgress {
    /// Record a completed requirement. Returns `false` if it was already present.
    pub fn record(&mut self, requirement: &str) -> bool {
        if self.contains(requirement) {
            return false;
        }
        self.completed_requirements.push(requirement.to_string());
        true
    }

    /// Whether `requirement` has been completed.
    pub fn contains(&self, requirement: &str) -> bool {
        self.completed_requirements.iter().any(|r| r == requirement)
    }

    /// Number of distinct completed requirements.
    pub fn len(&self) -> usize {
        self.completed_requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed_requirements.is_empty()
    }
}

/// The eligibility tracker's record of an automatic issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCredentialRecord {
    pub credential_type: String,
    pub issue_date: Timestamp,
    /// Registry id of the credential that was issued.
    pub credential_id: CredentialId,
}
