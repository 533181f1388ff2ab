use serde::{Deserialize, Serialize};

use crate::types::Identity;

/// Authorization policy for the registry and eligibility tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Only the issuing institution may revoke a credential.
    #[serde(default = "default_true")]
    pub restrict_revocation_to_issuer: bool,
    /// `complete_requirement` fails for courses with no requirement list.
    #[serde(default = "default_true")]
    pub require_configured_course: bool,
    /// Identities allowed to configure courses. Empty allows any caller to
    /// claim an unconfigured course.
    #[serde(default)]
    pub course_authorities: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            restrict_revocation_to_issuer: true,
            require_configured_course: true,
            course_authorities: Vec::new(),
        }
    }
}

impl PolicyConfig {
    /// Whether `identity` may configure courses at all.
    pub fn is_course_authority(&self, identity: &Identity) -> bool {
        self.course_authorities.is_empty()
            || self
                .course_authorities
                .iter()
                .any(|a| a == identity.as_str())
    }
}
