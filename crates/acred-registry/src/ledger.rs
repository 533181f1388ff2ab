use std::sync::Arc;

use acred_core::{
    Caller, Clock, Credential, CredentialId, Identity, IssuedCredentialRecord, PolicyConfig,
    RegistryResult, Storage, StudentProgress,
};

use crate::eligibility::EligibilityTracker;
use crate::registry::{CredentialRegistry, IssueRequest};

/// A registry and eligibility tracker over one shared store.
///
/// Every mutating call takes `&mut self`, so a single owner executes
/// operations one at a time. Hosts serving concurrent callers wrap the
/// ledger in a lock.
pub struct Ledger {
    registry: CredentialRegistry,
    tracker: EligibilityTracker,
}

impl Ledger {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, policy: PolicyConfig) -> Self {
        let registry = CredentialRegistry::new(storage.clone(), clock, policy.clone());
        let tracker = EligibilityTracker::new(storage, policy);
        Self { registry, tracker }
    }

    pub fn registry(&self) -> &CredentialRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &EligibilityTracker {
        &self.tracker
    }

    // -- CredentialRegistry --

    pub fn issue_credential(
        &mut self,
        caller: &Caller,
        request: IssueRequest,
    ) -> RegistryResult<CredentialId> {
        self.registry.issue_credential(caller, request)
    }

    pub fn get_credential_metadata(&self, id: CredentialId) -> RegistryResult<Credential> {
        self.registry.get_credential_metadata(id)
    }

    pub fn revoke_credential(&mut self, caller: &Caller, id: CredentialId) -> RegistryResult<()> {
        self.registry.revoke_credential(caller, id)
    }

    pub fn transfer(
        &mut self,
        caller: &Caller,
        id: CredentialId,
        from: &Identity,
        to: &Identity,
    ) -> RegistryResult<()> {
        self.registry.transfer(caller, id, from, to)
    }

    // -- EligibilityTracker --

    pub fn set_course_requirements<I, S>(
        &mut self,
        caller: &Caller,
        course_id: &str,
        requirements: I,
    ) -> RegistryResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracker
            .set_course_requirements(caller, course_id, requirements)
    }

    pub fn complete_requirement(
        &mut self,
        caller: &Caller,
        course_id: &str,
        requirement: &str,
    ) -> RegistryResult<()> {
        self.tracker.complete_requirement(caller, course_id, requirement)
    }

    pub fn issue_credential_if_eligible(
        &mut self,
        caller: &Caller,
        course_id: &str,
        credential_type: &str,
    ) -> RegistryResult<CredentialId> {
        self.tracker.issue_credential_if_eligible(
            &mut self.registry,
            caller,
            course_id,
            credential_type,
        )
    }

    pub fn get_course_requirements(&self, course_id: &str) -> RegistryResult<Vec<String>> {
        self.tracker.get_course_requirements(course_id)
    }

    pub fn get_student_progress(
        &self,
        student: &Identity,
        course_id: &str,
    ) -> RegistryResult<StudentProgress> {
        self.tracker.get_student_progress(student, course_id)
    }

    pub fn get_issued_credential(
        &self,
        student: &Identity,
        course_id: &str,
    ) -> RegistryResult<IssuedCredentialRecord> {
        self.tracker.get_issued_credential(student, course_id)
    }
}
