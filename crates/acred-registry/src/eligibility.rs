use std::sync::Arc;

use acred_core::{
    Caller, CourseRequirements, CredentialId, Identity, IssuedCredentialRecord, PolicyConfig,
    RegistryError, RegistryResult, Storage, StudentProgress, Table, WriteBatch,
};

use crate::keys::{course_student_key, get_json, put_json};
use crate::registry::{CredentialRegistry, IssueRequest};

/// Tracks course requirements and student progress, and issues a
/// credential through the [`CredentialRegistry`] once a student has
/// completed as many distinct requirements as the course lists.
///
/// The tracker must share the registry's storage: an eligibility issuance
/// commits the registry's writes and the tracker's record in one batch.
/// Issuing through a registry over a different store fails with
/// [`RegistryError::InvalidInput`].
pub struct EligibilityTracker {
    storage: Arc<dyn Storage>,
    policy: PolicyConfig,
}

impl EligibilityTracker {
    pub fn new(storage: Arc<dyn Storage>, policy: PolicyConfig) -> Self {
        Self { storage, policy }
    }

    /// Configure (or replace) a course's requirement list.
    ///
    /// The first caller to configure a course becomes its authority; later
    /// replacements must come from the same identity.
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
        if course_id.trim().is_empty() {
            return Err(RegistryError::InvalidInput("course id must not be empty".into()));
        }
        let requirements: Vec<String> = requirements.into_iter().map(Into::into).collect();
        if requirements.is_empty() {
            return Err(RegistryError::InvalidInput(format!(
                "course {} needs at least one requirement",
                course_id
            )));
        }
        if requirements.iter().any(|r| r.trim().is_empty()) {
            return Err(RegistryError::InvalidInput(
                "requirement names must not be empty".into(),
            ));
        }

        if !self.policy.is_course_authority(caller.identity()) {
            tracing::warn!(
                course = course_id,
                caller = %caller,
                "caller may not configure courses"
            );
            return Err(RegistryError::Unauthorized(format!(
                "{} may not configure courses",
                caller
            )));
        }
        if let Some(existing) = self.course(course_id)? {
            if &existing.authority != caller.identity() {
                tracing::warn!(
                    course = course_id,
                    caller = %caller,
                    authority = %existing.authority,
                    "course requirements change refused"
                );
                return Err(RegistryError::Unauthorized(format!(
                    "course {} is owned by {}",
                    course_id, existing.authority
                )));
            }
        }

        let count = requirements.len();
        let course = CourseRequirements {
            requirements,
            authority: caller.identity().clone(),
        };
        let mut batch = WriteBatch::new();
        put_json(
            &mut batch,
            Table::CourseRequirements,
            course_id.as_bytes(),
            &course,
        )?;
        self.storage.write(batch)?;

        tracing::info!(
            course = course_id,
            requirements = count,
            authority = %caller,
            "course requirements set"
        );
        Ok(())
    }

    /// Mark a requirement complete for the calling student. Repeating a
    /// requirement leaves progress unchanged.
    pub fn complete_requirement(
        &mut self,
        caller: &Caller,
        course_id: &str,
        requirement: &str,
    ) -> RegistryResult<()> {
        if course_id.trim().is_empty() || requirement.trim().is_empty() {
            return Err(RegistryError::InvalidInput(
                "course id and requirement name must not be empty".into(),
            ));
        }
        if self.policy.require_configured_course && self.course(course_id)?.is_none() {
            return Err(RegistryError::InvalidCourse(format!(
                "course {} has no requirements",
                course_id
            )));
        }

        let key = course_student_key(course_id, caller.identity());
        let mut progress: StudentProgress =
            get_json(self.storage.as_ref(), Table::StudentProgress, &key)?.unwrap_or_default();

        if !progress.record(requirement) {
            tracing::debug!(
                course = course_id,
                student = %caller,
                requirement,
                "requirement already completed"
            );
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        put_json(&mut batch, Table::StudentProgress, key, &progress)?;
        self.storage.write(batch)?;

        tracing::debug!(
            course = course_id,
            student = %caller,
            requirement,
            completed = progress.len(),
            "requirement completed"
        );
        Ok(())
    }

    /// Issue a credential to the calling student if they are eligible and
    /// have not received one for this course yet.
    ///
    /// The course authority is the institution of record.
    pub fn issue_credential_if_eligible(
        &mut self,
        registry: &mut CredentialRegistry,
        caller: &Caller,
        course_id: &str,
        credential_type: &str,
    ) -> RegistryResult<CredentialId> {
        if !registry.shares_storage(&self.storage) {
            return Err(RegistryError::InvalidInput(
                "eligibility tracker and credential registry use different storage".into(),
            ));
        }

        let course = self.course(course_id)?.ok_or_else(|| {
            RegistryError::InvalidCourse(format!("course {} has no requirements", course_id))
        })?;

        let key = course_student_key(course_id, caller.identity());
        if self.storage.get(Table::IssuedCredentials, &key)?.is_some() {
            return Err(RegistryError::AlreadyIssued {
                course: course_id.to_string(),
                student: caller.identity().to_string(),
            });
        }

        let completed = self.progress(caller.identity(), course_id)?.map_or(0, |p| p.len());
        let required = course.requirements.len();
        if completed != required {
            tracing::debug!(
                course = course_id,
                student = %caller,
                completed,
                required,
                "not eligible"
            );
            return Err(RegistryError::NotEligible {
                completed,
                required,
            });
        }

        let mut batch = WriteBatch::new();
        let credential = registry.stage_issue(
            &mut batch,
            &course.authority,
            IssueRequest::new(caller.identity().clone(), credential_type, course_id),
        )?;
        let record = IssuedCredentialRecord {
            credential_type: credential.credential_type.clone(),
            issue_date: credential.issue_date,
            credential_id: credential.id,
        };
        put_json(&mut batch, Table::IssuedCredentials, key, &record)?;
        self.storage.write(batch)?;

        tracing::info!(
            credential_id = %credential.id,
            course = course_id,
            student = %caller,
            institution = %course.authority,
            "credential issued on eligibility"
        );
        Ok(credential.id)
    }

    /// Whether `student` currently meets the course's requirement count.
    /// Unconfigured courses are never satisfied.
    pub fn is_eligible(&self, student: &Identity, course_id: &str) -> RegistryResult<bool> {
        let Some(course) = self.course(course_id)? else {
            return Ok(false);
        };
        let completed = self.progress(student, course_id)?.map_or(0, |p| p.len());
        Ok(completed == course.requirements.len())
    }

    /// The course's requirement list.
    pub fn get_course_requirements(&self, course_id: &str) -> RegistryResult<Vec<String>> {
        self.course(course_id)?
            .map(|c| c.requirements)
            .ok_or_else(|| RegistryError::NotFound(format!("course {}", course_id)))
    }

    /// Identity that configured the course.
    pub fn course_authority(&self, course_id: &str) -> RegistryResult<Identity> {
        self.course(course_id)?
            .map(|c| c.authority)
            .ok_or_else(|| RegistryError::NotFound(format!("course {}", course_id)))
    }

    /// Requirements `student` has completed for the course.
    pub fn get_student_progress(
        &self,
        student: &Identity,
        course_id: &str,
    ) -> RegistryResult<StudentProgress> {
        self.progress(student, course_id)?.ok_or_else(|| {
            RegistryError::NotFound(format!("progress of {} in course {}", student, course_id))
        })
    }

    /// The eligibility issuance record for `student` in the course.
    pub fn get_issued_credential(
        &self,
        student: &Identity,
        course_id: &str,
    ) -> RegistryResult<IssuedCredentialRecord> {
        let key = course_student_key(course_id, student);
        get_json(self.storage.as_ref(), Table::IssuedCredentials, &key)?.ok_or_else(|| {
            RegistryError::NotFound(format!(
                "issued credential for {} in course {}",
                student, course_id
            ))
        })
    }

    fn course(&self, course_id: &str) -> RegistryResult<Option<CourseRequirements>> {
        get_json(
            self.storage.as_ref(),
            Table::CourseRequirements,
            course_id.as_bytes(),
        )
    }

    fn progress(
        &self,
        student: &Identity,
        course_id: &str,
    ) -> RegistryResult<Option<StudentProgress>> {
        let key = course_student_key(course_id, student);
        get_json(self.storage.as_ref(), Table::StudentProgress, &key)
    }
}
