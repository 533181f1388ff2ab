use std::sync::Arc;

use acred_core::{
    Caller, Clock, Credential, CredentialEvent, CredentialId, CredentialState,
    CredentialStateMachine, Identity, PolicyConfig, RegistryError, RegistryResult, Storage, Table,
    Timestamp, WriteBatch,
};

use crate::keys::{self, get_json, put_json, read_counter};

/// Arguments for [`CredentialRegistry::issue_credential`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// Recipient and initial holder.
    pub student: Identity,
    pub credential_type: String,
    pub course: String,
    /// `None` for a non-expiring credential.
    pub expiration_date: Option<Timestamp>,
    /// May be empty.
    pub metadata_uri: String,
}

impl IssueRequest {
    /// A non-expiring credential with no metadata URI.
    pub fn new(
        student: impl Into<Identity>,
        credential_type: impl Into<String>,
        course: impl Into<String>,
    ) -> Self {
        Self {
            student: student.into(),
            credential_type: credential_type.into(),
            course: course.into(),
            expiration_date: None,
            metadata_uri: String::new(),
        }
    }

    pub fn with_expiration(mut self, expiration: Timestamp) -> Self {
        self.expiration_date = Some(expiration);
        self
    }

    pub fn with_metadata_uri(mut self, uri: impl Into<String>) -> Self {
        self.metadata_uri = uri.into();
        self
    }

    fn validate(&self) -> RegistryResult<()> {
        if self.student.is_blank() {
            return Err(RegistryError::InvalidInput("student must not be empty".into()));
        }
        if self.credential_type.trim().is_empty() {
            return Err(RegistryError::InvalidInput(
                "credential_type must not be empty".into(),
            ));
        }
        if self.course.trim().is_empty() {
            return Err(RegistryError::InvalidInput("course must not be empty".into()));
        }
        Ok(())
    }
}

/// Credential table plus NFT-style ownership table.
///
/// Ids are assigned from a persistent counter starting at 1 and are never
/// reused. Revocation deletes the credential and its ownership entry in one
/// atomic batch.
pub struct CredentialRegistry {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    policy: PolicyConfig,
}

impl CredentialRegistry {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, policy: PolicyConfig) -> Self {
        Self {
            storage,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Whether `storage` is the same store this registry writes to.
    pub(crate) fn shares_storage(&self, storage: &Arc<dyn Storage>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.storage), Arc::as_ptr(storage))
    }

    /// Issue a credential. The caller becomes the institution of record and
    /// the student the first holder.
    pub fn issue_credential(
        &mut self,
        caller: &Caller,
        request: IssueRequest,
    ) -> RegistryResult<CredentialId> {
        let mut batch = WriteBatch::new();
        let credential = self.stage_issue(&mut batch, caller.identity(), request)?;
        self.storage.write(batch)?;

        tracing::info!(
            credential_id = %credential.id,
            institution = %credential.institution,
            student = %credential.student,
            course = %credential.course,
            "credential issued"
        );

        Ok(credential.id)
    }

    /// Queue the writes for a new credential without committing them.
    ///
    /// The counter is read from storage, so only one staged issuance may be
    /// in flight per batch.
    pub(crate) fn stage_issue(
        &self,
        batch: &mut WriteBatch,
        institution: &Identity,
        request: IssueRequest,
    ) -> RegistryResult<Credential> {
        request.validate()?;

        let next = read_counter(self.storage.as_ref())?
            .checked_add(1)
            .ok_or_else(|| RegistryError::Storage("credential id counter overflow".into()))?;
        let id = CredentialId(next);
        CredentialStateMachine::transition(self.credential_state(id)?, CredentialEvent::Issue)?;

        let credential = Credential {
            id,
            institution: institution.clone(),
            student: request.student,
            credential_type: request.credential_type,
            course: request.course,
            issue_date: self.clock.now(),
            expiration_date: request.expiration_date,
            metadata_uri: request.metadata_uri,
        };

        put_json(batch, Table::Credentials, id.to_key(), &credential)?;
        put_json(batch, Table::Ownership, id.to_key(), &credential.student)?;
        put_json(batch, Table::Counters, keys::LAST_CREDENTIAL_ID, &next)?;

        Ok(credential)
    }

    /// Look up an active credential.
    pub fn get_credential_metadata(&self, id: CredentialId) -> RegistryResult<Credential> {
        get_json(self.storage.as_ref(), Table::Credentials, &id.to_key())?
            .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))
    }

    /// Revoke a credential, removing the record and its ownership entry.
    pub fn revoke_credential(&mut self, caller: &Caller, id: CredentialId) -> RegistryResult<()> {
        CredentialStateMachine::transition(self.credential_state(id)?, CredentialEvent::Revoke)
            .map_err(|_| RegistryError::NotFound(format!("credential {}", id)))?;
        let credential = self.get_credential_metadata(id)?;

        if self.policy.restrict_revocation_to_issuer && caller.identity() != &credential.institution
        {
            tracing::warn!(
                credential_id = %id,
                caller = %caller,
                institution = %credential.institution,
                "revocation refused: caller is not the issuing institution"
            );
            return Err(RegistryError::Unauthorized(format!(
                "{} did not issue credential {}",
                caller, id
            )));
        }

        let mut batch = WriteBatch::new();
        batch.delete(Table::Credentials, id.to_key());
        batch.delete(Table::Ownership, id.to_key());
        self.storage.write(batch)?;

        tracing::info!(credential_id = %id, revoked_by = %caller, "credential revoked");
        Ok(())
    }

    /// Move a credential from its current holder to `to`.
    ///
    /// Only the current holder may initiate, and `from` must name them.
    /// Transferring to oneself succeeds without changing anything.
    pub fn transfer(
        &mut self,
        caller: &Caller,
        id: CredentialId,
        from: &Identity,
        to: &Identity,
    ) -> RegistryResult<()> {
        let holder = self.owner_of(id)?;

        if &holder != from || caller.identity() != from {
            tracing::warn!(
                credential_id = %id,
                caller = %caller,
                from = %from,
                "transfer refused: caller is not the current holder"
            );
            return Err(RegistryError::Unauthorized(format!(
                "{} is not the holder of credential {}",
                caller, id
            )));
        }

        let mut batch = WriteBatch::new();
        put_json(&mut batch, Table::Ownership, id.to_key(), to)?;
        self.storage.write(batch)?;

        tracing::info!(credential_id = %id, from = %from, to = %to, "credential transferred");
        Ok(())
    }

    /// Current holder of an active credential.
    pub fn owner_of(&self, id: CredentialId) -> RegistryResult<Identity> {
        get_json(self.storage.as_ref(), Table::Ownership, &id.to_key())?
            .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))
    }

    /// Metadata URI of an active credential.
    pub fn token_uri(&self, id: CredentialId) -> RegistryResult<String> {
        Ok(self.get_credential_metadata(id)?.metadata_uri)
    }

    /// Highest id assigned so far; 0 before the first issuance.
    pub fn last_credential_id(&self) -> RegistryResult<u64> {
        read_counter(self.storage.as_ref())
    }

    /// Lifecycle state of an id.
    pub fn credential_state(&self, id: CredentialId) -> RegistryResult<CredentialState> {
        if self
            .storage
            .get(Table::Credentials, &id.to_key())?
            .is_some()
        {
            return Ok(CredentialState::Active);
        }
        if id.value() >= 1 && id.value() <= self.last_credential_id()? {
            Ok(CredentialState::Revoked)
        } else {
            Ok(CredentialState::Nonexistent)
        }
    }

    /// Active credentials currently held by `holder`, ascending by id.
    pub fn credentials_held_by(&self, holder: &Identity) -> RegistryResult<Vec<CredentialId>> {
        let mut held = Vec::new();
        for (key, value) in self.storage.scan(Table::Ownership)? {
            let id = CredentialId::from_key(&key).ok_or_else(|| {
                RegistryError::Storage(format!("malformed ownership key: {:?}", key))
            })?;
            let owner: Identity = serde_json::from_slice(&value)?;
            if &owner == holder {
                held.push(id);
            }
        }
        held.sort();
        Ok(held)
    }

    /// Whether the credential is active and not expired at the current time.
    pub fn is_valid(&self, id: CredentialId) -> RegistryResult<bool> {
        match self.get_credential_metadata(id) {
            Ok(credential) => Ok(!credential.is_expired(self.clock.now())),
            Err(RegistryError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
