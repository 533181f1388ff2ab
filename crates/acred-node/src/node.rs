//! The Acred node: a ledger behind a lock, opened from configuration.

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};

use acred_core::{
    Caller, Clock, Credential, CredentialId, CredentialState, Identity, IssuedCredentialRecord,
    RegistryError, RegistryResult, Storage, StudentProgress,
};
use acred_registry::{InMemoryStorage, IssueRequest, Ledger, SystemClock};

use crate::config::{NodeConfig, StorageBackend};
use crate::storage::RocksStorage;

/// A shareable handle to one credential ledger.
///
/// Every call takes the ledger lock for its whole duration, so concurrent
/// callers observe the same single global ordering a lone caller would.
pub struct CredentialNode {
    config: NodeConfig,
    ledger: Mutex<Ledger>,
}

impl CredentialNode {
    /// Open the configured storage backend and build the ledger on it.
    pub fn open(config: NodeConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
            StorageBackend::Rocksdb => {
                let storage = RocksStorage::open(&config.storage.data_dir)?;
                tracing::info!(
                    path = %config.storage.data_dir.display(),
                    "storage initialized"
                );
                Arc::new(storage)
            }
        };
        Ok(Self::with_parts(storage, Arc::new(SystemClock), config))
    }

    /// Build a node over caller-supplied collaborators.
    pub fn with_parts(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        config: NodeConfig,
    ) -> Self {
        let ledger = Ledger::new(storage, clock, config.policy.clone());
        tracing::info!(
            backend = ?config.storage.backend,
            restrict_revocation = config.policy.restrict_revocation_to_issuer,
            "credential node ready"
        );
        Self {
            config,
            ledger: Mutex::new(ledger),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    fn ledger(&self) -> RegistryResult<MutexGuard<'_, Ledger>> {
        self.ledger
            .lock()
            .map_err(|e| RegistryError::Storage(format!("ledger lock poisoned: {}", e)))
    }

    pub fn issue_credential(
        &self,
        caller: &Caller,
        request: IssueRequest,
    ) -> RegistryResult<CredentialId> {
        self.ledger()?.issue_credential(caller, request)
    }

    pub fn get_credential_metadata(&self, id: CredentialId) -> RegistryResult<Credential> {
        self.ledger()?.get_credential_metadata(id)
    }

    pub fn revoke_credential(&self, caller: &Caller, id: CredentialId) -> RegistryResult<()> {
        self.ledger()?.revoke_credential(caller, id)
    }

    pub fn transfer(
        &self,
        caller: &Caller,
        id: CredentialId,
        from: &Identity,
        to: &Identity,
    ) -> RegistryResult<()> {
        self.ledger()?.transfer(caller, id, from, to)
    }

    pub fn owner_of(&self, id: CredentialId) -> RegistryResult<Identity> {
        self.ledger()?.registry().owner_of(id)
    }

    pub fn last_credential_id(&self) -> RegistryResult<u64> {
        self.ledger()?.registry().last_credential_id()
    }

    pub fn credential_state(&self, id: CredentialId) -> RegistryResult<CredentialState> {
        self.ledger()?.registry().credential_state(id)
    }

    pub fn credentials_held_by(&self, holder: &Identity) -> RegistryResult<Vec<CredentialId>> {
        self.ledger()?.registry().credentials_held_by(holder)
    }

    pub fn is_valid(&self, id: CredentialId) -> RegistryResult<bool> {
        self.ledger()?.registry().is_valid(id)
    }

    pub fn set_course_requirements(
        &self,
        caller: &Caller,
        course_id: &str,
        requirements: Vec<String>,
    ) -> RegistryResult<()> {
        self.ledger()?
            .set_course_requirements(caller, course_id, requirements)
    }

    pub fn complete_requirement(
        &self,
        caller: &Caller,
        course_id: &str,
        requirement: &str,
    ) -> RegistryResult<()> {
        self.ledger()?
            .complete_requirement(caller, course_id, requirement)
    }

    pub fn issue_credential_if_eligible(
        &self,
        caller: &Caller,
        course_id: &str,
        credential_type: &str,
    ) -> RegistryResult<CredentialId> {
        self.ledger()?
            .issue_credential_if_eligible(caller, course_id, credential_type)
    }

    pub fn is_eligible(&self, student: &Identity, course_id: &str) -> RegistryResult<bool> {
        self.ledger()?.tracker().is_eligible(student, course_id)
    }

    pub fn get_course_requirements(&self, course_id: &str) -> RegistryResult<Vec<String>> {
        self.ledger()?.get_course_requirements(course_id)
    }

    pub fn get_student_progress(
        &self,
        student: &Identity,
        course_id: &str,
    ) -> RegistryResult<StudentProgress> {
        self.ledger()?.get_student_progress(student, course_id)
    }

    pub fn get_issued_credential(
        &self,
        student: &Identity,
        course_id: &str,
    ) -> RegistryResult<IssuedCredentialRecord> {
        self.ledger()?.get_issued_credential(student, course_id)
    }
}
