//! Integration test: credential registry lifecycle.
//!
//! Issue → lookup → transfer → revoke across acred-core and acred-registry,
//! with the ownership and id invariants checked along the way.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use acred_core::{
    Caller, CredentialId, CredentialState, ErrorKind, Identity, PolicyConfig, Storage, Table,
};
use acred_registry::{FixedClock, InMemoryStorage, IssueRequest, Ledger};

const CONTRACT_OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const STUDENT: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
const INSTITUTION: &str = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0";

/// Helper: a ledger over fresh in-memory storage, returning the storage for
/// table-level assertions.
fn create_ledger() -> (Ledger, Arc<InMemoryStorage>) {
    let storage = Arc::new(InMemoryStorage::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap(),
    ));
    let ledger = Ledger::new(storage.clone(), clock, PolicyConfig::default());
    (ledger, storage)
}

fn computer_science_degree() -> IssueRequest {
    IssueRequest::new(STUDENT, "degree", "Computer Science")
        .with_metadata_uri("https://example.com/metadata")
}

// =========================================================================
// Issuance and lookup
// =========================================================================

#[test]
fn test_issue_and_read_back() {
    let (mut ledger, storage) = create_ledger();
    let owner = Caller::new(CONTRACT_OWNER);

    let id = ledger
        .issue_credential(&owner, computer_science_degree())
        .expect("issuance should succeed");
    assert_eq!(id, CredentialId(1));
    assert_eq!(storage.count(Table::Credentials).unwrap(), 1);
    assert_eq!(storage.count(Table::Ownership).unwrap(), 1);

    let cred = ledger.get_credential_metadata(id).unwrap();
    assert_eq!(cred.institution, Identity::new(CONTRACT_OWNER));
    assert_eq!(cred.student, Identity::new(STUDENT));
    assert_eq!(cred.credential_type, "degree");
    assert_eq!(cred.course, "Computer Science");
    assert_eq!(cred.expiration_date, None);
    assert_eq!(cred.metadata_uri, "https://example.com/metadata");
    assert_eq!(
        ledger.registry().owner_of(id).unwrap(),
        Identity::new(STUDENT)
    );
}

#[test]
fn test_every_active_credential_has_one_owner() {
    let (mut ledger, storage) = create_ledger();
    let owner = Caller::new(CONTRACT_OWNER);
    for _ in 0..4 {
        ledger
            .issue_credential(&owner, computer_science_degree())
            .unwrap();
    }
    ledger.revoke_credential(&owner, CredentialId(2)).unwrap();

    let credentials = storage.scan(Table::Credentials).unwrap();
    let ownership = storage.scan(Table::Ownership).unwrap();
    let cred_keys: Vec<_> = credentials.into_iter().map(|(k, _)| k).collect();
    let owner_keys: Vec<_> = ownership.into_iter().map(|(k, _)| k).collect();
    assert_eq!(cred_keys, owner_keys);
    assert_eq!(cred_keys.len(), 3);
}

// =========================================================================
// Id monotonicity
// =========================================================================

#[test]
fn test_ids_strictly_increasing_across_revocations() {
    let (mut ledger, _) = create_ledger();
    let owner = Caller::new(CONTRACT_OWNER);

    let mut last = 0;
    for round in 0..6 {
        let id = ledger
            .issue_credential(&owner, computer_science_degree())
            .unwrap();
        assert!(id.value() > last, "id {} not above {}", id, last);
        last = id.value();
        if round % 2 == 0 {
            ledger.revoke_credential(&owner, id).unwrap();
        }
    }
    assert_eq!(last, 6);
    assert_eq!(ledger.registry().last_credential_id().unwrap(), 6);
}

// =========================================================================
// Revocation
// =========================================================================

#[test]
fn test_revoke_then_lookup_and_transfer_fail() {
    let (mut ledger, storage) = create_ledger();
    let owner = Caller::new(CONTRACT_OWNER);
    let id = ledger
        .issue_credential(&owner, computer_science_degree())
        .unwrap();
    assert_eq!(id, CredentialId(1));

    ledger.revoke_credential(&owner, id).unwrap();
    assert_eq!(storage.count(Table::Credentials).unwrap(), 0);
    assert_eq!(storage.count(Table::Ownership).unwrap(), 0);

    assert_eq!(
        ledger.get_credential_metadata(id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    let student = Identity::new(STUDENT);
    assert_eq!(
        ledger
            .transfer(&Caller::new(STUDENT), id, &student, &Identity::new(INSTITUTION))
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ledger.registry().credential_state(id).unwrap(),
        CredentialState::Revoked
    );
}

#[test]
fn test_failed_revocation_changes_nothing() {
    let (mut ledger, storage) = create_ledger();
    let id = ledger
        .issue_credential(&Caller::new(CONTRACT_OWNER), computer_science_degree())
        .unwrap();

    let err = ledger
        .revoke_credential(&Caller::new(INSTITUTION), id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(storage.count(Table::Credentials).unwrap(), 1);
    assert_eq!(storage.count(Table::Ownership).unwrap(), 1);
}

// =========================================================================
// Transfer
// =========================================================================

#[test]
fn test_transfer_then_former_holder_refused() {
    let (mut ledger, _) = create_ledger();
    let id = ledger
        .issue_credential(&Caller::new(CONTRACT_OWNER), computer_science_degree())
        .unwrap();
    let student = Identity::new(STUDENT);
    let institution = Identity::new(INSTITUTION);

    ledger
        .transfer(&Caller::new(STUDENT), id, &student, &institution)
        .expect("holder may transfer");
    assert_eq!(ledger.registry().owner_of(id).unwrap(), institution);

    let err = ledger
        .transfer(
            &Caller::new(STUDENT),
            id,
            &student,
            &Identity::new("ST-SOMEONE-ELSE"),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(ledger.registry().owner_of(id).unwrap(), institution);
}

#[test]
fn test_transfer_authorization_matrix() {
    let parties = [STUDENT, INSTITUTION, CONTRACT_OWNER];

    for caller in parties {
        for from in parties {
            let (mut ledger, _) = create_ledger();
            let id = ledger
                .issue_credential(&Caller::new(CONTRACT_OWNER), computer_science_degree())
                .unwrap();

            let result = ledger.transfer(
                &Caller::new(caller),
                id,
                &Identity::new(from),
                &Identity::new("ST-RECIPIENT"),
            );
            if caller == STUDENT && from == STUDENT {
                assert!(result.is_ok());
            } else {
                assert_eq!(
                    result.unwrap_err().kind(),
                    ErrorKind::Unauthorized,
                    "caller={} from={}",
                    caller,
                    from
                );
            }
        }
    }
}

#[test]
fn test_new_holder_can_transfer_onward() {
    let (mut ledger, _) = create_ledger();
    let id = ledger
        .issue_credential(&Caller::new(CONTRACT_OWNER), computer_science_degree())
        .unwrap();
    let student = Identity::new(STUDENT);
    let institution = Identity::new(INSTITUTION);

    ledger
        .transfer(&Caller::new(STUDENT), id, &student, &institution)
        .unwrap();
    ledger
        .transfer(&Caller::new(INSTITUTION), id, &institution, &student)
        .unwrap();
    assert_eq!(ledger.registry().owner_of(id).unwrap(), student);
    assert_eq!(
        ledger.registry().credentials_held_by(&student).unwrap(),
        vec![id]
    );
}
