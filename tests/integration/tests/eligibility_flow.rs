//! Integration test: prerequisite-gated issuance.
//!
//! Course configuration → requirement completion → automatic issuance,
//! through the `Ledger` facade and the lock-serialized `CredentialNode`.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use acred_core::{Caller, CredentialId, ErrorKind, Identity, PolicyConfig, RegistryError};
use acred_node::{CredentialNode, NodeConfig};
use acred_registry::{FixedClock, InMemoryStorage, Ledger};

const CONTRACT_OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const STUDENT: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

fn create_ledger(clock: Arc<FixedClock>) -> Ledger {
    Ledger::new(
        Arc::new(InMemoryStorage::new()),
        clock,
        PolicyConfig::default(),
    )
}

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap(),
    ))
}

// =========================================================================
// The CS101 scenario
// =========================================================================

#[test]
fn test_cs101_partial_then_complete() {
    let clock = fixed_clock();
    let mut ledger = create_ledger(clock.clone());
    let owner = Caller::new(CONTRACT_OWNER);
    let student = Caller::new(STUDENT);

    ledger
        .set_course_requirements(&owner, "CS101", ["a", "b", "c"])
        .unwrap();
    ledger.complete_requirement(&student, "CS101", "a").unwrap();

    let err = ledger
        .issue_credential_if_eligible(&student, "CS101", "certificate")
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::NotEligible {
            completed: 1,
            required: 3
        }
    ));

    clock.advance(Duration::days(30));
    ledger.complete_requirement(&student, "CS101", "b").unwrap();
    ledger.complete_requirement(&student, "CS101", "c").unwrap();

    let id = ledger
        .issue_credential_if_eligible(&student, "CS101", "certificate")
        .unwrap();
    assert_eq!(id, CredentialId(1));

    let record = ledger
        .get_issued_credential(student.identity(), "CS101")
        .unwrap();
    assert_eq!(record.credential_type, "certificate");
    assert_eq!(
        record.issue_date,
        Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap() + Duration::days(30)
    );

    let credential = ledger.get_credential_metadata(id).unwrap();
    assert_eq!(credential.course, "CS101");
    assert_eq!(credential.institution, Identity::new(CONTRACT_OWNER));
}

#[test]
fn test_eligibility_issuance_exactly_once() {
    let mut ledger = create_ledger(fixed_clock());
    let owner = Caller::new(CONTRACT_OWNER);
    let student = Caller::new(STUDENT);

    ledger
        .set_course_requirements(&owner, "CS101", ["assignment1", "assignment2", "final-exam"])
        .unwrap();
    for req in ["assignment1", "assignment2", "final-exam"] {
        ledger.complete_requirement(&student, "CS101", req).unwrap();
    }

    assert!(ledger
        .issue_credential_if_eligible(&student, "CS101", "certificate")
        .is_ok());
    for _ in 0..3 {
        assert_eq!(
            ledger
                .issue_credential_if_eligible(&student, "CS101", "certificate")
                .unwrap_err()
                .kind(),
            ErrorKind::AlreadyIssued
        );
    }
    assert_eq!(ledger.registry().last_credential_id().unwrap(), 1);
}

#[test]
fn test_complete_requirement_idempotent() {
    let mut ledger = create_ledger(fixed_clock());
    let student = Caller::new(STUDENT);
    ledger
        .set_course_requirements(&Caller::new(CONTRACT_OWNER), "CS101", ["a", "b"])
        .unwrap();

    ledger.complete_requirement(&student, "CS101", "a").unwrap();
    let once = ledger
        .get_student_progress(student.identity(), "CS101")
        .unwrap();
    ledger.complete_requirement(&student, "CS101", "a").unwrap();
    let twice = ledger
        .get_student_progress(student.identity(), "CS101")
        .unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.completed_requirements, vec!["a"]);
}

#[test]
fn test_students_tracked_independently() {
    let mut ledger = create_ledger(fixed_clock());
    let alice = Caller::new("alice");
    let bob = Caller::new("bob");
    ledger
        .set_course_requirements(&Caller::new(CONTRACT_OWNER), "CS101", ["a"])
        .unwrap();

    ledger.complete_requirement(&alice, "CS101", "a").unwrap();
    let alice_id = ledger
        .issue_credential_if_eligible(&alice, "CS101", "certificate")
        .unwrap();

    assert_eq!(
        ledger
            .issue_credential_if_eligible(&bob, "CS101", "certificate")
            .unwrap_err()
            .kind(),
        ErrorKind::NotEligible
    );
    ledger.complete_requirement(&bob, "CS101", "a").unwrap();
    let bob_id = ledger
        .issue_credential_if_eligible(&bob, "CS101", "certificate")
        .unwrap();
    assert!(bob_id > alice_id);
}

#[test]
fn test_auto_issued_credential_is_transferable() {
    let mut ledger = create_ledger(fixed_clock());
    let student = Caller::new(STUDENT);
    ledger
        .set_course_requirements(&Caller::new(CONTRACT_OWNER), "CS101", ["a"])
        .unwrap();
    ledger.complete_requirement(&student, "CS101", "a").unwrap();
    let id = ledger
        .issue_credential_if_eligible(&student, "CS101", "certificate")
        .unwrap();

    let employer = Identity::new("employer");
    ledger
        .transfer(&student, id, student.identity(), &employer)
        .unwrap();
    assert_eq!(ledger.registry().owner_of(id).unwrap(), employer);
}

// =========================================================================
// Through the node host
// =========================================================================

#[test]
fn test_node_scenario_in_memory() {
    let node = CredentialNode::open(NodeConfig::in_memory()).unwrap();
    let owner = Caller::new(CONTRACT_OWNER);
    let student = Caller::new(STUDENT);

    node.set_course_requirements(&owner, "CS101", vec!["a".into(), "b".into()])
        .unwrap();
    assert_eq!(node.get_course_requirements("CS101").unwrap(), vec!["a", "b"]);

    node.complete_requirement(&student, "CS101", "a").unwrap();
    assert!(!node.is_eligible(student.identity(), "CS101").unwrap());
    node.complete_requirement(&student, "CS101", "b").unwrap();
    assert!(node.is_eligible(student.identity(), "CS101").unwrap());

    let id = node
        .issue_credential_if_eligible(&student, "CS101", "certificate")
        .unwrap();
    assert!(node.is_valid(id).unwrap());
    assert_eq!(
        node.credentials_held_by(student.identity()).unwrap(),
        vec![id]
    );

    node.revoke_credential(&owner, id).unwrap();
    assert!(!node.is_valid(id).unwrap());
    assert_eq!(
        node.get_credential_metadata(id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
