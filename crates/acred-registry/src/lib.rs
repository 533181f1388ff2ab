//! Acred Registry — Credential registry, prerequisite-gated eligibility
//! tracker, and the in-memory storage and clock collaborators.

pub mod clock;
pub mod eligibility;
pub mod keys;
pub mod ledger;
pub mod memory;
pub mod registry;

pub use clock::{FixedClock, SystemClock};
pub use eligibility::EligibilityTracker;
pub use ledger::Ledger;
pub use memory::InMemoryStorage;
pub use registry::{CredentialRegistry, IssueRequest};
