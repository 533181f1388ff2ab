//! Key encoding and typed value access over a [`Storage`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use acred_core::{Identity, RegistryResult, Storage, Table, WriteBatch};

/// Counter key for the last assigned credential id.
pub const LAST_CREDENTIAL_ID: &[u8] = b"last_credential_id";

/// Key for a (course, student) pair.
///
/// The course is length-prefixed so that distinct pairs never share a key,
/// even when the course or student contains arbitrary bytes.
pub fn course_student_key(course: &str, student: &Identity) -> Vec<u8> {
    let course = course.as_bytes();
    let student = student.as_str().as_bytes();
    let mut key = Vec::with_capacity(8 + course.len() + student.len());
    key.extend_from_slice(&(course.len() as u64).to_be_bytes());
    key.extend_from_slice(course);
    key.extend_from_slice(student);
    key
}

/// Read and decode a JSON value.
pub fn get_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    table: Table,
    key: &[u8],
) -> RegistryResult<Option<T>> {
    match storage.get(table, key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode a JSON value into a batch.
pub fn put_json<T: Serialize>(
    batch: &mut WriteBatch,
    table: Table,
    key: impl Into<Vec<u8>>,
    value: &T,
) -> RegistryResult<()> {
    batch.put(table, key, serde_json::to_vec(value)?);
    Ok(())
}

/// Read the last assigned credential id (0 before the first issuance).
pub fn read_counter(storage: &dyn Storage) -> RegistryResult<u64> {
    Ok(get_json::<u64>(storage, Table::Counters, LAST_CREDENTIAL_ID)?.unwrap_or(0))
}
