use std::fmt;

use crate::error::RegistryResult;
use crate::types::Timestamp;

/// Logical tables the registry and tracker persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    /// Credential id → `Credential`.
    Credentials,
    /// Credential id → current holder `Identity`.
    Ownership,
    /// Named counters (`last_credential_id`).
    Counters,
    /// Course id → `CourseRequirements`.
    CourseRequirements,
    /// (course, student) → `StudentProgress`.
    StudentProgress,
    /// (course, student) → `IssuedCredentialRecord`.
    IssuedCredentials,
}

impl Table {
    /// Every table, in a stable order.
    pub const ALL: [Table; 6] = [
        Table::Credentials,
        Table::Ownership,
        Table::Counters,
        Table::CourseRequirements,
        Table::StudentProgress,
        Table::IssuedCredentials,
    ];

    /// Stable name, used as the column family name by persistent backends.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Ownership => "ownership",
            Self::Counters => "counters",
            Self::CourseRequirements => "course_requirements",
            Self::StudentProgress => "student_progress",
            Self::IssuedCredentials => "issued_credentials",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put {
        table: Table,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        table: Table,
        key: Vec<u8>,
    },
}

/// An ordered group of mutations applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a put.
    pub fn put(&mut self, table: Table, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Put {
            table,
            key: key.into(),
            value: value.into(),
        });
    }

    /// Queue a delete.
    pub fn delete(&mut self, table: Table, key: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Delete {
            table,
            key: key.into(),
        });
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Key-value persistence for the registry tables.
///
/// Implementations must apply [`Storage::write`] atomically: either every
/// operation in the batch becomes visible or none does.
pub trait Storage: Send + Sync {
    /// Read a value.
    fn get(&self, table: Table, key: &[u8]) -> RegistryResult<Option<Vec<u8>>>;

    /// Write a single value.
    fn put(&self, table: Table, key: &[u8], value: &[u8]) -> RegistryResult<()>;

    /// Delete a single key. Deleting a missing key is not an error.
    fn delete(&self, table: Table, key: &[u8]) -> RegistryResult<()>;

    /// All entries of a table, ordered by key.
    fn scan(&self, table: Table) -> RegistryResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Apply a batch atomically.
    fn write(&self, batch: WriteBatch) -> RegistryResult<()>;
}

/// Source of the current time for issue dates and expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
