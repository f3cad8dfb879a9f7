//! Key/value storage seam.
//!
//! The single-partition storage engine is an external collaborator; the
//! write path consumes it through [`KvStore`]. [`MemKvStore`] is the
//! ordered in-memory implementation used by tests and single-process
//! deployments, and [`PartLifecycle`] bridges topology notifications to
//! partition creation and teardown.

mod mem;

use crate::error::Result;
use crate::model::{PartId, ResultCode, SpaceId};

pub use mem::{MemKvStore, PartLifecycle};

/// Status of one KV operation. `KeyNotFound` is the distinguished
/// empty-result status callers may treat as non-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvStatus {
    Ok,
    KeyNotFound,
    PartNotFound,
    Busy,
    Corrupt,
}

impl KvStatus {
    /// Maps a write status to the caller-facing result code.
    pub fn to_result_code(self) -> ResultCode {
        match self {
            KvStatus::Ok => ResultCode::Succeeded,
            KvStatus::KeyNotFound => ResultCode::KeyNotFound,
            KvStatus::PartNotFound => ResultCode::SpaceNotFound,
            KvStatus::Busy => ResultCode::Conflict,
            KvStatus::Corrupt => ResultCode::StorageFailure,
        }
    }
}

/// One mutation inside an ordered write batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
}

/// Single-partition key/value store surface consumed by the write path.
pub trait KvStore: Send + Sync {
    /// Creates local state for a partition. Idempotent.
    fn create_part(&self, space: SpaceId, part: PartId);

    /// Destroys local state for a partition. Idempotent.
    fn drop_part(&self, space: SpaceId, part: PartId);

    /// Destroys all local state for a space.
    fn drop_space(&self, space: SpaceId);

    /// Point reads. The status is `KeyNotFound` when any key is absent;
    /// present keys still carry their values.
    fn multi_get(
        &self,
        space: SpaceId,
        part: PartId,
        keys: &[Vec<u8>],
    ) -> (KvStatus, Vec<Option<Vec<u8>>>);

    /// Ordered scan of all pairs whose key starts with `prefix`.
    fn prefix_scan(&self, space: SpaceId, part: PartId, prefix: &[u8])
        -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Applies an ordered batch atomically within the partition.
    fn put(&self, space: SpaceId, part: PartId, batch: Vec<BatchOp>) -> KvStatus;
}
