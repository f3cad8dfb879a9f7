use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::kv::{BatchOp, KvStatus, KvStore};
use crate::model::{PartId, SpaceId};
use crate::topology::PartHandler;

type PartKey = (SpaceId, PartId);

/// Ordered in-memory KV store with per-partition state.
///
/// Writes to a partition that has not been created return `PartNotFound`;
/// partition lifecycle is driven by topology notifications through
/// [`PartLifecycle`]. `fail_next_put` arms a one-shot write failure for a
/// partition, used to exercise partial-failure handling.
#[derive(Default)]
pub struct MemKvStore {
    parts: RwLock<HashMap<PartKey, BTreeMap<Vec<u8>, Vec<u8>>>>,
    fail_next: Mutex<HashMap<PartKey, KvStatus>>,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot failure status for the next `put` on the partition.
    pub fn fail_next_put(&self, space: SpaceId, part: PartId, status: KvStatus) {
        self.fail_next.lock().insert((space, part), status);
    }

    /// Number of keys stored in one partition. None when the partition
    /// does not exist.
    pub fn part_len(&self, space: SpaceId, part: PartId) -> Option<usize> {
        self.parts.read().get(&(space, part)).map(BTreeMap::len)
    }
}

impl KvStore for MemKvStore {
    fn create_part(&self, space: SpaceId, part: PartId) {
        self.parts.write().entry((space, part)).or_default();
    }

    fn drop_part(&self, space: SpaceId, part: PartId) {
        self.parts.write().remove(&(space, part));
    }

    fn drop_space(&self, space: SpaceId) {
        self.parts.write().retain(|(s, _), _| *s != space);
    }

    fn multi_get(
        &self,
        space: SpaceId,
        part: PartId,
        keys: &[Vec<u8>],
    ) -> (KvStatus, Vec<Option<Vec<u8>>>) {
        let parts = self.parts.read();
        let Some(data) = parts.get(&(space, part)) else {
            return (KvStatus::PartNotFound, Vec::new());
        };
        let values: Vec<Option<Vec<u8>>> = keys.iter().map(|k| data.get(k).cloned()).collect();
        let status = if values.iter().any(Option::is_none) {
            KvStatus::KeyNotFound
        } else {
            KvStatus::Ok
        };
        (status, values)
    }

    fn prefix_scan(
        &self,
        space: SpaceId,
        part: PartId,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let parts = self.parts.read();
        let data = parts
            .get(&(space, part))
            .ok_or(GraphError::PartNotFound(space, part))?;
        let out = data
            .range((Bound::Included(prefix.to_vec()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(out)
    }

    fn put(&self, space: SpaceId, part: PartId, batch: Vec<BatchOp>) -> KvStatus {
        if let Some(status) = self.fail_next.lock().remove(&(space, part)) {
            return status;
        }
        let mut parts = self.parts.write();
        let Some(data) = parts.get_mut(&(space, part)) else {
            return KvStatus::PartNotFound;
        };
        for op in batch {
            match op {
                BatchOp::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOp::Remove { key } => {
                    data.remove(&key);
                }
            }
        }
        KvStatus::Ok
    }
}

/// Bridges topology notifications to KV partition lifecycle, so partition
/// state exists by the time the topology read path reports it.
pub struct PartLifecycle {
    kv: Arc<dyn KvStore>,
}

impl PartLifecycle {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }
}

impl PartHandler for PartLifecycle {
    fn add_space(&self, space: SpaceId) {
        debug!(space, "kv: space added");
    }

    fn add_part(&self, space: SpaceId, part: PartId) {
        debug!(space, part, "kv: creating part");
        self.kv.create_part(space, part);
    }

    fn remove_space(&self, space: SpaceId) {
        debug!(space, "kv: dropping space");
        self.kv.drop_space(space);
    }

    fn remove_part(&self, space: SpaceId, part: PartId) {
        debug!(space, part, "kv: dropping part");
        self.kv.drop_part(space, part);
    }
}
