use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::codec;
use crate::kv::{BatchOp, KvStatus, KvStore};
use crate::model::{PartId, ResultCode, SpaceId};
use crate::write::{EdgeWriteUnit, IndexDelegate};

/// Per-chain atomic commit operation.
///
/// One call commits one chain's units such that the edges become visible
/// from both the local and the remote placement, or from neither. The
/// committer owns its own retry policy; the coordinator only consumes the
/// terminal code. Once dispatched, a commit always reaches a terminal
/// outcome.
#[async_trait]
pub trait ChainCommitter: Send + Sync {
    async fn commit(
        &self,
        vid_len: usize,
        space: SpaceId,
        local: PartId,
        remote: PartId,
        units: Vec<EdgeWriteUnit>,
        index: Option<Arc<IndexDelegate>>,
    ) -> ResultCode;
}

/// Reference committer over the key/value seam.
///
/// Applies the local-side batch (edge units plus any index writes), then the
/// remote-side copy re-keyed for the remote partition. A remote failure
/// rolls the local batch back, so no half-applied edge stays visible.
/// A chain whose ends coincide degenerates to a single batch.
pub struct KvChainCommitter {
    kv: Arc<dyn KvStore>,
}

impl KvChainCommitter {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl ChainCommitter for KvChainCommitter {
    async fn commit(
        &self,
        vid_len: usize,
        space: SpaceId,
        local: PartId,
        remote: PartId,
        units: Vec<EdgeWriteUnit>,
        index: Option<Arc<IndexDelegate>>,
    ) -> ResultCode {
        let mut local_batch = Vec::with_capacity(units.len());
        let mut local_keys = Vec::with_capacity(units.len());
        for unit in &units {
            local_batch.push(BatchOp::Put {
                key: unit.key.clone(),
                value: unit.value.clone(),
            });
            local_keys.push(unit.key.clone());
            if let Some(delegate) = &index {
                match delegate.index_ops(vid_len, local, unit) {
                    Ok(ops) => {
                        for op in &ops {
                            if let BatchOp::Put { key, .. } = op {
                                local_keys.push(key.clone());
                            }
                        }
                        local_batch.extend(ops);
                    }
                    Err(e) => return e.to_result_code(),
                }
            }
        }

        if local == remote {
            return self.kv.put(space, local, local_batch).to_result_code();
        }

        let remote_batch: Vec<BatchOp> = units
            .iter()
            .map(|unit| BatchOp::Put {
                key: codec::rekey_for_part(&unit.key, remote),
                value: unit.value.clone(),
            })
            .collect();

        let status = self.kv.put(space, local, local_batch);
        if status != KvStatus::Ok {
            return status.to_result_code();
        }

        let status = self.kv.put(space, remote, remote_batch);
        if status != KvStatus::Ok {
            warn!(
                space,
                local, remote, ?status,
                "remote side of chain failed, rolling back local side"
            );
            let rollback: Vec<BatchOp> = local_keys
                .into_iter()
                .map(|key| BatchOp::Remove { key })
                .collect();
            let rb = self.kv.put(space, local, rollback);
            if rb != KvStatus::Ok {
                error!(space, local, ?rb, "rollback of local side failed");
            }
            return status.to_result_code();
        }

        ResultCode::Succeeded
    }
}
