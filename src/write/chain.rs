use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::codec;
use crate::config::WriteConfig;
use crate::error::{GraphError, Result};
use crate::meta::MetaClient;
use crate::model::{
    AddEdgesRequest, AddEdgesResponse, ChainId, NewEdge, PartId, ResultCode, SpaceId,
};
use crate::write::{ChainCommitter, EdgeWriteUnit, IndexDelegate};

/// Coordinates one batch of edge insertions across partitions.
///
/// Each edge's destination endpoint is routed to its owning partition;
/// edges are grouped into chains keyed by (local, remote), and each chain
/// commits as one atomic unit, all chains concurrently. Routing and schema
/// failures fail the originating local partition's whole bucket before
/// anything is dispatched; commit failures are per-chain. Every failure is
/// attributed to the caller-facing local partition, never the remote one.
pub struct ChainWriteCoordinator {
    meta: Arc<dyn MetaClient>,
    committer: Arc<dyn ChainCommitter>,
    config: WriteConfig,
}

impl ChainWriteCoordinator {
    pub fn new(
        meta: Arc<dyn MetaClient>,
        committer: Arc<dyn ChainCommitter>,
        config: WriteConfig,
    ) -> Self {
        Self {
            meta,
            committer,
            config,
        }
    }

    /// Processes one batch. The response carries an entry for every local
    /// partition that failed; partitions absent from it succeeded.
    pub async fn process(&self, req: AddEdgesRequest) -> AddEdgesResponse {
        let space = req.space_id;
        let mut resp = AddEdgesResponse::default();

        let vid_len = match self.meta.space_vid_len(space) {
            Ok(len) => len,
            Err(e) => {
                warn!(space, error = %e, "cannot resolve vertex id length, failing batch");
                for part in req.parts.keys() {
                    resp.failed_parts.insert(*part, ResultCode::InvalidVidLen);
                }
                return resp;
            }
        };

        // One version tag per call; all edges in the batch share it.
        let version = codec::version_tag(self.config.version_mode);

        let mut chains: FxHashMap<ChainId, Vec<EdgeWriteUnit>> = FxHashMap::default();
        let mut failed: BTreeMap<PartId, ResultCode> = BTreeMap::new();

        for (local, edges) in &req.parts {
            for edge in edges {
                let remote = match self.meta.part_id(space, &edge.key.dst) {
                    Ok(part) => part,
                    Err(e) => {
                        warn!(space, local, error = %e, "destination unroutable, failing bucket");
                        failed.insert(*local, ResultCode::SpaceNotFound);
                        break;
                    }
                };
                if self.config.trace_chains {
                    trace!(space, local, remote, src = ?edge.key.src, dst = ?edge.key.dst,
                        "routing edge");
                }
                let value = match self.encode_edge(space, &req.prop_names, edge) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(space, local, error = %e, "edge encoding failed, failing bucket");
                        failed.insert(*local, e.to_result_code());
                        break;
                    }
                };
                let key = codec::edge_key(vid_len, *local, &edge.key, version);
                chains
                    .entry((*local, remote))
                    .or_default()
                    .push(EdgeWriteUnit {
                        key,
                        value,
                        version,
                    });
            }
        }

        // A failed bucket contributed no units; nothing is dispatched while
        // any bucket failed.
        if !failed.is_empty() {
            resp.failed_parts = failed;
            return resp;
        }

        let delegate = self.index_delegate(space, &req.prop_names);

        let mut tags = Vec::with_capacity(chains.len());
        let mut handles = Vec::with_capacity(chains.len());
        for ((local, remote), units) in chains {
            let committer = Arc::clone(&self.committer);
            let delegate = delegate.clone();
            tags.push((local, remote));
            handles.push(tokio::spawn(async move {
                committer
                    .commit(vid_len, space, local, remote, units, delegate)
                    .await
            }));
        }

        for ((local, remote), joined) in tags.into_iter().zip(join_all(handles).await) {
            let code = match joined {
                Ok(code) => code,
                Err(e) => {
                    warn!(space, local, remote, error = %e, "chain task died");
                    ResultCode::Unknown
                }
            };
            if self.config.trace_chains {
                debug!(space, local, remote, ?code, "chain commit finished");
            }
            if code != ResultCode::Succeeded {
                resp.failed_parts.entry(local).or_insert(code);
            }
        }

        resp
    }

    fn encode_edge(
        &self,
        space: SpaceId,
        prop_names: &[String],
        edge: &NewEdge,
    ) -> Result<Vec<u8>> {
        let edge_type = edge.key.edge_type;
        let schema = self
            .meta
            .edge_schema(space, edge_type.abs())
            .ok_or(GraphError::EdgeSchemaNotFound(space, edge_type))?;
        codec::encode_row(&schema, prop_names, &edge.props)
    }

    fn index_delegate(
        &self,
        space: SpaceId,
        prop_names: &[String],
    ) -> Option<Arc<IndexDelegate>> {
        match self.meta.edge_indexes(space) {
            Ok(indexes) if !indexes.is_empty() => {
                Some(Arc::new(IndexDelegate::new(prop_names.to_vec(), indexes)))
            }
            Ok(_) => None,
            Err(e) => {
                debug!(space, error = %e, "no edge indexes resolved");
                None
            }
        }
    }
}
