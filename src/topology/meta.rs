use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::meta::MetaClient;
use crate::model::{HostAddr, PartId, PartMeta, PartsMap, SpaceId};
use crate::topology::{PartHandler, PartManager};

/// Push-notification capability the metadata authority drives.
///
/// Each callback updates the locally cached placement map and forwards the
/// equivalent lifecycle notification to the registered [`PartHandler`], so
/// downstream partition state stays synchronized with the authority. For
/// additions the handler runs before the cache insert; the read path never
/// reports a partition whose local lifecycle has not completed.
pub trait MetaChangedListener: Send + Sync {
    fn on_space_added(&self, space: SpaceId);
    fn on_space_removed(&self, space: SpaceId);
    fn on_part_added(&self, meta: PartMeta);
    fn on_part_updated(&self, meta: PartMeta);
    fn on_part_removed(&self, space: SpaceId, part: PartId);
}

/// Part manager synced from the metadata authority.
///
/// Wraps a client connection and mirrors placement into a local map; the
/// query surface reads only that cache and never touches the network.
/// Staleness is bounded by push propagation delay.
///
/// The listener capability is a separate trait rather than a second role of
/// the manager type: authority callbacks and topology queries are distinct
/// capability sets that happen to share state.
pub struct MetaSyncedPartManager {
    local_host: HostAddr,
    meta: Arc<dyn MetaClient>,
    parts_map: RwLock<PartsMap>,
    handler: RwLock<Option<Arc<dyn PartHandler>>>,
}

impl MetaSyncedPartManager {
    pub fn new(local_host: HostAddr, meta: Arc<dyn MetaClient>) -> Self {
        Self {
            local_host,
            meta,
            parts_map: RwLock::new(PartsMap::default()),
            handler: RwLock::new(None),
        }
    }

    /// Host this manager serves.
    pub fn local_host(&self) -> &HostAddr {
        &self.local_host
    }

    /// Client connection to the authority.
    pub fn meta_client(&self) -> &Arc<dyn MetaClient> {
        &self.meta
    }

    fn handler(&self) -> Option<Arc<dyn PartHandler>> {
        self.handler.read().clone()
    }

    fn part_known(&self, space: SpaceId, part: PartId) -> bool {
        self.parts_map
            .read()
            .get(&space)
            .is_some_and(|parts| parts.contains_key(&part))
    }

    fn insert_part(&self, meta: PartMeta) {
        let mut map = self.parts_map.write();
        let parts = map.entry(meta.space_id).or_default();
        parts.insert(meta.part_id, meta);
    }
}

impl MetaChangedListener for MetaSyncedPartManager {
    fn on_space_added(&self, space: SpaceId) {
        // The cache entry materializes with the first partition; the space
        // does not exist on this host until it holds one.
        debug!(space, "meta push: space added");
        if let Some(handler) = self.handler() {
            handler.add_space(space);
        }
    }

    fn on_space_removed(&self, space: SpaceId) {
        debug!(space, "meta push: space removed");
        self.parts_map.write().remove(&space);
        if let Some(handler) = self.handler() {
            handler.remove_space(space);
        }
    }

    fn on_part_added(&self, meta: PartMeta) {
        let (space, part) = (meta.space_id, meta.part_id);
        debug!(space, part, "meta push: part added");
        // Downstream lifecycle runs before the read path reports the part.
        if !self.part_known(space, part) {
            if let Some(handler) = self.handler() {
                handler.add_part(space, part);
            }
        }
        self.insert_part(meta);
    }

    fn on_part_updated(&self, meta: PartMeta) {
        let (space, part) = (meta.space_id, meta.part_id);
        debug!(space, part, "meta push: part updated");
        // The authority is the source of truth: an update for a partition
        // this host has never seen behaves as an add.
        if !self.part_known(space, part) {
            warn!(space, part, "part updated before being added");
            if let Some(handler) = self.handler() {
                handler.add_part(space, part);
            }
        }
        self.insert_part(meta);
    }

    fn on_part_removed(&self, space: SpaceId, part: PartId) {
        debug!(space, part, "meta push: part removed");
        let removed = {
            let mut map = self.parts_map.write();
            match map.get_mut(&space) {
                Some(parts) => {
                    let removed = parts.remove(&part).is_some();
                    if parts.is_empty() {
                        // Keep space existence tied to holding parts; the
                        // authority announces space removal separately.
                        map.remove(&space);
                    }
                    removed
                }
                None => false,
            }
        };
        if removed {
            if let Some(handler) = self.handler() {
                handler.remove_part(space, part);
            }
        }
    }
}

impl PartManager for MetaSyncedPartManager {
    fn parts(&self, host: &HostAddr) -> PartsMap {
        let map = self.parts_map.read();
        let mut out = PartsMap::default();
        for (space, parts) in map.iter() {
            for (part, meta) in parts.iter() {
                if meta.peers.contains(host) {
                    out.entry(*space).or_default().insert(*part, meta.clone());
                }
            }
        }
        out
    }

    fn part_meta(&self, space: SpaceId, part: PartId) -> Result<PartMeta> {
        let map = self.parts_map.read();
        let parts = map.get(&space).ok_or(GraphError::SpaceNotFound(space))?;
        parts
            .get(&part)
            .cloned()
            .ok_or(GraphError::PartNotFound(space, part))
    }

    fn part_exist(&self, host: &HostAddr, space: SpaceId, part: PartId) -> bool {
        self.parts_map
            .read()
            .get(&space)
            .and_then(|parts| parts.get(&part))
            .is_some_and(|meta| meta.peers.contains(host))
    }

    fn space_exist(&self, host: &HostAddr, space: SpaceId) -> bool {
        self.parts_map
            .read()
            .get(&space)
            .is_some_and(|parts| parts.values().any(|meta| meta.peers.contains(host)))
    }

    fn register_handler(&self, handler: Arc<dyn PartHandler>) {
        *self.handler.write() = Some(handler);
    }
}
