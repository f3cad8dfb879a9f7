use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::model::{HostAddr, PartId, PartMeta, PartsMap, SpaceId};
use crate::topology::{PartHandler, PartManager};

/// Memory-backed part manager, populated by explicit calls.
///
/// Mutations are synchronous and immediately visible to readers. The first
/// partition of an unknown space fires `add_space` before `add_part`;
/// removing the last partition fires `remove_part` before `remove_space`.
/// Handler callbacks run before the mutation becomes visible to the read
/// path, so dependent partition lifecycle completes first.
///
/// Mutators are expected to be driven from a single writer; readers may be
/// concurrent with the writer and with each other.
#[derive(Default)]
pub struct MemPartManager {
    parts_map: RwLock<PartsMap>,
    handler: RwLock<Option<Arc<dyn PartHandler>>>,
}

impl MemPartManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a partition, creating its space on first sight. Re-adding an
    /// existing partition overwrites its placement without re-firing
    /// notifications.
    pub fn add_part(&self, space: SpaceId, part: PartId, peers: Vec<HostAddr>) {
        let (new_space, new_part) = {
            let map = self.parts_map.read();
            match map.get(&space) {
                None => (true, true),
                Some(parts) => (false, !parts.contains_key(&part)),
            }
        };
        let handler = self.handler.read().clone();
        if let Some(handler) = handler {
            if new_space {
                debug!(space, "topology: space added");
                handler.add_space(space);
            }
            if new_part {
                debug!(space, part, "topology: part added");
                handler.add_part(space, part);
            }
        }
        self.parts_map
            .write()
            .entry(space)
            .or_default()
            .insert(part, PartMeta::new(space, part, peers));
    }

    /// Removes a partition if present; removing the last partition of a
    /// space removes the space.
    pub fn remove_part(&self, space: SpaceId, part: PartId) {
        let (removed, space_gone) = {
            let mut map = self.parts_map.write();
            match map.get_mut(&space) {
                Some(parts) => {
                    let removed = parts.remove(&part).is_some();
                    let empty = parts.is_empty();
                    if removed && empty {
                        map.remove(&space);
                    }
                    (removed, removed && empty)
                }
                None => (false, false),
            }
        };
        if !removed {
            return;
        }
        let handler = self.handler.read().clone();
        if let Some(handler) = handler {
            debug!(space, part, "topology: part removed");
            handler.remove_part(space, part);
            if space_gone {
                debug!(space, "topology: space removed");
                handler.remove_space(space);
            }
        }
    }

    /// Snapshot of the full placement map.
    pub fn parts_map(&self) -> PartsMap {
        self.parts_map.read().clone()
    }
}

impl PartManager for MemPartManager {
    fn parts(&self, _host: &HostAddr) -> PartsMap {
        // Single-host variant: every registered partition is local.
        self.parts_map.read().clone()
    }

    fn part_meta(&self, space: SpaceId, part: PartId) -> Result<PartMeta> {
        let map = self.parts_map.read();
        let parts = map.get(&space).ok_or(GraphError::SpaceNotFound(space))?;
        parts
            .get(&part)
            .cloned()
            .ok_or(GraphError::PartNotFound(space, part))
    }

    fn part_exist(&self, _host: &HostAddr, space: SpaceId, part: PartId) -> bool {
        self.parts_map
            .read()
            .get(&space)
            .is_some_and(|parts| parts.contains_key(&part))
    }

    fn space_exist(&self, _host: &HostAddr, space: SpaceId) -> bool {
        self.parts_map.read().contains_key(&space)
    }

    fn register_handler(&self, handler: Arc<dyn PartHandler>) {
        *self.handler.write() = Some(handler);
    }
}
