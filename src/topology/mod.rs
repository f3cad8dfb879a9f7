//! Partition topology: which partitions exist, and who serves them.
//!
//! A [`PartManager`] is the routing oracle for one storage host. Two
//! implementations exist: [`MemPartManager`], populated by explicit calls
//! and used by tests and single-process setups, and
//! [`MetaSyncedPartManager`], which mirrors the metadata authority through
//! push notifications.
//!
//! Dependent subsystems register a single [`PartHandler`] to keep local
//! partition state (storage engine instances) in lock-step with topology
//! changes. Notification is synchronous: partition lifecycle completes
//! before the read path reports the partition as existing.

mod mem;
mod meta;

use std::sync::Arc;

use crate::error::Result;
use crate::model::{HostAddr, PartId, PartMeta, PartsMap, SpaceId};

pub use mem::MemPartManager;
pub use meta::{MetaChangedListener, MetaSyncedPartManager};

/// Capability invoked on every topology mutation. At most one handler is
/// registered at a time; registering another replaces it.
pub trait PartHandler: Send + Sync {
    fn add_space(&self, space: SpaceId);
    fn add_part(&self, space: SpaceId, part: PartId);
    fn remove_space(&self, space: SpaceId);
    fn remove_part(&self, space: SpaceId, part: PartId);
}

/// Query surface over the partition topology as seen by one host.
pub trait PartManager: Send + Sync {
    /// All (space, partition) assignments currently routed to `host`.
    /// Empty when the host serves nothing; never an error.
    fn parts(&self, host: &HostAddr) -> PartsMap;

    /// Placement snapshot for one partition. NotFound when the space or
    /// partition is unknown at call time; results may be stale.
    fn part_meta(&self, space: SpaceId, part: PartId) -> Result<PartMeta>;

    /// Whether `host` serves the partition right now. O(lookup).
    fn part_exist(&self, host: &HostAddr, space: SpaceId, part: PartId) -> bool;

    /// Whether the space exists for `host` right now. O(lookup).
    fn space_exist(&self, host: &HostAddr, space: SpaceId) -> bool;

    /// Installs the single change-notification target, replacing any
    /// previous one.
    fn register_handler(&self, handler: Arc<dyn PartHandler>);
}
