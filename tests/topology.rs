use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;

use umbra::kv::{MemKvStore, PartLifecycle};
use umbra::topology::{MemPartManager, MetaChangedListener, MetaSyncedPartManager};
use umbra::meta::{MemMetaClient, MetaClient};
use umbra::{HostAddr, PartHandler, PartId, PartManager, PartMeta, SpaceId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    AddSpace(SpaceId),
    AddPart(SpaceId, PartId),
    RemoveSpace(SpaceId),
    RemovePart(SpaceId, PartId),
}

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl PartHandler for RecordingHandler {
    fn add_space(&self, space: SpaceId) {
        self.events.lock().push(Event::AddSpace(space));
    }
    fn add_part(&self, space: SpaceId, part: PartId) {
        self.events.lock().push(Event::AddPart(space, part));
    }
    fn remove_space(&self, space: SpaceId) {
        self.events.lock().push(Event::RemoveSpace(space));
    }
    fn remove_part(&self, space: SpaceId, part: PartId) {
        self.events.lock().push(Event::RemovePart(space, part));
    }
}

fn host() -> HostAddr {
    HostAddr::new("localhost", 44500)
}

#[test]
fn first_part_of_a_space_fires_add_space_then_add_part() {
    let pm = MemPartManager::new();
    let handler = Arc::new(RecordingHandler::default());
    pm.register_handler(handler.clone());

    pm.add_part(1, 1, vec![host()]);
    assert_eq!(
        handler.take(),
        vec![Event::AddSpace(1), Event::AddPart(1, 1)],
        "space notification precedes part notification"
    );

    pm.add_part(1, 2, vec![host()]);
    assert_eq!(
        handler.take(),
        vec![Event::AddPart(1, 2)],
        "known space only fires the part notification"
    );

    let assigned = pm.parts(&host());
    assert_eq!(assigned.get(&1).map(HashMap::len), Some(2));
}

#[test]
fn removing_the_last_part_fires_remove_part_then_remove_space() {
    let pm = MemPartManager::new();
    let handler = Arc::new(RecordingHandler::default());
    pm.register_handler(handler.clone());

    pm.add_part(1, 1, vec![host()]);
    pm.add_part(1, 2, vec![host()]);
    handler.take();

    pm.remove_part(1, 1);
    assert_eq!(handler.take(), vec![Event::RemovePart(1, 1)]);
    assert!(pm.space_exist(&host(), 1), "space survives while parts remain");

    pm.remove_part(1, 2);
    assert_eq!(
        handler.take(),
        vec![Event::RemovePart(1, 2), Event::RemoveSpace(1)],
        "last part removal also removes the space"
    );
    assert!(!pm.space_exist(&host(), 1));
}

#[test]
fn readding_a_part_does_not_refire_notifications() {
    let pm = MemPartManager::new();
    let handler = Arc::new(RecordingHandler::default());
    pm.register_handler(handler.clone());

    pm.add_part(1, 1, vec![HostAddr::new("a", 1)]);
    handler.take();
    pm.add_part(1, 1, vec![HostAddr::new("b", 2)]);

    assert_eq!(handler.take(), vec![], "overwrite is silent");
    let meta = pm.part_meta(1, 1).expect("part registered");
    assert_eq!(meta.peers[0], HostAddr::new("b", 2), "placement replaced");
}

#[test]
fn registering_a_handler_replaces_the_previous_one() {
    let pm = MemPartManager::new();
    let first = Arc::new(RecordingHandler::default());
    let second = Arc::new(RecordingHandler::default());

    pm.register_handler(first.clone());
    pm.add_part(1, 1, vec![host()]);
    pm.register_handler(second.clone());
    pm.add_part(1, 2, vec![host()]);

    assert_eq!(first.take(), vec![Event::AddSpace(1), Event::AddPart(1, 1)]);
    assert_eq!(second.take(), vec![Event::AddPart(1, 2)]);
}

#[test]
fn part_lifecycle_keeps_kv_partitions_in_lock_step() {
    let kv = Arc::new(MemKvStore::new());
    let pm = MemPartManager::new();
    pm.register_handler(Arc::new(PartLifecycle::new(kv.clone())));

    pm.add_part(1, 1, vec![host()]);
    pm.add_part(1, 2, vec![host()]);
    assert_eq!(kv.part_len(1, 1), Some(0), "partition created with topology");
    assert_eq!(kv.part_len(1, 2), Some(0));

    pm.remove_part(1, 1);
    assert_eq!(kv.part_len(1, 1), None, "partition dropped with topology");

    pm.remove_part(1, 2);
    assert_eq!(kv.part_len(1, 2), None, "space teardown drops the rest");
}

#[test]
fn meta_synced_manager_mirrors_pushes_and_filters_by_host() {
    let meta = Arc::new(MemMetaClient::new());
    let local = HostAddr::new("storage-1", 44500);
    let other = HostAddr::new("storage-2", 44500);
    let pm = MetaSyncedPartManager::new(local.clone(), meta);
    let handler = Arc::new(RecordingHandler::default());
    pm.register_handler(handler.clone());

    assert_eq!(pm.local_host(), &local);
    assert!(
        pm.meta_client().space_vid_len(1).is_err(),
        "authority has no spaces registered"
    );

    pm.on_space_added(1);
    pm.on_part_added(PartMeta::new(1, 1, vec![local.clone(), other.clone()]));
    pm.on_part_added(PartMeta::new(1, 2, vec![other.clone()]));
    assert_eq!(
        handler.take(),
        vec![Event::AddSpace(1), Event::AddPart(1, 1), Event::AddPart(1, 2)]
    );

    assert!(pm.part_exist(&local, 1, 1));
    assert!(!pm.part_exist(&local, 1, 2), "peer filter applies");
    assert!(pm.space_exist(&local, 1));
    assert!(pm.space_exist(&other, 1));

    let local_parts = pm.parts(&local);
    assert_eq!(local_parts.get(&1).map(HashMap::len), Some(1));
    let other_parts = pm.parts(&other);
    assert_eq!(other_parts.get(&1).map(HashMap::len), Some(2));

    // Peer update replaces the snapshot wholesale and stays silent.
    pm.on_part_updated(PartMeta::new(1, 1, vec![other.clone()]));
    assert_eq!(handler.take(), vec![]);
    assert!(!pm.part_exist(&local, 1, 1), "local host dropped from peers");

    // An update for a never-seen part behaves as an add.
    pm.on_part_updated(PartMeta::new(1, 3, vec![local.clone()]));
    assert_eq!(handler.take(), vec![Event::AddPart(1, 3)]);

    pm.on_part_removed(1, 1);
    pm.on_part_removed(1, 2);
    pm.on_part_removed(1, 3);
    pm.on_space_removed(1);
    assert_eq!(
        handler.take(),
        vec![
            Event::RemovePart(1, 1),
            Event::RemovePart(1, 2),
            Event::RemovePart(1, 3),
            Event::RemoveSpace(1),
        ]
    );
    assert!(!pm.space_exist(&local, 1));
    assert!(pm.part_meta(1, 3).is_err());
}

proptest! {
    /// Any interleaving of adds and removes keeps space existence tied to
    /// holding at least one partition, and never exposes an empty peer set.
    #[test]
    fn space_exists_iff_nonempty_under_any_interleaving(
        ops in prop::collection::vec((any::<bool>(), 0u32..3, 0u32..4), 1..64)
    ) {
        let pm = MemPartManager::new();
        let mut model: HashMap<SpaceId, HashSet<PartId>> = HashMap::new();

        for (add, space, part) in ops {
            if add {
                pm.add_part(space, part, vec![host()]);
                model.entry(space).or_default().insert(part);
            } else {
                pm.remove_part(space, part);
                if let Some(parts) = model.get_mut(&space) {
                    parts.remove(&part);
                    if parts.is_empty() {
                        model.remove(&space);
                    }
                }
            }

            for space in 0u32..3 {
                prop_assert_eq!(
                    pm.space_exist(&host(), space),
                    model.contains_key(&space),
                    "space {} existence", space
                );
            }
            for (space, parts) in &model {
                for part in parts {
                    let meta = pm.part_meta(*space, *part).expect("registered part");
                    prop_assert!(!meta.peers.is_empty(), "peers never empty");
                }
            }
        }
    }
}
