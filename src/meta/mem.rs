use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use xxhash_rust::xxh64::xxh64;

use crate::error::{GraphError, Result};
use crate::meta::schema::{EdgeSchema, IndexItem};
use crate::meta::MetaClient;
use crate::model::{EdgeType, PartId, SpaceId};

#[derive(Debug, Default)]
struct SpaceMeta {
    part_count: u32,
    vid_len: usize,
    edge_schemas: HashMap<EdgeType, Arc<EdgeSchema>>,
    indexes: Vec<Arc<IndexItem>>,
}

/// In-memory metadata authority.
///
/// Serves the same client surface as a remote authority from process-local
/// state. Registration methods are immediately visible to readers.
#[derive(Default)]
pub struct MemMetaClient {
    spaces: RwLock<HashMap<SpaceId, SpaceMeta>>,
}

impl MemMetaClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a space with a fixed partition count and vid length.
    /// Re-registering overwrites the previous definition.
    pub fn create_space(&self, space: SpaceId, part_count: u32, vid_len: usize) {
        let mut spaces = self.spaces.write();
        let entry = spaces.entry(space).or_default();
        entry.part_count = part_count;
        entry.vid_len = vid_len;
    }

    /// Registers an edge schema under its absolute edge type id.
    pub fn add_edge_schema(&self, space: SpaceId, schema: EdgeSchema) {
        let mut spaces = self.spaces.write();
        let entry = spaces.entry(space).or_default();
        entry
            .edge_schemas
            .insert(schema.edge_type.abs(), Arc::new(schema));
    }

    /// Registers a secondary index for one of the space's edge types.
    pub fn add_edge_index(&self, space: SpaceId, item: IndexItem) {
        let mut spaces = self.spaces.write();
        let entry = spaces.entry(space).or_default();
        entry.indexes.push(Arc::new(item));
    }
}

impl MetaClient for MemMetaClient {
    fn space_vid_len(&self, space: SpaceId) -> Result<usize> {
        let spaces = self.spaces.read();
        let meta = spaces
            .get(&space)
            .ok_or(GraphError::SpaceNotFound(space))?;
        if meta.vid_len == 0 {
            return Err(GraphError::InvalidVidLen(space));
        }
        Ok(meta.vid_len)
    }

    fn edge_schema(&self, space: SpaceId, edge_type: EdgeType) -> Option<Arc<EdgeSchema>> {
        let spaces = self.spaces.read();
        spaces
            .get(&space)
            .and_then(|m| m.edge_schemas.get(&edge_type.abs()))
            .cloned()
    }

    fn edge_indexes(&self, space: SpaceId) -> Result<Vec<Arc<IndexItem>>> {
        let spaces = self.spaces.read();
        let meta = spaces
            .get(&space)
            .ok_or(GraphError::SpaceNotFound(space))?;
        Ok(meta.indexes.clone())
    }

    fn part_id(&self, space: SpaceId, vid: &[u8]) -> Result<PartId> {
        let spaces = self.spaces.read();
        let meta = spaces
            .get(&space)
            .ok_or(GraphError::SpaceNotFound(space))?;
        if meta.part_count == 0 {
            return Err(GraphError::SpaceNotFound(space));
        }
        // Parts are numbered from 1; hash placement must agree across hosts,
        // so the hash function is part of the wire contract.
        Ok((xxh64(vid, 0) % u64::from(meta.part_count)) as PartId + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::schema::{FieldDef, PropertyType};

    #[test]
    fn part_id_is_stable_and_in_range() {
        let meta = MemMetaClient::new();
        meta.create_space(1, 7, 8);

        let first = meta.part_id(1, b"vertex-a").expect("route vertex");
        for _ in 0..16 {
            assert_eq!(
                meta.part_id(1, b"vertex-a").expect("route vertex"),
                first,
                "placement stable for one vid"
            );
        }
        for vid in [&b"a"[..], b"b", b"c", b"dddddddd"] {
            let part = meta.part_id(1, vid).expect("route vertex");
            assert!((1..=7).contains(&part), "part {part} within space range");
        }
    }

    #[test]
    fn unknown_space_fails_routing_and_vid_len() {
        let meta = MemMetaClient::new();
        assert!(matches!(
            meta.part_id(9, b"v"),
            Err(GraphError::SpaceNotFound(9))
        ));
        assert!(matches!(
            meta.space_vid_len(9),
            Err(GraphError::SpaceNotFound(9))
        ));
    }

    #[test]
    fn edge_schema_lookup_uses_absolute_type() {
        let meta = MemMetaClient::new();
        meta.create_space(1, 2, 8);
        meta.add_edge_schema(
            1,
            EdgeSchema::new(3, vec![FieldDef::new("since", PropertyType::Int)]),
        );

        assert!(meta.edge_schema(1, 3).is_some(), "forward direction");
        assert!(meta.edge_schema(1, -3).is_some(), "reversed direction");
        assert!(meta.edge_schema(1, 4).is_none(), "unregistered type");
    }
}
