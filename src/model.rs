use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub type SpaceId = u32;
pub type PartId = u32;
pub type EdgeType = i32;
pub type EdgeRanking = i64;

/// Grouping key for one atomic cross-partition commit unit: (local, remote).
pub type ChainId = (PartId, PartId);

/// Network identity of a storage node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostAddr {
    pub host: String,
    pub port: u16,
}

impl HostAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Immutable placement snapshot for one partition.
///
/// Replaced wholesale when the authority pushes an update; consumers never
/// mutate it field by field. `peers` is non-empty for any registered part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartMeta {
    pub space_id: SpaceId,
    pub part_id: PartId,
    pub peers: SmallVec<[HostAddr; 3]>,
}

impl PartMeta {
    pub fn new(space_id: SpaceId, part_id: PartId, peers: Vec<HostAddr>) -> Self {
        Self {
            space_id,
            part_id,
            peers: peers.into(),
        }
    }
}

/// All partition placements, keyed by space then partition.
pub type PartsMap = HashMap<SpaceId, HashMap<PartId, PartMeta>>;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

/// Logical identity of one directed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeKey {
    pub src: Vec<u8>,
    pub edge_type: EdgeType,
    pub ranking: EdgeRanking,
    pub dst: Vec<u8>,
}

/// One edge insertion: identity plus property values ranked in the
/// request's declared property-name order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEdge {
    pub key: EdgeKey,
    pub props: Vec<PropertyValue>,
}

impl NewEdge {
    pub fn new(key: EdgeKey, props: Vec<PropertyValue>) -> Self {
        Self { key, props }
    }
}

/// Batch edge-insertion request, pre-bucketed by the local partition that
/// owns each edge's origin endpoint.
#[derive(Debug, Clone)]
pub struct AddEdgesRequest {
    pub space_id: SpaceId,
    pub prop_names: Vec<String>,
    pub parts: BTreeMap<PartId, Vec<NewEdge>>,
}

/// Caller-facing outcome code for one local partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    Succeeded,
    InvalidVidLen,
    SpaceNotFound,
    EdgeSchemaNotFound,
    DataTypeMismatch,
    /// Distinguished non-fatal empty-result status from the KV seam.
    KeyNotFound,
    Conflict,
    StorageFailure,
    Unknown,
}

/// Aggregated batch outcome. A partition absent from `failed_parts`
/// succeeded; an entry carries the first failure attributed to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddEdgesResponse {
    pub failed_parts: BTreeMap<PartId, ResultCode>,
}

impl AddEdgesResponse {
    pub fn is_ok(&self) -> bool {
        self.failed_parts.is_empty()
    }
}
