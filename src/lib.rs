//! Write/routing core of a partitioned graph store: partition topology
//! with change notification, and chain-based atomic cross-partition edge
//! insertion.

pub mod codec;
pub mod config;
pub mod error;
pub mod kv;
pub mod logging;
pub mod meta;
pub mod model;
pub mod topology;
pub mod write;

pub use config::{VersionMode, WriteConfig};
pub use error::{GraphError, Result};
pub use model::{
    AddEdgesRequest, AddEdgesResponse, ChainId, EdgeKey, EdgeRanking, EdgeType, HostAddr,
    NewEdge, PartId, PartMeta, PartsMap, PropertyValue, ResultCode, SpaceId,
};
pub use topology::{PartHandler, PartManager};
pub use write::{ChainCommitter, ChainWriteCoordinator, EdgeWriteUnit};
