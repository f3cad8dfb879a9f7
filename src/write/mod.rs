//! Chain-based atomic edge writes.
//!
//! An edge insertion must become visible from both its source-side and its
//! destination-side placements, or not at all. The coordinator groups a
//! batch's edges into chains keyed by (local partition, remote partition),
//! encodes them against their schema, and drives one atomic commit per
//! chain concurrently through the [`ChainCommitter`] seam, aggregating
//! per-partition outcomes into the response.

mod chain;
mod committer;
mod index;

pub use chain::ChainWriteCoordinator;
pub use committer::{ChainCommitter, KvChainCommitter};
pub use index::IndexDelegate;

/// Encoded (key, value) pair for one edge, tagged with the version used at
/// encoding time. Belongs to exactly one chain for the duration of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeWriteUnit {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub version: i64,
}
