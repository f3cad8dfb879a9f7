//! Error handling for umbra operations.
//!
//! All fallible public APIs return `Result<T, GraphError>`. The coordinator
//! additionally reports per-partition outcomes as [`ResultCode`] values; the
//! [`GraphError::to_result_code`] mapping bridges the two when a routing or
//! schema failure has to be attributed to a caller-facing partition.

use thiserror::Error;

use crate::model::{EdgeType, PartId, ResultCode, SpaceId};

/// Result type for umbra operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while routing, encoding, or committing writes.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The space is unknown to the topology or metadata authority.
    #[error("space {0} not found")]
    SpaceNotFound(SpaceId),

    /// The partition is unknown within its space.
    #[error("part {1} not found in space {0}")]
    PartNotFound(SpaceId, PartId),

    /// No schema registered for the edge type in this space.
    #[error("edge schema {1} not found in space {0}")]
    EdgeSchemaNotFound(SpaceId, EdgeType),

    /// The space has no usable vertex-id length configured.
    #[error("invalid vertex id length for space {0}")]
    InvalidVidLen(SpaceId),

    /// A property value does not match the schema.
    #[error("data type mismatch: {0}")]
    TypeMismatch(String),

    /// Invalid configuration or call argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying storage reported a failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl GraphError {
    /// Maps an error to the caller-facing per-partition result code.
    pub fn to_result_code(&self) -> ResultCode {
        match self {
            GraphError::SpaceNotFound(_) | GraphError::PartNotFound(..) => {
                ResultCode::SpaceNotFound
            }
            GraphError::EdgeSchemaNotFound(..) => ResultCode::EdgeSchemaNotFound,
            GraphError::InvalidVidLen(_) => ResultCode::InvalidVidLen,
            GraphError::TypeMismatch(_) => ResultCode::DataTypeMismatch,
            GraphError::Storage(_) => ResultCode::StorageFailure,
            GraphError::InvalidArgument(_) => ResultCode::Unknown,
        }
    }
}
