//! Error types for host document operations.

use ph_common::NodeId;
use thiserror::Error;

/// Errors a host document can report back to the engine.
///
/// Every engine path that hits one of these degrades to skip-and-continue;
/// they exist so the skip can be logged with a reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("node not found: {id}")]
    NodeNotFound { id: NodeId },

    #[error("connection {from} -> {to} rejected: {reason}")]
    InvalidConnection {
        from: NodeId,
        to: NodeId,
        reason: String,
    },
}

/// Convenience Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;
