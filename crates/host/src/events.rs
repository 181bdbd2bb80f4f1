//! Document lifecycle notifications observed by the engine.

use ph_common::NodeId;

/// Events the host loop delivers to the engine, in the order they
/// happened. Adds and removes arrive batched the way hosts batch them
/// (a paste or a multi-delete is one event).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocEvent {
    NodesAdded(Vec<NodeId>),
    NodesRemoved(Vec<NodeId>),
    SolveStart,
    SolveEnd,
}
