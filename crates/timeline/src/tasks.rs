//! Deferred work items drained by the session's tick loop.

use ph_common::NodeId;

/// One unit of deferred engine work.
///
/// Tasks carry the generation they were scheduled under where staleness
/// matters; a handler compares it against the live generation and drops
/// superseded work without side effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    /// Re-aggregate the union range from the tracked slave ranges.
    RecomputeUnionRange,
    /// Fan the union value out to every containing slave.
    PropagateUnionValue { generation: u64 },
    /// Close out a group propagation and request the follow-up solve.
    FinishPropagation { owner: NodeId, generation: u64 },
    /// Force a propagation that never finished back to idle.
    WatchdogReset { owner: NodeId, generation: u64 },
    /// Ask the host for one recomputation pass.
    RequestSolve,
}
