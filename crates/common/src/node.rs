//! Node classification.
//!
//! The host document holds arbitrary node kinds; the engine cares about a
//! closed set of them. A node's kind is resolved exactly once, when the
//! node is first seen, and its capabilities derive from the kind. There
//! is no per-operation type inspection anywhere downstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of node kinds the engine distinguishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A numeric range control (slider) participating in synchronization.
    RangeControl,
    /// The master range control driving all slaves.
    UnionControl,
    /// An upstream source contributing event tuples to resolution.
    EventSource,
    /// A node owning a bound group of dependents.
    GroupOwner,
    /// Anything else; still a valid group dependent.
    Other,
}

impl NodeKind {
    /// Capabilities of a node of this kind.
    pub fn caps(self) -> NodeCaps {
        match self {
            NodeKind::RangeControl | NodeKind::UnionControl => NodeCaps {
                previewable: false,
                lockable: true,
                caches_output: false,
                has_time_input: false,
            },
            NodeKind::EventSource => NodeCaps {
                previewable: true,
                lockable: true,
                caches_output: true,
                has_time_input: true,
            },
            NodeKind::GroupOwner => NodeCaps {
                previewable: true,
                lockable: true,
                caches_output: true,
                has_time_input: true,
            },
            NodeKind::Other => NodeCaps {
                previewable: true,
                lockable: true,
                caches_output: true,
                has_time_input: false,
            },
        }
    }

    pub fn is_range_control(self) -> bool {
        matches!(self, NodeKind::RangeControl | NodeKind::UnionControl)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::RangeControl => "range-control",
            NodeKind::UnionControl => "union-control",
            NodeKind::EventSource => "event-source",
            NodeKind::GroupOwner => "group-owner",
            NodeKind::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// What the engine may do to a node of a given kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeCaps {
    /// Hidden flag may be toggled.
    pub previewable: bool,
    /// Locked flag may be toggled.
    pub lockable: bool,
    /// Carries cached output that must be cleared when locking.
    pub caches_output: bool,
    /// Exposes a time input the union control can auto-wire into.
    pub has_time_input: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_controls_are_not_previewable() {
        assert!(!NodeKind::RangeControl.caps().previewable);
        assert!(!NodeKind::UnionControl.caps().previewable);
        assert!(NodeKind::EventSource.caps().previewable);
    }

    #[test]
    fn time_inputs_follow_kind() {
        assert!(NodeKind::EventSource.caps().has_time_input);
        assert!(NodeKind::GroupOwner.caps().has_time_input);
        assert!(!NodeKind::Other.caps().has_time_input);
    }

    #[test]
    fn range_control_classification() {
        assert!(NodeKind::RangeControl.is_range_control());
        assert!(NodeKind::UnionControl.is_range_control());
        assert!(!NodeKind::EventSource.is_range_control());
    }
}
