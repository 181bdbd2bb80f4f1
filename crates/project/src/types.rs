//! Persisted session data model — host-file compatible JSON format.
//!
//! These types mirror what the host editor stores per owning node inside
//! its own document file: the engine contributes one JSON fragment, the
//! host persists it verbatim and hands it back on load. Identifiers are
//! stored raw here; resolving them against live nodes is the second
//! phase (see `restore`).

use ph_common::NodeId;
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything the engine persists for one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Snapshot format version (stored as `1`).
    pub version: u32,
    /// Union control value at save time, when a union was bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub union_value: Option<f64>,
    /// Per-owner persisted state.
    #[serde(default)]
    pub owners: Vec<OwnerState>,
}

impl SessionSnapshot {
    /// Create an empty snapshot at the current version.
    pub fn new() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            union_value: None,
            owners: Vec::new(),
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted fields of one group-owning node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerState {
    /// The owning node's identifier, stored verbatim.
    pub owner_id: NodeId,
    /// Hide dependents while the current time is outside the interval.
    pub hide_when_outside: bool,
    /// Lock dependents while the current time is outside the interval.
    pub lock_when_outside: bool,
    /// Drive state from upstream-data presence instead of containment.
    pub use_empty_data_mode: bool,
    /// Whether the owner's UI section was collapsed.
    pub collapsed_ui: bool,
    /// Dependent node identifiers, stored verbatim.
    pub bound_node_ids: Vec<NodeId>,
}

impl OwnerState {
    pub fn new(owner_id: NodeId) -> Self {
        Self {
            owner_id,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_json_is_camel_case() {
        let mut snapshot = SessionSnapshot::new();
        snapshot.union_value = Some(12.5);
        snapshot.owners.push(OwnerState {
            owner_id: NodeId(7),
            hide_when_outside: true,
            lock_when_outside: false,
            use_empty_data_mode: false,
            collapsed_ui: true,
            bound_node_ids: vec![NodeId(8), NodeId(9)],
        });

        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert!(json.contains("\"unionValue\":12.5"));
        assert!(json.contains("\"hideWhenOutside\":true"));
        assert!(json.contains("\"boundNodeIds\":[8,9]"));
        assert!(json.contains("\"collapsedUi\":true"));
    }

    #[test]
    fn missing_fields_default() {
        let snapshot: SessionSnapshot =
            serde_json::from_str(r#"{"version":1,"owners":[{"ownerId":3}]}"#).expect("parse");
        assert_eq!(snapshot.union_value, None);
        assert_eq!(snapshot.owners.len(), 1);
        let owner = &snapshot.owners[0];
        assert_eq!(owner.owner_id, NodeId(3));
        assert!(!owner.hide_when_outside);
        assert!(owner.bound_node_ids.is_empty());
    }
}
