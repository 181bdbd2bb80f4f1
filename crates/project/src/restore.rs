//! Two-phase identifier restoration.
//!
//! Snapshots store node identifiers verbatim, but at load time the host
//! document is still materializing: nodes referenced by an owner may not
//! exist yet, and resolving eagerly would drop bindings that are merely
//! late. So restoration splits in two:
//!
//! 1. **Parked**: `PendingBindings` holds the raw snapshot ids, untouched.
//! 2. **Resolved**: once the host reports the document complete (first
//!    solve start is the customary moment), [`PendingBindings::resolve`]
//!    checks every id against the live document and produces only
//!    bindings whose nodes actually exist.
//!
//! Ids that never materialize are reported, not errored: a snapshot from
//! a document that lost nodes still restores everything it can.

use ph_common::NodeId;
use ph_host::DocumentHost;
use tracing::{debug, warn};

use crate::types::{OwnerState, SessionSnapshot};

/// Phase one: snapshot ids parked verbatim, waiting for the document.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingBindings {
    snapshot: SessionSnapshot,
}

impl PendingBindings {
    pub fn new(snapshot: SessionSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn owner_count(&self) -> usize {
        self.snapshot.owners.len()
    }

    /// Phase two: resolve parked ids against the live document.
    ///
    /// Owners whose node no longer exists are dropped with a warning.
    /// Dependent ids that no longer exist are pruned and listed in
    /// [`ResolvedOwner::missing`].
    pub fn resolve(self, doc: &dyn DocumentHost) -> ResolvedBindings {
        let mut owners = Vec::new();

        for mut state in self.snapshot.owners {
            if doc.node_kind(state.owner_id).is_none() {
                warn!(owner_id = %state.owner_id, "Restored owner no longer exists, skipped");
                continue;
            }

            let (live, missing): (Vec<NodeId>, Vec<NodeId>) = state
                .bound_node_ids
                .iter()
                .partition(|id| doc.node_kind(**id).is_some());

            for id in &missing {
                debug!(owner_id = %state.owner_id, node_id = %id, "Restored dependent missing");
            }

            state.bound_node_ids = live;
            owners.push(ResolvedOwner { state, missing });
        }

        debug!(
            owners = owners.len(),
            union_value = ?self.snapshot.union_value,
            "Snapshot bindings resolved"
        );

        ResolvedBindings {
            union_value: self.snapshot.union_value,
            owners,
        }
    }
}

/// Phase-two output: bindings whose nodes all exist.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ResolvedBindings {
    pub union_value: Option<f64>,
    pub owners: Vec<ResolvedOwner>,
}

/// One restored owner, with the ids that failed to resolve.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOwner {
    /// Owner state with `bound_node_ids` pruned to live nodes.
    pub state: OwnerState,
    /// Ids from the snapshot that no longer exist.
    pub missing: Vec<NodeId>,
}
