//! Registry of range controls participating in range synchronization.
//!
//! The registry is a passive index: it tracks controls, answers lookups,
//! and reports membership changes as [`RegistryEvent`]s for the session to
//! route. It never calls into the union controller or the propagation
//! machinery itself.

use std::collections::BTreeMap;

use ph_common::{NodeId, Span};
use ph_host::DocumentHost;
use tracing::debug;

use crate::control::RangeControl;

/// Membership change reported by [`RangeRegistry::track`] and friends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    Tracked(NodeId),
    Untracked(NodeId),
}

/// Index of every range control currently under engine management.
#[derive(Debug, Default)]
pub struct RangeRegistry {
    controls: BTreeMap<NodeId, RangeControl>,
}

impl RangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a control. Returns `None` when the id is already
    /// tracked, leaving the existing mirror untouched.
    pub fn track(&mut self, control: RangeControl) -> Option<RegistryEvent> {
        let id = control.id;
        if self.controls.contains_key(&id) {
            debug!(node_id = %id, "control already tracked");
            return None;
        }
        self.controls.insert(id, control);
        debug!(node_id = %id, tracked = self.controls.len(), "control tracked");
        Some(RegistryEvent::Tracked(id))
    }

    /// Stops tracking a control. Unknown ids are ignored.
    pub fn untrack(&mut self, id: NodeId) -> Option<RegistryEvent> {
        if self.controls.remove(&id).is_none() {
            return None;
        }
        debug!(node_id = %id, tracked = self.controls.len(), "control untracked");
        Some(RegistryEvent::Untracked(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.controls.contains_key(&id)
    }

    /// Drop every tracked control without reporting events. Teardown only.
    pub fn clear(&mut self) {
        self.controls.clear();
    }

    pub fn get(&self, id: NodeId) -> Option<&RangeControl> {
        self.controls.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RangeControl> {
        self.controls.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Snapshot of tracked ids, safe to iterate while mutating the registry.
    pub fn tracked_ids(&self) -> Vec<NodeId> {
        self.controls.keys().copied().collect()
    }

    pub fn controls(&self) -> impl Iterator<Item = &RangeControl> {
        self.controls.values()
    }

    /// Union of all tracked ranges, or `None` when nothing is tracked.
    pub fn aggregate_range(&self) -> Option<Span> {
        let mut controls = self.controls.values();
        let first = controls.next()?;
        let mut union = first.range.normalized();
        for control in controls {
            union = union.union(control.range);
        }
        Some(union)
    }

    /// Refreshes every mirror from the host. Controls whose node vanished
    /// without a removal notice are dropped and reported as untracked.
    pub fn sync_from_host(&mut self, host: &dyn DocumentHost) -> Vec<RegistryEvent> {
        let mut events = Vec::new();
        for id in self.tracked_ids() {
            let (range, value) = match (host.control_range(id), host.control_value(id)) {
                (Ok(range), Ok(value)) => (range, value),
                _ => {
                    debug!(node_id = %id, "tracked control vanished from host");
                    if let Some(event) = self.untrack(id) {
                        events.push(event);
                    }
                    continue;
                }
            };
            if let Some(control) = self.controls.get_mut(&id) {
                control.range = range;
                control.value = range.clamp(value);
            }
        }
        events
    }
}
