//! In-memory host document.
//!
//! A complete `DocumentHost` implementation backed by plain maps. The
//! engine's tests and the demo binary run against this; a real editor
//! integration swaps in its own implementation of the same trait.

use std::collections::{BTreeMap, BTreeSet};

use ph_common::{NodeId, NodeKind, Span};
use tracing::debug;

use crate::error::{HostError, HostResult};
use crate::traits::DocumentHost;

#[derive(Clone, Debug)]
struct NodeRecord {
    kind: NodeKind,
    label: Option<String>,
    status: Option<String>,
    range: Span,
    value: f64,
    hidden: bool,
    locked: bool,
    cached_output: bool,
    upstream_data: bool,
}

impl NodeRecord {
    fn new(kind: NodeKind, label: Option<&str>) -> Self {
        Self {
            kind,
            label: label.map(str::to_string),
            status: None,
            range: Span::UNIT,
            value: 0.0,
            hidden: false,
            locked: false,
            cached_output: false,
            upstream_data: false,
        }
    }
}

/// Map-backed document with deterministic enumeration order.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: BTreeMap<NodeId, NodeRecord>,
    connections: BTreeSet<(NodeId, NodeId)>,
    next_id: u64,
    solve_requests: u64,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a range control with explicit bounds and value.
    pub fn add_range_control(&mut self, label: &str, range: Span, value: f64) -> NodeId {
        let id = self.add_node(NodeKind::RangeControl, Some(label));
        if let Some(record) = self.nodes.get_mut(&id) {
            record.range = range;
            record.value = range.clamp(value);
        }
        id
    }

    /// Add a union (master) control. Bounds start at the default and are
    /// owned by the engine afterwards.
    pub fn add_union_control(&mut self, label: &str) -> NodeId {
        self.add_node(NodeKind::UnionControl, Some(label))
    }

    pub fn add_event_source(&mut self, label: &str) -> NodeId {
        self.add_node(NodeKind::EventSource, Some(label))
    }

    pub fn add_group_owner(&mut self, label: &str) -> NodeId {
        self.add_node(NodeKind::GroupOwner, Some(label))
    }

    pub fn add_plain_node(&mut self) -> NodeId {
        self.add_node(NodeKind::Other, None)
    }

    // -- Inspection used by tests and the demo --

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|n| n.hidden).unwrap_or(false)
    }

    pub fn is_locked(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|n| n.locked).unwrap_or(false)
    }

    pub fn has_cached_output(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|n| n.cached_output).unwrap_or(false)
    }

    pub fn status_of(&self, id: NodeId) -> Option<String> {
        self.nodes.get(&id).and_then(|n| n.status.clone())
    }

    pub fn solve_requests(&self) -> u64 {
        self.solve_requests
    }

    // -- Simulation knobs used by tests and the demo --

    /// Mark a node as holding (or missing) upstream data.
    pub fn set_upstream_data(&mut self, id: NodeId, present: bool) {
        if let Some(record) = self.nodes.get_mut(&id) {
            record.upstream_data = present;
        }
    }

    /// Mark a node as holding cached output, as a completed solve would.
    pub fn set_cached_output(&mut self, id: NodeId, cached: bool) {
        if let Some(record) = self.nodes.get_mut(&id) {
            record.cached_output = cached;
        }
    }

    /// Replace a node's label, as a rename in the editor would.
    pub fn set_label(&mut self, id: NodeId, label: &str) {
        if let Some(record) = self.nodes.get_mut(&id) {
            record.label = Some(label.to_string());
        }
    }

    fn get(&self, id: NodeId) -> HostResult<&NodeRecord> {
        self.nodes.get(&id).ok_or(HostError::NodeNotFound { id })
    }

    fn get_mut(&mut self, id: NodeId) -> HostResult<&mut NodeRecord> {
        self.nodes.get_mut(&id).ok_or(HostError::NodeNotFound { id })
    }
}

impl DocumentHost for MemoryDocument {
    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).map(|n| n.kind)
    }

    fn label_of(&self, id: NodeId) -> Option<String> {
        self.nodes.get(&id).and_then(|n| n.label.clone())
    }

    fn control_range(&self, id: NodeId) -> HostResult<Span> {
        Ok(self.get(id)?.range)
    }

    fn control_value(&self, id: NodeId) -> HostResult<f64> {
        Ok(self.get(id)?.value)
    }

    fn has_upstream_data(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|n| n.upstream_data).unwrap_or(false)
    }

    fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.connections.contains(&(from, to))
    }

    fn add_node(&mut self, kind: NodeKind, label: Option<&str>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, NodeRecord::new(kind, label));
        debug!(node_id = %id, %kind, "node added");
        id
    }

    fn remove_node(&mut self, id: NodeId) -> HostResult<()> {
        self.nodes.remove(&id).ok_or(HostError::NodeNotFound { id })?;
        self.connections
            .retain(|(from, to)| *from != id && *to != id);
        debug!(node_id = %id, "node removed");
        Ok(())
    }

    fn set_control_range(&mut self, id: NodeId, range: Span) -> HostResult<()> {
        let record = self.get_mut(id)?;
        record.range = range;
        record.value = range.clamp(record.value);
        Ok(())
    }

    fn set_control_value(&mut self, id: NodeId, value: f64) -> HostResult<()> {
        let record = self.get_mut(id)?;
        record.value = record.range.clamp(value);
        Ok(())
    }

    fn set_hidden(&mut self, id: NodeId, hidden: bool) -> HostResult<()> {
        let record = self.get_mut(id)?;
        record.hidden = hidden;
        debug!(node_id = %id, hidden, "hidden flag set");
        Ok(())
    }

    fn set_locked(&mut self, id: NodeId, locked: bool) -> HostResult<()> {
        let record = self.get_mut(id)?;
        record.locked = locked;
        debug!(node_id = %id, locked, "locked flag set");
        Ok(())
    }

    fn clear_cached_output(&mut self, id: NodeId) -> HostResult<()> {
        let record = self.get_mut(id)?;
        record.cached_output = false;
        Ok(())
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> HostResult<()> {
        if from == to {
            return Err(HostError::InvalidConnection {
                from,
                to,
                reason: "self connection".to_string(),
            });
        }
        self.get(from)?;
        self.get(to)?;
        self.connections.insert((from, to));
        Ok(())
    }

    fn disconnect(&mut self, from: NodeId, to: NodeId) -> HostResult<()> {
        self.connections.remove(&(from, to));
        Ok(())
    }

    fn set_status(&mut self, id: NodeId, status: Option<&str>) -> HostResult<()> {
        let record = self.get_mut(id)?;
        record.status = status.map(str::to_string);
        Ok(())
    }

    fn request_solve(&mut self) {
        self.solve_requests += 1;
    }
}
