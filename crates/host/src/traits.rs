//! Host document abstraction trait.
//!
//! The engine never touches a concrete host type. Everything it needs
//! from the surrounding editor — node queries, flag mutations, wiring,
//! solve requests — goes through `DocumentHost`, so the engine drives a
//! real editor document and the in-memory test double identically.

use ph_common::{NodeId, NodeKind, Span};

use crate::error::HostError;

/// One open document of the host editor, as seen by the engine.
///
/// All mutations are fallible: a node can disappear between the event
/// that announced it and the engine acting on it. Callers treat every
/// error as "that node is gone, skip it."
pub trait DocumentHost {
    // -- Queries --

    /// All live node identifiers, in a stable enumeration order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Kind of a node, `None` when the node does not exist.
    fn node_kind(&self, id: NodeId) -> Option<NodeKind>;

    /// The node's free-text label, when it has one.
    fn label_of(&self, id: NodeId) -> Option<String>;

    /// Current bounds of a range-control node.
    fn control_range(&self, id: NodeId) -> Result<Span, HostError>;

    /// Current value of a range-control node.
    fn control_value(&self, id: NodeId) -> Result<f64, HostError>;

    /// Whether any upstream data is currently present at the node.
    fn has_upstream_data(&self, id: NodeId) -> bool;

    /// Whether a data connection `from -> to` exists.
    fn is_connected(&self, from: NodeId, to: NodeId) -> bool;

    /// All live nodes of one kind.
    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.node_ids()
            .into_iter()
            .filter(|id| self.node_kind(*id) == Some(kind))
            .collect()
    }

    // -- Mutations --

    /// Create a node. Hosts assign the identifier.
    fn add_node(&mut self, kind: NodeKind, label: Option<&str>) -> NodeId;

    /// Delete a node and its connections.
    fn remove_node(&mut self, id: NodeId) -> Result<(), HostError>;

    /// Replace a range-control node's bounds.
    fn set_control_range(&mut self, id: NodeId, range: Span) -> Result<(), HostError>;

    /// Replace a range-control node's value.
    fn set_control_value(&mut self, id: NodeId, value: f64) -> Result<(), HostError>;

    /// Toggle the hidden (preview-off) flag.
    fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<(), HostError>;

    /// Toggle the locked (disabled) flag.
    fn set_locked(&mut self, id: NodeId, locked: bool) -> Result<(), HostError>;

    /// Drop the node's cached output so the next solve recomputes it.
    fn clear_cached_output(&mut self, id: NodeId) -> Result<(), HostError>;

    /// Add a data connection `from -> to`. Adding an existing connection
    /// is a no-op.
    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), HostError>;

    /// Remove a data connection `from -> to`.
    fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<(), HostError>;

    /// Attach or clear a short status text shown on the node.
    fn set_status(&mut self, id: NodeId, status: Option<&str>) -> Result<(), HostError>;

    /// Ask the host for one incremental recomputation pass. Requests are
    /// queued by the host; issuing several before it runs is fine.
    fn request_solve(&mut self);
}
