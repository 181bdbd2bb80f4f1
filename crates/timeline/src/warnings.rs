//! Short-lived user-facing warnings.
//!
//! Problems the engine works around (a second union control, a vanished
//! binding) surface here so a frontend can show them for a few ticks and
//! let them fade, instead of interrupting the user with a dialog.

use ph_common::{NodeId, Tick};
use tracing::warn;

/// One warning with an expiry tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TransientWarning {
    pub message: String,
    pub node: Option<NodeId>,
    pub expires_at: Tick,
}

/// Ordered log of live warnings. Expired entries are pruned each tick.
#[derive(Debug, Default)]
pub struct WarningLog {
    entries: Vec<TransientWarning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, node: Option<NodeId>, expires_at: Tick) {
        let message = message.into();
        match node {
            Some(id) => warn!(node_id = %id, message, "transient warning raised"),
            None => warn!(message, "transient warning raised"),
        }
        self.entries.push(TransientWarning {
            message,
            node,
            expires_at,
        });
    }

    /// Drop entries whose expiry tick has passed. Returns how many fell off.
    pub fn prune(&mut self, now: Tick) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn active(&self) -> &[TransientWarning] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
