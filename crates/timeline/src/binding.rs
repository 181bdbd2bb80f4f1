//! Session lifecycle: from cold start through bound operation to teardown.

use std::fmt;

/// Where the session is in its lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BindingPhase {
    /// Not attached to any document yet.
    #[default]
    Uninitialized,
    /// Attached and watching the document, no union control adopted.
    Scanning,
    /// A union control is adopted and synchronization is live.
    Bound,
    /// Bound, with a range recomputation pending.
    Recomputing,
    /// Detached from the document; the session is inert.
    Unbound,
}

impl BindingPhase {
    /// Whether the session reacts to document events in this phase.
    pub fn is_watching(self) -> bool {
        matches!(
            self,
            BindingPhase::Scanning | BindingPhase::Bound | BindingPhase::Recomputing
        )
    }

    /// Whether a union control is currently adopted.
    pub fn is_bound(self) -> bool {
        matches!(self, BindingPhase::Bound | BindingPhase::Recomputing)
    }
}

impl fmt::Display for BindingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingPhase::Uninitialized => "uninitialized",
            BindingPhase::Scanning => "scanning",
            BindingPhase::Bound => "bound",
            BindingPhase::Recomputing => "recomputing",
            BindingPhase::Unbound => "unbound",
        };
        f.write_str(name)
    }
}

/// Move `phase` to `next`, logging the edge. No-op when already there.
pub(crate) fn transition(phase: &mut BindingPhase, next: BindingPhase) {
    if *phase != next {
        tracing::debug!(from = %phase, to = %next, "binding phase changed");
        *phase = next;
    }
}
