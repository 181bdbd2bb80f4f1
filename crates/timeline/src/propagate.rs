//! Hide/lock propagation to the nodes bound to a group owner.
//!
//! Each group owner carries an interval and a set of dependent nodes.
//! When the shared time leaves the interval the dependents are hidden
//! and/or locked; when it re-enters they are released. Transitions are
//! edge-triggered off `last_applied`, so a time sweep toggles each flag
//! once per crossing, not once per update.
//!
//! A propagation is a guarded two-step: flags are written immediately,
//! then a deferred finish task requests one solve and returns the group
//! to idle. A watchdog task reclaims the guard if the finish never runs.

use ph_common::{parse_interval_label, EngineConfig, NodeId, Span, EPSILON};
use ph_host::{DocumentHost, HostError, TaskHandle, TickScheduler};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::tasks::Task;

/// Whether a group is mid-propagation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PropagationState {
    #[default]
    Idle,
    Propagating,
}

/// What "outside" means for a group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GroupMode {
    /// Outside when the shared time leaves the owner's interval.
    #[default]
    Interval,
    /// Outside when the owner has no upstream data.
    EmptyData,
}

/// One group owner, its interval, and the dependents it governs.
#[derive(Debug)]
pub struct BoundGroup {
    pub owner: NodeId,
    pub members: Vec<NodeId>,
    pub hide_when_outside: bool,
    pub lock_when_outside: bool,
    pub collapsed_ui: bool,
    pub mode: GroupMode,
    pub interval: Span,
    /// False when the owner's label failed to parse and the default
    /// interval is standing in.
    pub interval_valid: bool,
    last_applied: Option<bool>,
    state: PropagationState,
    generation: u64,
    watchdog: Option<TaskHandle>,
}

impl BoundGroup {
    pub fn new(owner: NodeId, interval: Span) -> Self {
        Self {
            owner,
            members: Vec::new(),
            hide_when_outside: false,
            lock_when_outside: false,
            collapsed_ui: false,
            mode: GroupMode::Interval,
            interval,
            interval_valid: true,
            last_applied: None,
            state: PropagationState::Idle,
            generation: 0,
            watchdog: None,
        }
    }

    pub fn state(&self) -> PropagationState {
        self.state
    }

    pub fn is_propagating(&self) -> bool {
        self.state == PropagationState::Propagating
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_applied(&self) -> Option<bool> {
        self.last_applied
    }

    /// Forget the last applied state so the next decide/apply runs even
    /// if containment has not changed. Used after flag or mode edits.
    pub fn reset_applied(&mut self) {
        self.last_applied = None;
    }

    /// Re-derive the interval from the owner's label. A missing or
    /// malformed label falls back to the configured default interval.
    /// Returns true when interval or validity changed.
    pub fn set_interval_from_label(&mut self, label: Option<&str>, config: &EngineConfig) -> bool {
        let parsed = match label {
            Some(text) => match parse_interval_label(text) {
                Ok(span) => Some(span),
                Err(err) => {
                    debug!(owner = %self.owner, error = %err, "owner label unusable");
                    None
                }
            },
            None => None,
        };
        let (interval, valid) = match parsed {
            Some(span) => (span, true),
            None => (config.default_range, false),
        };
        let changed = interval != self.interval || valid != self.interval_valid;
        self.interval = interval;
        self.interval_valid = valid;
        changed
    }

    /// Status line for the owner node.
    pub fn status_text(&self) -> String {
        if self.interval_valid {
            self.interval.to_string()
        } else {
            "Invalid Interval".to_string()
        }
    }

    /// Add dependents, skipping duplicates and the owner itself.
    pub fn add_members(&mut self, ids: &[NodeId]) -> usize {
        let mut added = 0;
        for &id in ids {
            if id == self.owner || self.members.contains(&id) {
                continue;
            }
            self.members.push(id);
            added += 1;
        }
        added
    }

    /// Drop a vanished dependent. When the last one goes, the hide and
    /// lock flags switch off so the group cannot act on stale bindings.
    pub fn prune_member(&mut self, id: NodeId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != id);
        let removed = self.members.len() != before;
        if removed && self.members.is_empty() {
            self.hide_when_outside = false;
            self.lock_when_outside = false;
            debug!(owner = %self.owner, "last dependent gone, hide/lock disabled");
        }
        removed
    }
}

/// Whether the group's dependents should currently be suppressed.
pub fn decide(group: &BoundGroup, time: f64, host: &dyn DocumentHost) -> bool {
    match group.mode {
        GroupMode::Interval => !group.interval.contains_with_tolerance(time, EPSILON),
        GroupMode::EmptyData => !host.has_upstream_data(group.owner),
    }
}

/// Push `outside` onto the group's dependents if it differs from the last
/// applied state.
///
/// Flags land on the host immediately; the follow-up solve request and the
/// return to idle run as a deferred finish task. A watchdog is scheduled
/// alongside it in case the finish never fires. Returns true when a
/// propagation actually started.
pub fn apply(
    group: &mut BoundGroup,
    outside: bool,
    host: &mut dyn DocumentHost,
    scheduler: &mut TickScheduler<Task>,
    config: &EngineConfig,
) -> bool {
    if group.state == PropagationState::Propagating {
        debug!(owner = %group.owner, "propagation in flight, apply ignored");
        return false;
    }
    if group.last_applied == Some(outside) {
        return false;
    }
    if !group.hide_when_outside && !group.lock_when_outside {
        group.last_applied = Some(outside);
        return false;
    }

    group.state = PropagationState::Propagating;
    group.generation += 1;
    info!(
        owner = %group.owner,
        outside,
        members = group.members.len(),
        "group state propagation started"
    );

    let hide = group.hide_when_outside;
    let lock = group.lock_when_outside;
    for id in group.members.clone() {
        if let Err(err) = apply_to_member(id, outside, hide, lock, host) {
            warn!(node_id = %id, error = %err, "dependent left unchanged");
        }
    }
    group.last_applied = Some(outside);

    scheduler.schedule_after(
        config.apply_delay_ticks,
        Task::FinishPropagation {
            owner: group.owner,
            generation: group.generation,
        },
    );
    let watchdog = scheduler.schedule_after(
        config.watchdog_budget_ticks,
        Task::WatchdogReset {
            owner: group.owner,
            generation: group.generation,
        },
    );
    group.watchdog = Some(watchdog);
    true
}

fn apply_to_member(
    id: NodeId,
    outside: bool,
    hide: bool,
    lock: bool,
    host: &mut dyn DocumentHost,
) -> Result<(), HostError> {
    if hide {
        host.set_hidden(id, outside)?;
    }
    if lock {
        host.set_locked(id, outside)?;
        if outside {
            host.clear_cached_output(id)?;
        }
    }
    Ok(())
}

/// Close out a propagation: cancel its watchdog, request the one solve
/// covering the batch, return to idle. Stale generations are ignored.
pub fn finish(
    group: &mut BoundGroup,
    generation: u64,
    host: &mut dyn DocumentHost,
    scheduler: &mut TickScheduler<Task>,
) -> bool {
    if generation != group.generation || group.state != PropagationState::Propagating {
        return false;
    }
    group.state = PropagationState::Idle;
    if let Some(handle) = group.watchdog.take() {
        scheduler.cancel(handle);
    }
    host.request_solve();
    debug!(owner = %group.owner, "group state propagation finished");
    true
}

/// Reclaim the guard of a propagation whose finish never ran. Returns
/// true when the group was actually stuck.
pub fn watchdog_reset(group: &mut BoundGroup, generation: u64, config: &EngineConfig) -> bool {
    if generation != group.generation || group.state != PropagationState::Propagating {
        return false;
    }
    group.state = PropagationState::Idle;
    group.watchdog = None;
    let timeout = EngineError::PropagationTimeout {
        owner: group.owner,
        budget: config.watchdog_budget_ticks,
    };
    warn!(error = %timeout, "stuck propagation reset by watchdog");
    true
}
