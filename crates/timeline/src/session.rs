//! The per-document engine session.
//!
//! One `TimelineSession` holds everything the engine knows about one open
//! document: the registry of range controls, the adopted union control,
//! the bound groups, the task queue, and the live warnings. Nothing here
//! is shared across documents.
//!
//! The host drives the session from its cooperative loop: document
//! events go through [`TimelineSession::handle_event`], and each pass
//! calls [`TimelineSession::tick`] to drain due tasks. Everything the
//! session defers goes through its own queue, so multi-tick settling is
//! observable from outside instead of buried in callback chains.

use std::collections::{BTreeMap, HashMap};

use ph_common::{parse_interval_label, EngineConfig, NodeId, NodeKind, Span, Tick};
use ph_event_eval::{resolve, sort_by_start, EventTuple, Resolution};
use ph_host::{DocEvent, DocumentHost, TickScheduler};
use ph_project::{OwnerState, PendingBindings, ResolvedBindings, SessionSnapshot};
use tracing::{debug, info, warn};

use crate::binding::{transition, BindingPhase};
use crate::control::RangeControl;
use crate::error::EngineError;
use crate::propagate::{self, BoundGroup, GroupMode};
use crate::registry::{RangeRegistry, RegistryEvent};
use crate::tasks::Task;
use crate::union::UnionController;
use crate::warnings::{TransientWarning, WarningLog};

/// Engine state for one open document.
#[derive(Debug)]
pub struct TimelineSession {
    config: EngineConfig,
    phase: BindingPhase,
    registry: RangeRegistry,
    union: Option<UnionController>,
    groups: BTreeMap<NodeId, BoundGroup>,
    label_index: HashMap<String, NodeId>,
    scheduler: TickScheduler<Task>,
    warnings: WarningLog,
    pending_restore: Option<PendingBindings>,
    recompute_queued: bool,
}

impl TimelineSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            phase: BindingPhase::Uninitialized,
            registry: RangeRegistry::new(),
            union: None,
            groups: BTreeMap::new(),
            label_index: HashMap::new(),
            scheduler: TickScheduler::new(),
            warnings: WarningLog::new(),
            pending_restore: None,
            recompute_queued: false,
        }
    }

    // -- Introspection --

    pub fn phase(&self) -> BindingPhase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn registry(&self) -> &RangeRegistry {
        &self.registry
    }

    pub fn union_id(&self) -> Option<NodeId> {
        self.union.as_ref().map(UnionController::id)
    }

    pub fn union_range(&self) -> Option<Span> {
        self.union.as_ref().map(UnionController::range)
    }

    pub fn union_value(&self) -> Option<f64> {
        self.union.as_ref().map(UnionController::value)
    }

    pub fn group(&self, owner: NodeId) -> Option<&BoundGroup> {
        self.groups.get(&owner)
    }

    pub fn groups(&self) -> impl Iterator<Item = &BoundGroup> {
        self.groups.values()
    }

    pub fn active_warnings(&self) -> &[TransientWarning] {
        self.warnings.active()
    }

    // -- Lifecycle --

    /// Attach to a document and scan every existing node. The union
    /// control and its slaves may appear in any order; whichever comes
    /// last completes the binding.
    pub fn bind(&mut self, host: &mut dyn DocumentHost) {
        if self.phase.is_watching() {
            debug!(phase = %self.phase, "bind ignored");
            return;
        }
        transition(&mut self.phase, BindingPhase::Scanning);
        info!("session attached, scanning document");
        for id in host.node_ids() {
            self.classify_node(host, id);
        }
        debug!(
            tracked = self.registry.len(),
            groups = self.groups.len(),
            bound = self.phase.is_bound(),
            "initial scan complete"
        );
    }

    /// Detach from the document, clearing statuses and every binding.
    pub fn unbind(&mut self, host: &mut dyn DocumentHost) {
        if self.phase == BindingPhase::Unbound {
            return;
        }
        for (&owner, _) in self.groups.iter() {
            if host.set_status(owner, None).is_err() {
                debug!(owner = %owner, "status not cleared");
            }
        }
        self.groups.clear();
        self.label_index.clear();
        self.union = None;
        self.registry.clear();
        self.pending_restore = None;
        self.recompute_queued = false;
        transition(&mut self.phase, BindingPhase::Unbound);
        info!("session detached");
    }

    /// Feed one document event into the session.
    pub fn handle_event(&mut self, host: &mut dyn DocumentHost, event: DocEvent) {
        if !self.phase.is_watching() {
            return;
        }
        match event {
            DocEvent::NodesAdded(ids) => {
                for id in ids {
                    self.classify_node(host, id);
                }
            }
            DocEvent::NodesRemoved(ids) => {
                for id in ids {
                    self.forget_node(id);
                }
            }
            DocEvent::SolveStart => self.apply_pending_restore(host),
            DocEvent::SolveEnd => self.after_solve(host),
        }
    }

    /// Drain the tasks due this pass. Returns how many ran.
    pub fn tick(&mut self, host: &mut dyn DocumentHost) -> usize {
        let tasks = self.scheduler.advance();
        let count = tasks.len();
        for task in tasks {
            self.run_task(host, task);
        }
        self.warnings.prune(self.scheduler.now());
        count
    }

    /// Tick until the queue is empty or the round cap is hit. Tasks may
    /// schedule further tasks, so settling is multi-tick by design.
    pub fn settle(&mut self, host: &mut dyn DocumentHost) -> u32 {
        let mut rounds = 0;
        while !self.scheduler.is_idle() && rounds < self.config.max_settle_rounds {
            self.tick(host);
            rounds += 1;
        }
        if !self.scheduler.is_idle() {
            warn!(
                rounds,
                pending = self.scheduler.pending(),
                "settle stopped at round cap"
            );
        }
        rounds
    }

    // -- Union operations --

    /// Record a new shared time. The write is immediate, the fan-out to
    /// slaves is debounced through the queue.
    pub fn set_union_value(&mut self, value: f64) {
        let Some(union) = self.union.as_mut() else {
            debug!(value, "no union control bound, value ignored");
            return;
        };
        union.on_value_changed(value, &mut self.scheduler, &self.config);
    }

    /// Wire the union control into every node with a time input, skipping
    /// wires that already exist. Returns how many were made.
    pub fn connect_time_inputs(&mut self, host: &mut dyn DocumentHost) -> usize {
        let Some(union_id) = self.union_id() else {
            return 0;
        };
        let mut connected = 0;
        for id in host.node_ids() {
            let Some(kind) = host.node_kind(id) else {
                continue;
            };
            if !kind.caps().has_time_input || host.is_connected(union_id, id) {
                continue;
            }
            match host.connect(union_id, id) {
                Ok(()) => connected += 1,
                Err(err) => warn!(node_id = %id, error = %err, "time input not wired"),
            }
        }
        if connected > 0 {
            info!(union_id = %union_id, connected, "time inputs wired");
        }
        connected
    }

    // -- Event resolution --

    /// Resolve the active event for the current shared time.
    ///
    /// Tuples may arrive in any order; sorting happens here. The outcome
    /// lands on the owner's status line, and the owner's group is
    /// re-evaluated against the same time so scrubbing releases or
    /// suppresses dependents in the same pass.
    pub fn resolve_events(
        &mut self,
        host: &mut dyn DocumentHost,
        owner: NodeId,
        tuples: &[EventTuple],
    ) -> Option<Resolution> {
        let time = self.union_value().unwrap_or(0.0);
        let mut sorted = tuples.to_vec();
        sort_by_start(&mut sorted);
        let resolution = resolve(time, &sorted);
        match &resolution {
            Some(result) => {
                let status = result.status_text(time);
                if let Err(err) = host.set_status(owner, Some(&status)) {
                    debug!(owner = %owner, error = %err, "status not written");
                }
            }
            None => debug!(owner = %owner, "no event tuples to resolve"),
        }
        if let Some(group) = self.groups.get_mut(&owner) {
            if group.mode == GroupMode::Interval {
                let outside = propagate::decide(group, time, host);
                propagate::apply(group, outside, host, &mut self.scheduler, &self.config);
            }
        }
        resolution
    }

    // -- Group operations --

    /// Bind dependents to an owner's group, as a user selection would.
    /// Dead ids are skipped; the rest are deduplicated. Returns how many
    /// were newly bound.
    pub fn declare_dependents(
        &mut self,
        host: &mut dyn DocumentHost,
        owner: NodeId,
        ids: &[NodeId],
    ) -> usize {
        let Some(group) = self.groups.get_mut(&owner) else {
            debug!(owner = %owner, "no group for owner, dependents ignored");
            return 0;
        };
        let mut live = Vec::new();
        for &id in ids {
            if host.node_kind(id).is_none() {
                let err = EngineError::MissingUpstream { id };
                warn!(owner = %owner, error = %err, "dependent skipped");
                continue;
            }
            live.push(id);
        }
        let added = group.add_members(&live);
        if added > 0 {
            group.reset_applied();
            debug!(owner = %owner, added, members = group.members.len(), "dependents bound");
        }
        added
    }

    pub fn set_group_flags(&mut self, owner: NodeId, hide: bool, lock: bool) {
        if let Some(group) = self.groups.get_mut(&owner) {
            if group.hide_when_outside != hide || group.lock_when_outside != lock {
                group.hide_when_outside = hide;
                group.lock_when_outside = lock;
                group.reset_applied();
                debug!(owner = %owner, hide, lock, "group flags changed");
            }
        }
    }

    pub fn set_group_mode(&mut self, owner: NodeId, mode: GroupMode) {
        if let Some(group) = self.groups.get_mut(&owner) {
            if group.mode != mode {
                group.mode = mode;
                group.reset_applied();
                debug!(owner = %owner, ?mode, "group mode changed");
            }
        }
    }

    pub fn set_collapsed(&mut self, owner: NodeId, collapsed: bool) {
        if let Some(group) = self.groups.get_mut(&owner) {
            group.collapsed_ui = collapsed;
        }
    }

    // -- Persistence --

    /// Capture everything worth persisting.
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::new();
        snapshot.union_value = self.union.as_ref().map(UnionController::value);
        for (&owner, group) in &self.groups {
            let mut state = OwnerState::new(owner);
            state.hide_when_outside = group.hide_when_outside;
            state.lock_when_outside = group.lock_when_outside;
            state.use_empty_data_mode = group.mode == GroupMode::EmptyData;
            state.collapsed_ui = group.collapsed_ui;
            state.bound_node_ids = group.members.clone();
            snapshot.owners.push(state);
        }
        snapshot
    }

    /// Stage a loaded snapshot. Ids stay unresolved until the next solve
    /// starts, when the full document is guaranteed to exist.
    pub fn begin_restore(&mut self, snapshot: SessionSnapshot) {
        info!(owners = snapshot.owners.len(), "restore staged");
        self.pending_restore = Some(PendingBindings::new(snapshot));
    }

    // -- Internals --

    fn classify_node(&mut self, host: &mut dyn DocumentHost, id: NodeId) {
        let Some(kind) = host.node_kind(id) else {
            return;
        };
        match kind {
            NodeKind::RangeControl => self.track_control(host, id),
            NodeKind::UnionControl => self.adopt_union(host, id),
            NodeKind::EventSource => self.register_event_source(host, id),
            NodeKind::GroupOwner => self.register_group_owner(host, id),
            NodeKind::Other => {}
        }
    }

    /// Start tracking a range control. A parseable label overrides the
    /// host bounds; a malformed one falls back to the default interval;
    /// no label keeps whatever the host reports.
    fn track_control(&mut self, host: &mut dyn DocumentHost, id: NodeId) {
        let host_range = match host.control_range(id) {
            Ok(range) => range,
            Err(err) => {
                warn!(node_id = %id, error = %err, "control skipped");
                return;
            }
        };
        let value = host.control_value(id).unwrap_or(host_range.min());
        let range = match host.label_of(id) {
            Some(label) => match parse_interval_label(&label) {
                Ok(span) => span.normalized(),
                Err(err) => {
                    debug!(node_id = %id, error = %err, "control label unusable, default bounds");
                    self.config.default_range
                }
            },
            None => host_range,
        };
        if range != host_range {
            if let Err(err) = host.set_control_range(id, range) {
                warn!(node_id = %id, error = %err, "control bounds not pushed");
            }
        }
        let mut control = RangeControl::new(id, range, value);
        if let Some(union) = &self.union {
            control.enslave(union.id());
        }
        if let Some(event) = self.registry.track(control) {
            self.on_registry_event(event);
        }
    }

    fn adopt_union(&mut self, host: &mut dyn DocumentHost, id: NodeId) {
        if let Some(union) = &self.union {
            if union.id() != id {
                let existing = union.id();
                warn!(node_id = %id, existing = %existing, "second union control ignored");
                let expires = self.scheduler.now().plus(self.config.warning_ticks);
                self.warnings.push(
                    format!("Only one union control is supported; {id} is ignored"),
                    Some(id),
                    expires,
                );
            }
            return;
        }
        let range = host.control_range(id).unwrap_or(self.config.default_range);
        let value = host.control_value(id).unwrap_or(range.min());
        let union = UnionController::new(id, range, value);
        union.adopt_slaves(&mut self.registry);
        info!(union_id = %id, slaves = self.registry.len(), "union control adopted");
        self.union = Some(union);
        transition(&mut self.phase, BindingPhase::Bound);
        self.queue_recompute();
    }

    fn register_event_source(&mut self, host: &mut dyn DocumentHost, id: NodeId) {
        let Some(label) = host.label_of(id) else {
            debug!(node_id = %id, "event source has no label, left unlinked");
            return;
        };
        if let Some(&holder) = self.label_index.get(&label) {
            if holder != id {
                let err = EngineError::DuplicateLabel {
                    label: label.clone(),
                    holder,
                };
                let expires = self.scheduler.now().plus(self.config.warning_ticks);
                self.warnings.push(err.to_string(), Some(id), expires);
            }
            return;
        }
        self.label_index.insert(label, id);
    }

    fn register_group_owner(&mut self, host: &mut dyn DocumentHost, id: NodeId) {
        if self.groups.contains_key(&id) {
            return;
        }
        let mut group = BoundGroup::new(id, self.config.default_range);
        group.set_interval_from_label(host.label_of(id).as_deref(), &self.config);
        let status = group.status_text();
        if let Err(err) = host.set_status(id, Some(&status)) {
            debug!(node_id = %id, error = %err, "status not written");
        }
        debug!(
            owner = %id,
            interval = %group.interval,
            valid = group.interval_valid,
            "group owner registered"
        );
        self.groups.insert(id, group);
    }

    fn forget_node(&mut self, id: NodeId) {
        if let Some(event) = self.registry.untrack(id) {
            self.on_registry_event(event);
        }
        if self.union.as_ref().is_some_and(|union| union.id() == id) {
            info!(union_id = %id, "union control removed, back to scanning");
            self.union = None;
            for slave_id in self.registry.tracked_ids() {
                if let Some(control) = self.registry.get_mut(slave_id) {
                    control.release();
                }
            }
            transition(&mut self.phase, BindingPhase::Scanning);
        }
        if self.groups.remove(&id).is_some() {
            debug!(owner = %id, "group dropped with its owner");
        }
        for group in self.groups.values_mut() {
            group.prune_member(id);
        }
        self.label_index.retain(|_, holder| *holder != id);
    }

    /// Membership changes all funnel into one deferred range
    /// recomputation; queuing is idempotent while one is pending.
    fn on_registry_event(&mut self, _event: RegistryEvent) {
        self.queue_recompute();
    }

    fn queue_recompute(&mut self) {
        if self.recompute_queued || self.union.is_none() {
            return;
        }
        self.recompute_queued = true;
        self.scheduler
            .schedule_after(self.config.settle_delay_ticks, Task::RecomputeUnionRange);
        if self.phase == BindingPhase::Bound {
            transition(&mut self.phase, BindingPhase::Recomputing);
        }
    }

    /// Second phase of restoration, run when a solve starts and every
    /// node of the document exists. Stored ids resolve to live nodes
    /// here; whatever vanished is dropped with a log line.
    fn apply_pending_restore(&mut self, host: &mut dyn DocumentHost) {
        let Some(pending) = self.pending_restore.take() else {
            return;
        };
        let resolved = pending.resolve(host);
        self.adopt_restored(host, resolved);
    }

    fn adopt_restored(&mut self, host: &mut dyn DocumentHost, resolved: ResolvedBindings) {
        let owner_count = resolved.owners.len();
        for restored in resolved.owners {
            let state = restored.state;
            let owner = state.owner_id;
            for missing in &restored.missing {
                warn!(owner = %owner, node_id = %missing, "restored dependent no longer exists");
            }
            if !self.groups.contains_key(&owner) {
                match host.node_kind(owner) {
                    Some(NodeKind::GroupOwner) => self.register_group_owner(host, owner),
                    _ => {
                        warn!(owner = %owner, "restored owner is not a group owner, skipped");
                        continue;
                    }
                }
            }
            if let Some(group) = self.groups.get_mut(&owner) {
                group.hide_when_outside = state.hide_when_outside;
                group.lock_when_outside = state.lock_when_outside;
                group.collapsed_ui = state.collapsed_ui;
                group.mode = if state.use_empty_data_mode {
                    GroupMode::EmptyData
                } else {
                    GroupMode::Interval
                };
                group.add_members(&state.bound_node_ids);
                group.reset_applied();
            }
        }
        if let Some(value) = resolved.union_value {
            self.set_union_value(value);
        }
        info!(owners = owner_count, "session state restored");
    }

    /// Post-solve housekeeping: catch host-side edits that arrive without
    /// events (bound changes, renames) and re-evaluate data-driven groups.
    fn after_solve(&mut self, host: &mut dyn DocumentHost) {
        for event in self.registry.sync_from_host(host) {
            self.on_registry_event(event);
        }
        if let Some(union) = &self.union {
            let drifted = self
                .registry
                .aggregate_range()
                .is_some_and(|aggregate| aggregate != union.range());
            if drifted {
                self.queue_recompute();
            }
        }
        self.refresh_owner_labels(host);
        self.evaluate_groups(host, GroupMode::EmptyData);
    }

    fn refresh_owner_labels(&mut self, host: &mut dyn DocumentHost) {
        for (&owner, group) in self.groups.iter_mut() {
            if group.set_interval_from_label(host.label_of(owner).as_deref(), &self.config) {
                let status = group.status_text();
                if let Err(err) = host.set_status(owner, Some(&status)) {
                    debug!(owner = %owner, error = %err, "status not written");
                }
            }
        }
    }

    fn evaluate_groups(&mut self, host: &mut dyn DocumentHost, mode: GroupMode) {
        let time = self.union.as_ref().map(UnionController::value).unwrap_or(0.0);
        for group in self.groups.values_mut() {
            if group.mode != mode {
                continue;
            }
            let outside = propagate::decide(group, time, host);
            propagate::apply(group, outside, host, &mut self.scheduler, &self.config);
        }
    }

    fn run_task(&mut self, host: &mut dyn DocumentHost, task: Task) {
        match task {
            Task::RecomputeUnionRange => {
                self.registry.sync_from_host(host);
                self.recompute_queued = false;
                if let Some(union) = self.union.as_mut() {
                    union.recompute_range(&self.registry, host, &mut self.scheduler, &self.config);
                }
                if self.phase == BindingPhase::Recomputing {
                    transition(&mut self.phase, BindingPhase::Bound);
                }
            }
            Task::PropagateUnionValue { generation } => {
                let Some(union) = self.union.as_mut() else {
                    return;
                };
                let applied = union.apply_value(
                    generation,
                    &mut self.registry,
                    host,
                    &mut self.scheduler,
                    &self.config,
                );
                if applied {
                    self.evaluate_groups(host, GroupMode::Interval);
                }
            }
            Task::FinishPropagation { owner, generation } => {
                if let Some(group) = self.groups.get_mut(&owner) {
                    propagate::finish(group, generation, host, &mut self.scheduler);
                }
            }
            Task::WatchdogReset { owner, generation } => {
                if let Some(group) = self.groups.get_mut(&owner) {
                    propagate::watchdog_reset(group, generation, &self.config);
                }
            }
            Task::RequestSolve => host.request_solve(),
        }
    }
}

impl Default for TimelineSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
