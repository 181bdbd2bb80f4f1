//! Union controller: the master control over every tracked range.
//!
//! The union's bounds are the aggregate of all slave ranges. Its value is
//! the shared playhead: when it moves, the value fans out to every slave
//! whose own range contains it. Fan-outs run as deferred tasks; a
//! generation counter lets rapid edits supersede queued work so only the
//! final value is ever applied.

use ph_common::{EngineConfig, NodeId, Span};
use ph_host::{DocumentHost, TickScheduler};
use tracing::{debug, warn};

use crate::control::RangeControl;
use crate::registry::RangeRegistry;
use crate::tasks::Task;

/// The adopted master control and its fan-out state.
#[derive(Debug)]
pub struct UnionController {
    control: RangeControl,
    generation: u64,
    applying: bool,
    pending_value: Option<f64>,
}

impl UnionController {
    pub fn new(id: NodeId, range: Span, value: f64) -> Self {
        Self {
            control: RangeControl::new(id, range, value),
            generation: 0,
            applying: false,
            pending_value: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.control.id
    }

    pub fn range(&self) -> Span {
        self.control.range
    }

    pub fn value(&self) -> f64 {
        self.control.value
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mark every tracked control as a slave of this union. Returns how
    /// many changed hands.
    pub fn adopt_slaves(&self, registry: &mut RangeRegistry) -> usize {
        let id = self.control.id;
        let mut adopted = 0;
        for slave_id in registry.tracked_ids() {
            if let Some(control) = registry.get_mut(slave_id) {
                if control.controller != Some(id) {
                    control.enslave(id);
                    adopted += 1;
                }
            }
        }
        if adopted > 0 {
            debug!(union_id = %id, adopted, "slaves adopted");
        }
        adopted
    }

    /// Re-derive the union bounds from the tracked slave ranges.
    ///
    /// Returns true when the bounds moved. A move re-clamps the held
    /// value, pushes both onto the host's union node, and schedules a
    /// fresh fan-out plus a solve request. With nothing tracked the
    /// current bounds are kept.
    pub fn recompute_range(
        &mut self,
        registry: &RangeRegistry,
        host: &mut dyn DocumentHost,
        scheduler: &mut TickScheduler<Task>,
        config: &EngineConfig,
    ) -> bool {
        let Some(aggregate) = registry.aggregate_range() else {
            debug!(union_id = %self.control.id, "nothing tracked, union range kept");
            return false;
        };
        if aggregate == self.control.range {
            return false;
        }
        debug!(
            union_id = %self.control.id,
            old = %self.control.range,
            new = %aggregate,
            "union range recomputed"
        );
        self.control.set_range(aggregate);
        let pushed = host
            .set_control_range(self.control.id, aggregate)
            .and_then(|()| host.set_control_value(self.control.id, self.control.value));
        if let Err(err) = pushed {
            warn!(union_id = %self.control.id, error = %err, "union bounds not pushed");
        }
        self.generation += 1;
        scheduler.schedule_after(
            config.apply_delay_ticks,
            Task::PropagateUnionValue {
                generation: self.generation,
            },
        );
        scheduler.schedule_after(config.apply_delay_ticks, Task::RequestSolve);
        true
    }

    /// Record a new union value.
    ///
    /// The value lands immediately; the fan-out to slaves is debounced, so
    /// a burst of calls queues several tasks of which only the last
    /// generation does any work. A change arriving while a fan-out is
    /// mid-flight is parked and replayed right after it.
    pub fn on_value_changed(
        &mut self,
        value: f64,
        scheduler: &mut TickScheduler<Task>,
        config: &EngineConfig,
    ) {
        let clamped = self.control.range.clamp(value);
        if self.applying {
            self.pending_value = Some(clamped);
            debug!(union_id = %self.control.id, value = clamped, "value parked during fan-out");
            return;
        }
        self.control.set_value(clamped);
        self.generation += 1;
        scheduler.schedule_after(
            config.debounce_ticks,
            Task::PropagateUnionValue {
                generation: self.generation,
            },
        );
        debug!(
            union_id = %self.control.id,
            value = clamped,
            generation = self.generation,
            "union value change debounced"
        );
    }

    /// Drain one queued fan-out.
    ///
    /// A stale generation means a newer change superseded this task; it is
    /// dropped without touching anything. Otherwise every slave whose
    /// range contains the value receives it, one failed slave is skipped,
    /// and a single solve request covers the batch.
    pub fn apply_value(
        &mut self,
        generation: u64,
        registry: &mut RangeRegistry,
        host: &mut dyn DocumentHost,
        scheduler: &mut TickScheduler<Task>,
        config: &EngineConfig,
    ) -> bool {
        if generation != self.generation {
            debug!(
                union_id = %self.control.id,
                stale = generation,
                current = self.generation,
                "superseded fan-out dropped"
            );
            return false;
        }
        if self.applying {
            return false;
        }
        self.applying = true;
        let value = self.control.value;
        if let Err(err) = host.set_control_value(self.control.id, value) {
            warn!(union_id = %self.control.id, error = %err, "union value not mirrored");
        }
        let mut updated = 0usize;
        for id in registry.tracked_ids() {
            let Some(slave) = registry.get_mut(id) else {
                continue;
            };
            if !slave.range.contains(value) {
                continue;
            }
            slave.set_value(value);
            let pushed = host
                .set_control_value(id, value)
                .and_then(|()| host.clear_cached_output(id));
            if let Err(err) = pushed {
                warn!(node_id = %id, error = %err, "slave update skipped");
                continue;
            }
            updated += 1;
        }
        self.applying = false;
        debug!(union_id = %self.control.id, value, updated, "union value fanned out");
        if updated > 0 {
            scheduler.schedule_after(config.apply_delay_ticks, Task::RequestSolve);
        }
        if let Some(parked) = self.pending_value.take() {
            self.on_value_changed(parked, scheduler, config);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ph_host::MemoryDocument;

    fn tracked_pair(doc: &mut MemoryDocument) -> (RangeRegistry, NodeId, NodeId) {
        let a = doc.add_range_control("0-50", Span::new(0.0, 50.0), 0.0);
        let b = doc.add_range_control("25-100", Span::new(25.0, 100.0), 25.0);
        let mut registry = RangeRegistry::new();
        registry.track(RangeControl::new(a, Span::new(0.0, 50.0), 0.0));
        registry.track(RangeControl::new(b, Span::new(25.0, 100.0), 25.0));
        (registry, a, b)
    }

    #[test]
    fn recompute_spans_all_slaves() {
        let mut doc = MemoryDocument::new();
        let (registry, _, _) = tracked_pair(&mut doc);
        let union_id = doc.add_union_control("union");
        let mut union = UnionController::new(union_id, Span::UNIT, 0.0);
        let mut scheduler = TickScheduler::new();
        let config = EngineConfig::default();

        assert!(union.recompute_range(&registry, &mut doc, &mut scheduler, &config));
        assert_eq!(union.range(), Span::new(0.0, 100.0));
        // the host's union node carries the new bounds too
        assert_eq!(doc.control_range(union_id).expect("union"), Span::new(0.0, 100.0));
        assert_eq!(scheduler.pending(), 2);
    }

    #[test]
    fn recompute_without_change_schedules_nothing() {
        let mut doc = MemoryDocument::new();
        let (registry, _, _) = tracked_pair(&mut doc);
        let union_id = doc.add_union_control("union");
        let mut union = UnionController::new(union_id, Span::UNIT, 0.0);
        let mut scheduler = TickScheduler::new();
        let config = EngineConfig::default();

        union.recompute_range(&registry, &mut doc, &mut scheduler, &config);
        let queued = scheduler.pending();
        assert!(!union.recompute_range(&registry, &mut doc, &mut scheduler, &config));
        assert_eq!(scheduler.pending(), queued);
    }

    #[test]
    fn recompute_with_empty_registry_keeps_range() {
        let mut doc = MemoryDocument::new();
        let mut union = UnionController::new(NodeId(9), Span::new(0.0, 100.0), 40.0);
        let mut scheduler = TickScheduler::new();
        assert!(!union.recompute_range(
            &RangeRegistry::new(),
            &mut doc,
            &mut scheduler,
            &EngineConfig::default()
        ));
        assert_eq!(union.range(), Span::new(0.0, 100.0));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn range_shrink_reclamps_value() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_range_control("0-50", Span::new(0.0, 50.0), 0.0);
        let mut registry = RangeRegistry::new();
        registry.track(RangeControl::new(a, Span::new(0.0, 50.0), 0.0));

        let union_id = doc.add_union_control("union");
        let mut union = UnionController::new(union_id, Span::new(0.0, 200.0), 150.0);
        let mut scheduler = TickScheduler::new();
        union.recompute_range(&registry, &mut doc, &mut scheduler, &EngineConfig::default());

        assert_eq!(union.range(), Span::new(0.0, 50.0));
        assert_eq!(union.value(), 50.0);
        assert_eq!(doc.control_value(union_id).expect("union"), 50.0);
    }

    #[test]
    fn adopt_marks_all_tracked_controls() {
        let mut doc = MemoryDocument::new();
        let (mut registry, a, b) = tracked_pair(&mut doc);
        let union = UnionController::new(NodeId(99), Span::UNIT, 0.0);

        assert_eq!(union.adopt_slaves(&mut registry), 2);
        assert_eq!(union.adopt_slaves(&mut registry), 0);
        assert_eq!(registry.get(a).map(|c| c.controller), Some(Some(NodeId(99))));
        assert_eq!(registry.get(b).map(|c| c.controller), Some(Some(NodeId(99))));
    }

    #[test]
    fn fan_out_skips_slaves_outside_their_range() {
        let mut doc = MemoryDocument::new();
        let (mut registry, a, b) = tracked_pair(&mut doc);
        let union_id = doc.add_union_control("union");
        let mut union = UnionController::new(union_id, Span::new(0.0, 100.0), 0.0);
        let mut scheduler = TickScheduler::new();
        let config = EngineConfig::default();

        union.on_value_changed(10.0, &mut scheduler, &config);
        assert!(union.apply_value(
            union.generation(),
            &mut registry,
            &mut doc,
            &mut scheduler,
            &config
        ));

        assert_eq!(doc.control_value(a).expect("a"), 10.0);
        // b's range starts at 25, so 10 never reaches it
        assert_eq!(doc.control_value(b).expect("b"), 25.0);
    }

    #[test]
    fn fan_out_reaches_all_containing_slaves() {
        let mut doc = MemoryDocument::new();
        let (mut registry, a, b) = tracked_pair(&mut doc);
        let union_id = doc.add_union_control("union");
        doc.set_cached_output(a, true);
        doc.set_cached_output(b, true);
        let mut union = UnionController::new(union_id, Span::new(0.0, 100.0), 0.0);
        let mut scheduler = TickScheduler::new();
        let config = EngineConfig::default();

        union.on_value_changed(30.0, &mut scheduler, &config);
        union.apply_value(
            union.generation(),
            &mut registry,
            &mut doc,
            &mut scheduler,
            &config,
        );

        assert_eq!(doc.control_value(a).expect("a"), 30.0);
        assert_eq!(doc.control_value(b).expect("b"), 30.0);
        // updated slaves lose their cached output ahead of the solve
        assert!(!doc.has_cached_output(a));
        assert!(!doc.has_cached_output(b));
    }

    #[test]
    fn stale_generation_is_dropped() {
        let mut doc = MemoryDocument::new();
        let (mut registry, a, _) = tracked_pair(&mut doc);
        let union_id = doc.add_union_control("union");
        let mut union = UnionController::new(union_id, Span::new(0.0, 100.0), 0.0);
        let mut scheduler = TickScheduler::new();
        let config = EngineConfig::default();

        union.on_value_changed(10.0, &mut scheduler, &config);
        let first = union.generation();
        union.on_value_changed(20.0, &mut scheduler, &config);

        assert!(!union.apply_value(first, &mut registry, &mut doc, &mut scheduler, &config));
        assert_eq!(doc.control_value(a).expect("a"), 0.0);

        assert!(union.apply_value(
            union.generation(),
            &mut registry,
            &mut doc,
            &mut scheduler,
            &config
        ));
        assert_eq!(doc.control_value(a).expect("a"), 20.0);
    }

    #[test]
    fn parked_value_is_replayed_after_the_fan_out() {
        let mut doc = MemoryDocument::new();
        let (mut registry, a, b) = tracked_pair(&mut doc);
        let union_id = doc.add_union_control("union");
        let mut union = UnionController::new(union_id, Span::new(0.0, 100.0), 0.0);
        let mut scheduler = TickScheduler::new();
        let config = EngineConfig::default();

        union.on_value_changed(10.0, &mut scheduler, &config);

        // a change landing while a fan-out is in flight must not be lost
        union.applying = true;
        union.on_value_changed(60.0, &mut scheduler, &config);
        assert_eq!(union.value(), 10.0);
        union.applying = false;

        union.apply_value(
            union.generation(),
            &mut registry,
            &mut doc,
            &mut scheduler,
            &config,
        );
        assert_eq!(doc.control_value(a).expect("a"), 10.0);

        // the replay queued a fresh generation carrying the parked value
        union.apply_value(
            union.generation(),
            &mut registry,
            &mut doc,
            &mut scheduler,
            &config,
        );
        assert_eq!(union.value(), 60.0);
        // 60 is outside a's range but lands in b's
        assert_eq!(doc.control_value(a).expect("a"), 10.0);
        assert_eq!(doc.control_value(b).expect("b"), 60.0);
    }

    #[test]
    fn value_is_clamped_into_union_range() {
        let union_range = Span::new(0.0, 100.0);
        let mut union = UnionController::new(NodeId(9), union_range, 0.0);
        let mut scheduler = TickScheduler::new();
        let config = EngineConfig::default();

        union.on_value_changed(250.0, &mut scheduler, &config);
        assert_eq!(union.value(), 100.0);

        union.on_value_changed(-25.0, &mut scheduler, &config);
        assert_eq!(union.value(), 0.0);
    }
}
