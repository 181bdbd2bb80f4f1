//! Tick-stamped task queue.
//!
//! Backs the host's `scheduleAfter(ticks, callback)` primitive with an
//! explicit, inspectable queue instead of opaque callback chains. Tasks
//! are stamped with their due tick and a monotonically increasing
//! sequence number; draining returns them ordered by (due, sequence), so
//! tasks due on the same tick run in the order they were scheduled.

use ph_common::Tick;

/// Handle to one scheduled task, usable to cancel it before it runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    due: Tick,
    seq: u64,
    task: T,
}

/// Cooperative single-threaded scheduler.
///
/// `advance` models one pass of the host loop: the clock moves one tick
/// and every task that has come due is handed back to the caller for
/// execution. A task scheduled with `ticks = 0` runs on the next pass,
/// never inside the current one.
#[derive(Debug)]
pub struct TickScheduler<T> {
    now: Tick,
    next_seq: u64,
    entries: Vec<Entry<T>>,
}

impl<T> TickScheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Tick::ZERO,
            next_seq: 0,
            entries: Vec::new(),
        }
    }

    /// Current tick of the cooperative clock.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Schedule `task` to run `ticks` passes from now.
    pub fn schedule_after(&mut self, ticks: u64, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            due: self.now.plus(ticks),
            seq,
            task,
        });
        TaskHandle(seq)
    }

    /// Cancel a scheduled task. Returns false when it already ran or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.seq != handle.0);
        self.entries.len() != before
    }

    /// Move the clock one tick and drain everything due, in (due tick,
    /// schedule order).
    pub fn advance(&mut self) -> Vec<T> {
        self.now = self.now.plus(1);
        let now = self.now;

        let entries = std::mem::take(&mut self.entries);
        let (mut due, pending): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|entry| entry.due <= now);
        self.entries = pending;

        due.sort_by_key(|entry| (entry.due, entry.seq));
        due.into_iter().map(|entry| entry.task).collect()
    }

    /// Number of tasks still waiting.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due tick of the soonest waiting task.
    pub fn next_due(&self) -> Option<Tick> {
        self.entries.iter().map(|entry| entry.due).min()
    }
}

impl<T> Default for TickScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_run_at_their_due_tick() {
        let mut scheduler: TickScheduler<&str> = TickScheduler::new();
        scheduler.schedule_after(2, "late");
        scheduler.schedule_after(0, "next");

        assert_eq!(scheduler.advance(), vec!["next"]);
        assert_eq!(scheduler.advance(), vec!["late"]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn same_tick_tasks_keep_schedule_order() {
        let mut scheduler: TickScheduler<u32> = TickScheduler::new();
        scheduler.schedule_after(2, 1);
        scheduler.schedule_after(2, 2);
        scheduler.schedule_after(2, 3);

        assert_eq!(scheduler.advance(), Vec::<u32>::new());
        assert_eq!(scheduler.advance(), vec![1, 2, 3]);
    }

    #[test]
    fn earlier_due_runs_before_earlier_scheduled() {
        let mut scheduler: TickScheduler<&str> = TickScheduler::new();
        scheduler.schedule_after(3, "far");
        scheduler.schedule_after(1, "near");

        assert_eq!(scheduler.advance(), vec!["near"]);
        assert_eq!(scheduler.advance(), Vec::<&str>::new());
        assert_eq!(scheduler.advance(), vec!["far"]);
    }

    #[test]
    fn cancel_removes_pending_task() {
        let mut scheduler: TickScheduler<&str> = TickScheduler::new();
        let handle = scheduler.schedule_after(1, "doomed");
        scheduler.schedule_after(1, "kept");

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.advance(), vec!["kept"]);
    }

    #[test]
    fn clock_only_moves_on_advance() {
        let mut scheduler: TickScheduler<()> = TickScheduler::new();
        assert_eq!(scheduler.now(), Tick::ZERO);
        scheduler.schedule_after(5, ());
        assert_eq!(scheduler.now(), Tick::ZERO);
        assert_eq!(scheduler.next_due(), Some(Tick(5)));
        scheduler.advance();
        assert_eq!(scheduler.now(), Tick(1));
    }
}
