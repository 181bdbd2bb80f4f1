//! Event tuple and resolution result types.

use ph_common::{Span, EPSILON};
use serde::{Deserialize, Serialize};

/// One candidate event contributed by an upstream event source.
///
/// Tuples are transient: they are rebuilt from upstream state on every
/// resolution pass and never persisted.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventTuple {
    /// Time at which this event becomes the active candidate.
    pub start_time: f64,
    /// The event's own declared time interval `[T0, T1]`.
    pub interval: Span,
    /// Progress through the event in `[0, 1]`, as reported upstream.
    pub raw_progress: f64,
    /// Output value domain `[D0, D1]`; `D0 > D1` maps progress backwards.
    pub value_domain: Span,
}

impl EventTuple {
    pub fn new(start_time: f64, interval: Span, raw_progress: f64, value_domain: Span) -> Self {
        Self {
            start_time,
            interval,
            raw_progress,
            value_domain,
        }
    }

    /// True when the value domain runs high-to-low.
    pub fn is_reversed(&self) -> bool {
        self.value_domain.is_reversed()
    }
}

/// Outcome of resolving a query time against a sorted tuple list.
///
/// Derived data, recomputed on every query and never mutated in place.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Index of the active tuple in the sorted input.
    pub active_index: usize,
    /// The active tuple's declared interval.
    pub interval: Span,
    /// The active tuple's value domain.
    pub value_domain: Span,
    /// Progress mapped into the value domain, clamped to its bounds.
    pub mapped_value: f64,
    /// Progress exactly as the upstream source reported it.
    pub raw_progress: f64,
    /// Progress after direction correction; drives `mapped_value`.
    pub effective_progress: f64,
}

impl Resolution {
    /// Short status text for host display: the active interval when the
    /// query time sits inside it (within tolerance), `"OUTSIDE"` otherwise.
    pub fn status_text(&self, time: f64) -> String {
        if self.interval.contains_with_tolerance(time, EPSILON) {
            self.interval.to_string()
        } else {
            "OUTSIDE".to_string()
        }
    }
}
