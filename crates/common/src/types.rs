//! Core types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when testing whether a time lies inside an interval.
///
/// Absorbs floating rounding at interval boundaries so a value sitting
/// exactly on a bound does not flicker between inside and outside.
pub const EPSILON: f64 = 1e-4;

/// Identifier of a node in the host document.
///
/// The host assigns these; the engine only stores and compares them.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One pass of the host's cooperative recomputation loop.
///
/// Roughly one redraw (about 16 ms in practice). All deferred work is
/// stamped in ticks.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn plus(self, ticks: u64) -> Tick {
        Tick(self.0 + ticks)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A directional numeric interval.
///
/// `t0` and `t1` are stored as given: `t0 > t1` is a valid, *reversed*
/// span, used by value domains that map progress backwards. Containment
/// and clamping always work on the normalized `[min, max]` bounds, so a
/// reversed span still answers them correctly.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub t0: f64,
    pub t1: f64,
}

impl Span {
    /// The unit span `[0, 1]`.
    pub const UNIT: Self = Self { t0: 0.0, t1: 1.0 };

    pub fn new(t0: f64, t1: f64) -> Self {
        Self { t0, t1 }
    }

    /// Lower bound regardless of direction.
    pub fn min(self) -> f64 {
        self.t0.min(self.t1)
    }

    /// Upper bound regardless of direction.
    pub fn max(self) -> f64 {
        self.t0.max(self.t1)
    }

    /// Absolute length of the span.
    pub fn length(self) -> f64 {
        (self.t1 - self.t0).abs()
    }

    pub fn midpoint(self) -> f64 {
        (self.t0 + self.t1) * 0.5
    }

    /// True when both bounds are exactly equal.
    pub fn is_singleton(self) -> bool {
        self.t0 == self.t1
    }

    /// True when the span runs high-to-low.
    pub fn is_reversed(self) -> bool {
        self.t0 > self.t1
    }

    /// Closed containment test on the normalized bounds.
    pub fn contains(self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// Containment widened by `tolerance` on both ends.
    pub fn contains_with_tolerance(self, value: f64, tolerance: f64) -> bool {
        value >= self.min() - tolerance && value <= self.max() + tolerance
    }

    /// Clamp `value` into the normalized bounds.
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min(), self.max())
    }

    /// Smallest normalized span covering both operands.
    pub fn union(self, other: Span) -> Span {
        Span::new(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// The same bounds with `t0 <= t1` guaranteed.
    pub fn normalized(self) -> Span {
        Span::new(self.min(), self.max())
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::UNIT
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.t0, self.t1)
    }
}
