//! `ph-event-eval` — Pure interval resolution for the playhead engine.
//!
//! Answers "which event is active at time t, and what value does it
//! produce" over a set of event tuples supplied by the caller. No shared
//! state, no side effects: everything is a function of its inputs, which
//! is what makes the engine's resolution path testable in isolation.
//!
//! The resolution pipeline:
//!
//! 1. [`sort_by_start`] orders tuples ascending by start time (stable).
//! 2. [`resolve`] picks the active tuple for a query time and maps its
//!    progress into the tuple's value domain.

pub mod resolve;
pub mod types;

// Re-export commonly used items at crate root
pub use resolve::{active_index, resolve, sort_by_start};
pub use types::{EventTuple, Resolution};
