//! `ph-timeline` — The playhead engine.
//!
//! Everything that makes a document behave like a timeline lives here,
//! coordinated per document by [`TimelineSession`]:
//!
//! - **`RangeRegistry`**: which range controls participate, and their mirrors
//! - **`UnionController`**: the master control; aggregation and debounced fan-out
//! - **`propagate`**: edge-triggered hide/lock of bound groups, with watchdog
//! - **`BindingPhase`**: the scan/bind/teardown lifecycle
//! - **`Task`**: the deferred-work vocabulary drained by the tick loop
//!
//! The session talks to the editor exclusively through `ph-host`'s
//! `DocumentHost` trait, and persists through `ph-project` snapshots.

pub mod binding;
pub mod control;
pub mod error;
pub mod propagate;
pub mod registry;
pub mod session;
pub mod tasks;
pub mod union;
pub mod warnings;

// Re-export commonly used items at crate root
pub use binding::BindingPhase;
pub use control::RangeControl;
pub use error::{EngineError, EngineResult};
pub use propagate::{BoundGroup, GroupMode, PropagationState};
pub use registry::{RangeRegistry, RegistryEvent};
pub use session::TimelineSession;
pub use tasks::Task;
pub use union::UnionController;
pub use warnings::{TransientWarning, WarningLog};
