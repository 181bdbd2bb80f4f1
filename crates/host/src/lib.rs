//! `ph-host` — Host document abstraction for the playhead engine.
//!
//! The engine runs inside a node-based editor it does not control. This
//! crate is the boundary: everything the engine consumes from the host
//! is expressed here, and nothing host-specific leaks past it.
//!
//! - **`DocumentHost`**: node queries, flag mutations, wiring, solve requests
//! - **`DocEvent`**: the lifecycle notifications the engine observes
//! - **`TickScheduler`**: tick-stamped deferred-work queue (`scheduleAfter`)
//! - **`MemoryDocument`**: in-memory host used by tests and the demo

pub mod error;
pub mod events;
pub mod memory;
pub mod scheduler;
pub mod traits;

// Re-export commonly used items at crate root
pub use error::{HostError, HostResult};
pub use events::DocEvent;
pub use memory::MemoryDocument;
pub use scheduler::{TaskHandle, TickScheduler};
pub use traits::DocumentHost;
