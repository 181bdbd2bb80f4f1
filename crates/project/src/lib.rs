//! `ph-project` — Persisted session state for the playhead engine.
//!
//! The engine stores a small JSON fragment per document: which nodes each
//! group owner binds, its hide/lock flags, and the union value. This
//! crate owns that format and the restoration dance around it:
//!
//! - **Save/Load**: Serialize/deserialize `SessionSnapshot` to/from JSON
//! - **Versioning**: snapshots carry a version gate for future migration
//! - **Two-phase restore**: ids load verbatim (`PendingBindings`), then
//!   resolve against the live document once it is fully materialized
//!
//! # Usage
//!
//! ```rust,no_run
//! use ph_project::{load_snapshot, save_snapshot, PendingBindings, SessionSnapshot};
//! use std::path::Path;
//!
//! let snapshot = SessionSnapshot::new();
//! save_snapshot(&snapshot, Path::new("session.phs")).unwrap();
//!
//! let loaded = load_snapshot(Path::new("session.phs")).unwrap();
//! let pending = PendingBindings::new(loaded);
//! // ... later, once the document is complete:
//! // let resolved = pending.resolve(&doc);
//! ```

pub mod error;
pub mod load;
pub mod restore;
pub mod save;
pub mod types;

// Re-export primary API at crate root
pub use error::{PersistError, PersistResult};
pub use load::{from_json_string, load_snapshot};
pub use restore::{PendingBindings, ResolvedBindings, ResolvedOwner};
pub use save::{save_snapshot, to_json_string, to_json_string_compact};
pub use types::{OwnerState, SessionSnapshot, SNAPSHOT_VERSION};
