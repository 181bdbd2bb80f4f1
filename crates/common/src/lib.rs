//! `ph-common` — Shared types and errors for the playhead timeline engine.
//!
//! This crate is the foundation that all other engine crates depend on.
//! It defines the core abstractions:
//!
//! - **Types**: `NodeId`, `Tick`, `Span` (newtypes for safety), `EPSILON`
//! - **Node classification**: `NodeKind`, `NodeCaps` (closed kind set, resolved once)
//! - **Labels**: `"<number>-<number>"` interval label parsing and formatting
//! - **Errors**: `LabelError` (thiserror-based)
//! - **Config**: `EngineConfig` (tick budgets and fallbacks)

pub mod config;
pub mod error;
pub mod label;
pub mod node;
pub mod types;

// Re-export commonly used items at crate root
pub use config::EngineConfig;
pub use error::{LabelError, LabelResult};
pub use label::{format_interval_label, parse_interval_label, parse_interval_label_or};
pub use node::{NodeCaps, NodeKind};
pub use types::{NodeId, Span, Tick, EPSILON};
