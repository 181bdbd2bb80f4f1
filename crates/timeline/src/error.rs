//! Engine error taxonomy.
//!
//! None of these abort the engine. Callers log the failure, skip the
//! offending node, and keep the rest of the session running.

use ph_common::{LabelError, NodeId};
use ph_host::HostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// An interval label could not be parsed.
    #[error(transparent)]
    Label(#[from] LabelError),

    /// The document host rejected an operation.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A node referenced by the engine no longer exists in the document.
    #[error("upstream node {id} is missing")]
    MissingUpstream { id: NodeId },

    /// Two live nodes claim the same label key.
    #[error("label {label:?} is already claimed by {holder}")]
    DuplicateLabel { label: String, holder: NodeId },

    /// A propagation pass did not finish within its tick budget.
    #[error("propagation for {owner} exceeded {budget} ticks")]
    PropagationTimeout { owner: NodeId, budget: u64 },
}

pub type EngineResult<T> = Result<T, EngineError>;
