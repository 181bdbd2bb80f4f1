//! Shared error types (thiserror-based).
//!
//! Engine-level errors that wrap these live in `ph_timeline`; this crate
//! only owns the failures its own types can produce.

use thiserror::Error;

/// Failures while parsing an interval label of the form `"<number>-<number>"`.
///
/// Label parsing is a degrade-and-continue path everywhere: callers fall
/// back to a default interval and surface a low-severity remark, they
/// never abort on these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("interval label {text:?} has no '-' separator")]
    MissingSeparator { text: String },

    #[error("interval label segment {segment:?} is not numeric")]
    NonNumericSegment { segment: String },

    #[error("interval label segment {segment:?} is not finite")]
    NonFiniteSegment { segment: String },

    #[error("interval label is empty")]
    Empty,
}

/// Convenience Result type for label parsing.
pub type LabelResult<T> = Result<T, LabelError>;
