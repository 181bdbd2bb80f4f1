//! Interval labels of the exact form `"<number>-<number>"`.
//!
//! The host carries a node's bound time interval as free text on the node
//! label. Only the ASCII hyphen is recognized as a separator, and only the
//! first one splits: `"0-10"` parses, `"0..10"` and `"0-10-20"` do not.
//! Negative bounds are therefore not expressible; a label starting with
//! `-` fails the numeric check on its empty first segment and falls back
//! like any other malformed label. Segments must be finite: `f64` parsing
//! accepts `nan`, `inf`, and overflowing exponents, none of which can
//! bound an interval.

use crate::error::{LabelError, LabelResult};
use crate::types::Span;

/// Parse an interval label into a span.
///
/// Whitespace around either segment is tolerated. The span keeps the
/// written direction: `"10-0"` yields a reversed span.
pub fn parse_interval_label(text: &str) -> LabelResult<Span> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LabelError::Empty);
    }

    let (first, second) = trimmed
        .split_once('-')
        .ok_or_else(|| LabelError::MissingSeparator {
            text: trimmed.to_string(),
        })?;

    let t0 = parse_segment(first)?;
    let t1 = parse_segment(second)?;
    Ok(Span::new(t0, t1))
}

/// Parse a label, falling back to `default` when malformed.
///
/// The fallback is logged at debug; callers that want a user-visible
/// remark inspect the strict variant themselves.
pub fn parse_interval_label_or(text: &str, default: Span) -> Span {
    match parse_interval_label(text) {
        Ok(span) => span,
        Err(err) => {
            tracing::debug!(label = text, %err, "interval label fell back to default");
            default
        }
    }
}

/// Format a span as an interval label, round-trippable through parse
/// for non-negative bounds.
pub fn format_interval_label(span: Span) -> String {
    format!("{}-{}", span.t0, span.t1)
}

fn parse_segment(segment: &str) -> LabelResult<f64> {
    let trimmed = segment.trim();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| LabelError::NonNumericSegment {
            segment: trimmed.to_string(),
        })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LabelError::NonFiniteSegment {
            segment: trimmed.to_string(),
        })
    }
}
